use marketctx_core::{MarketContextEngine, ProviderId, Symbol, TickerFundamentals};
use serde::Serialize;

use crate::cli::FundamentalsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FundamentalsResponseData<'a> {
    symbol: &'a Symbol,
    source: Option<ProviderId>,
    fundamentals: Option<TickerFundamentals>,
}

pub async fn run(
    args: &FundamentalsArgs,
    engine: &MarketContextEngine,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.ticker)?;

    match engine.feed().chain().fetch_fundamentals(&symbol).await {
        Ok(route) => {
            let fundamentals = route.data.sanitized();
            let no_data = !fundamentals.has_profile();
            let data = serde_json::to_value(FundamentalsResponseData {
                symbol: &symbol,
                source: Some(route.selected_source),
                fundamentals: Some(fundamentals),
            })?;
            let mut result = CommandResult::ok(data)
                .with_primary(Some(symbol.clone()))
                .with_latency(route.latency_ms)
                .with_source_chain(route.source_chain)
                .with_no_data(no_data);
            if !route.errors.is_empty() {
                result = result.with_warning(format!(
                    "{} provider(s) failed before {} answered",
                    route.errors.len(),
                    route.selected_source
                ));
            }
            Ok(result)
        }
        Err(failure) => {
            let data = serde_json::to_value(FundamentalsResponseData {
                symbol: &symbol,
                source: None,
                fundamentals: None,
            })?;
            Ok(CommandResult::ok(data)
                .with_latency(failure.latency_ms)
                .with_source_chain(failure.source_chain)
                .with_provider_errors(failure.errors)
                .with_no_data(true))
        }
    }
}
