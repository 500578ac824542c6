use marketctx_core::{MarketContextEngine, PriceSeries, ProviderId, Symbol};
use serde::Serialize;

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SeriesResponseData<'a> {
    symbol: &'a Symbol,
    source: Option<ProviderId>,
    points: usize,
    series: Option<&'a PriceSeries>,
}

pub async fn run(
    args: &SeriesArgs,
    engine: &MarketContextEngine,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.ticker)?;
    let lookback_days = args
        .lookback_days
        .unwrap_or_else(|| engine.feed().lookback_days());

    match engine.feed().chain().fetch_series(&symbol, lookback_days).await {
        Ok(route) => {
            let data = serde_json::to_value(SeriesResponseData {
                symbol: &symbol,
                source: Some(route.selected_source),
                points: route.data.len(),
                series: Some(&route.data),
            })?;
            Ok(CommandResult::ok(data)
                .with_primary(Some(symbol.clone()))
                .with_latency(route.latency_ms)
                .with_source_chain(route.source_chain)
                .with_provider_errors(route.errors)
                .with_no_data(route.data.is_empty()))
        }
        Err(failure) => {
            let data = serde_json::to_value(SeriesResponseData {
                symbol: &symbol,
                source: None,
                points: 0,
                series: None,
            })?;
            Ok(CommandResult::ok(data)
                .with_latency(failure.latency_ms)
                .with_source_chain(failure.source_chain)
                .with_provider_errors(failure.errors)
                .with_no_data(true))
        }
    }
}
