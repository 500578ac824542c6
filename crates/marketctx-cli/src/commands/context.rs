use std::time::Instant;

use marketctx_core::{ContextStatus, MarketContextEngine, TickerRequest, TickerState};

use crate::cli::ContextArgs;
use crate::error::CliError;

use super::CommandResult;

/// Hints apply to the first ticker only; the rest are analyzed bare.
fn build_requests(args: &ContextArgs) -> Vec<TickerRequest> {
    args.tickers
        .iter()
        .enumerate()
        .map(|(index, ticker)| {
            let mut request = TickerRequest::new(ticker.as_str());
            if index == 0 {
                if let Some(sector) = &args.sector {
                    request = request.with_sector_hint(sector.as_str());
                }
                if let Some(industry) = &args.industry {
                    request = request.with_industry_hint(industry.as_str());
                }
                request = request.with_peer_hints(args.peers.iter().map(String::as_str));
            }
            request
        })
        .collect()
}

pub async fn run(
    args: &ContextArgs,
    engine: &MarketContextEngine,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let context = engine.analyze(&build_requests(args)).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let warnings: Vec<String> = context
        .outcomes
        .iter()
        .filter(|outcome| outcome.state == TickerState::PartialFailure)
        .map(|outcome| match &outcome.reason {
            Some(reason) => format!("{} dropped: {reason}", outcome.ticker),
            None => format!("{} dropped", outcome.ticker),
        })
        .collect();

    let no_data = context.status == ContextStatus::NoMarketData;
    let primary = context.primary.clone();
    let data = serde_json::to_value(&context)?;

    let mut result = CommandResult::ok(data)
        .with_primary(primary)
        .with_latency(latency_ms)
        .with_source_chain(engine.feed().chain().providers())
        .with_no_data(no_data);
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}
