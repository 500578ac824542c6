//! Cache-through access to the provider chain.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::cache::MarketCache;
use crate::data_source::SourceError;
use crate::routing::{ProviderChain, RouteFailure};
use crate::{PriceSeries, Symbol, TickerFundamentals};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// A value read through the cache, remembering whether it was cached.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: Arc<T>,
    pub cache_hit: bool,
}

/// Cache-through access to the provider chain.
///
/// Only successful, non-empty results are stored. A failed fetch leaves
/// the cache untouched so the next request tries the providers again.
///
/// Concurrent misses for the same symbol are coalesced: one caller fetches
/// while the others wait and then read its result from the cache.
pub struct MarketFeed {
    chain: ProviderChain,
    cache: Arc<MarketCache>,
    lookback_days: u32,
    series_inflight: InFlight,
    fundamentals_inflight: InFlight,
}

/// Per-symbol gates held while a fetch is in flight.
#[derive(Default)]
struct InFlight {
    gates: Mutex<HashMap<Symbol, Arc<AsyncMutex<()>>>>,
}

impl InFlight {
    fn gate(&self, symbol: &Symbol) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(symbol.clone()).or_default())
    }

    fn release(&self, symbol: &Symbol, gate: Arc<AsyncMutex<()>>) {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this handle remain: nobody is waiting.
        if Arc::strong_count(&gate) == 2 {
            gates.remove(symbol);
        }
    }
}

impl MarketFeed {
    pub fn new(chain: ProviderChain, cache: Arc<MarketCache>) -> Self {
        Self {
            chain,
            cache,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            series_inflight: InFlight::default(),
            fundamentals_inflight: InFlight::default(),
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days.max(1);
        self
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub async fn series(&self, symbol: &Symbol) -> Result<Fetched<PriceSeries>, SourceError> {
        if let Some(value) = self.cache.series.get(symbol) {
            return Ok(Fetched {
                value,
                cache_hit: true,
            });
        }

        let gate = self.series_inflight.gate(symbol);
        let result = {
            let _turn = gate.lock().await;
            self.load_series(symbol).await
        };
        self.series_inflight.release(symbol, gate);
        result
    }

    async fn load_series(&self, symbol: &Symbol) -> Result<Fetched<PriceSeries>, SourceError> {
        if let Some(value) = self.cache.series.get(symbol) {
            return Ok(Fetched {
                value,
                cache_hit: true,
            });
        }

        let routed = self
            .chain
            .fetch_series(symbol, self.lookback_days)
            .await
            .map_err(into_source_error)?;
        if routed.data.is_empty() {
            return Err(SourceError::not_found(format!(
                "{} returned no price history for {symbol}",
                routed.selected_source
            )));
        }

        debug!(
            symbol = %symbol,
            provider = %routed.selected_source,
            points = routed.data.len(),
            latency_ms = routed.latency_ms,
            "series fetched"
        );
        Ok(Fetched {
            value: self.cache.series.put(symbol.clone(), routed.data),
            cache_hit: false,
        })
    }

    pub async fn fundamentals(
        &self,
        symbol: &Symbol,
    ) -> Result<Fetched<TickerFundamentals>, SourceError> {
        if let Some(value) = self.cache.fundamentals.get(symbol) {
            return Ok(Fetched {
                value,
                cache_hit: true,
            });
        }

        let gate = self.fundamentals_inflight.gate(symbol);
        let result = {
            let _turn = gate.lock().await;
            self.load_fundamentals(symbol).await
        };
        self.fundamentals_inflight.release(symbol, gate);
        result
    }

    async fn load_fundamentals(
        &self,
        symbol: &Symbol,
    ) -> Result<Fetched<TickerFundamentals>, SourceError> {
        if let Some(value) = self.cache.fundamentals.get(symbol) {
            return Ok(Fetched {
                value,
                cache_hit: true,
            });
        }

        let routed = self
            .chain
            .fetch_fundamentals(symbol)
            .await
            .map_err(into_source_error)?;
        let fundamentals = routed.data.sanitized();

        Ok(Fetched {
            value: self.cache.fundamentals.put(symbol.clone(), fundamentals),
            cache_hit: false,
        })
    }
}

fn into_source_error(failure: RouteFailure) -> SourceError {
    failure
        .last_error()
        .cloned()
        .unwrap_or_else(|| SourceError::unavailable("no provider was attempted"))
}
