//! Primary/fallback provider chain.
//!
//! The chain always asks the primary provider first. Whether a failure is
//! retried against the fallback is decided by [`decide_fallback`], a pure
//! function of the error kind and whether a fallback is configured.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::data_source::{
    MarketDataProvider, ProviderFuture, SeriesRequest, SourceError, SourceErrorKind,
};
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::{PriceSeries, ProviderId, Symbol, TickerFundamentals};

/// Outcome of consulting the fallback policy after a primary failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    TryFallback,
    Propagate,
}

/// RateLimited and Unavailable go to the fallback when one exists; every
/// other failure is final.
pub const fn decide_fallback(kind: SourceErrorKind, fallback_available: bool) -> FallbackDecision {
    if fallback_available && kind.is_transient() {
        FallbackDecision::TryFallback
    } else {
        FallbackDecision::Propagate
    }
}

/// Successful routed call.
#[derive(Debug, Clone)]
pub struct RouteSuccess<T> {
    pub data: T,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<(ProviderId, SourceError)>,
    pub latency_ms: u64,
}

/// Failed routed call after exhausting the chain.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<(ProviderId, SourceError)>,
    pub latency_ms: u64,
}

impl RouteFailure {
    /// The error that ended the chain.
    pub fn last_error(&self) -> Option<&SourceError> {
        self.errors.last().map(|(_, error)| error)
    }

    pub fn kind(&self) -> SourceErrorKind {
        self.last_error()
            .map(SourceError::kind)
            .unwrap_or(SourceErrorKind::Unavailable)
    }
}

pub type RouteResult<T> = Result<RouteSuccess<T>, RouteFailure>;

/// Primary provider plus an optional keyed fallback.
pub struct ProviderChain {
    primary: Arc<dyn MarketDataProvider>,
    fallback: Option<Arc<dyn MarketDataProvider>>,
    call_timeout: Duration,
}

impl ProviderChain {
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        fallback: Option<Arc<dyn MarketDataProvider>>,
    ) -> Self {
        Self {
            primary,
            fallback,
            call_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Upper bound on each individual provider call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        std::iter::once(self.primary.id())
            .chain(self.fallback.as_ref().map(|fallback| fallback.id()))
            .collect()
    }

    #[tracing::instrument(name = "fetch_series", skip(self), fields(symbol = %symbol))]
    pub async fn fetch_series(
        &self,
        symbol: &Symbol,
        lookback_days: u32,
    ) -> RouteResult<PriceSeries> {
        let request = match SeriesRequest::new(symbol.clone(), lookback_days) {
            Ok(request) => request,
            Err(error) => {
                return Err(RouteFailure {
                    source_chain: Vec::new(),
                    errors: vec![(self.primary.id(), error)],
                    latency_ms: 0,
                })
            }
        };
        self.route(move |provider| provider.fetch_series(request.clone()))
            .await
    }

    #[tracing::instrument(name = "fetch_fundamentals", skip(self), fields(symbol = %symbol))]
    pub async fn fetch_fundamentals(&self, symbol: &Symbol) -> RouteResult<TickerFundamentals> {
        let symbol = symbol.clone();
        self.route(move |provider| provider.fetch_fundamentals(symbol.clone()))
            .await
    }

    async fn route<T, F>(&self, invoke: F) -> RouteResult<T>
    where
        F: for<'a> Fn(&'a dyn MarketDataProvider) -> ProviderFuture<'a, T>,
    {
        let started = Instant::now();
        let mut source_chain = Vec::with_capacity(2);
        let mut errors = Vec::new();

        let primary_id = self.primary.id();
        source_chain.push(primary_id);
        let primary_error = match self.call(self.primary.as_ref(), &invoke).await {
            Ok(data) => {
                return Ok(RouteSuccess {
                    data,
                    selected_source: primary_id,
                    source_chain,
                    errors,
                    latency_ms: elapsed_ms(started),
                })
            }
            Err(error) => error,
        };

        let decision = decide_fallback(primary_error.kind(), self.fallback.is_some());
        warn!(
            provider = %primary_id,
            code = primary_error.code(),
            ?decision,
            "primary provider failed: {}",
            primary_error.message()
        );
        errors.push((primary_id, primary_error));

        let fallback = match (decision, self.fallback.as_ref()) {
            (FallbackDecision::TryFallback, Some(fallback)) => fallback,
            _ => {
                return Err(RouteFailure {
                    source_chain,
                    errors,
                    latency_ms: elapsed_ms(started),
                })
            }
        };

        let fallback_id = fallback.id();
        source_chain.push(fallback_id);
        match self.call(fallback.as_ref(), &invoke).await {
            Ok(data) => {
                debug!(provider = %fallback_id, "fallback provider answered");
                Ok(RouteSuccess {
                    data,
                    selected_source: fallback_id,
                    source_chain,
                    errors,
                    latency_ms: elapsed_ms(started),
                })
            }
            Err(error) => {
                warn!(
                    provider = %fallback_id,
                    code = error.code(),
                    "fallback provider failed: {}",
                    error.message()
                );
                errors.push((fallback_id, error));
                Err(RouteFailure {
                    source_chain,
                    errors,
                    latency_ms: elapsed_ms(started),
                })
            }
        }
    }

    async fn call<T, F>(
        &self,
        provider: &dyn MarketDataProvider,
        invoke: &F,
    ) -> Result<T, SourceError>
    where
        F: for<'a> Fn(&'a dyn MarketDataProvider) -> ProviderFuture<'a, T>,
    {
        match tokio::time::timeout(self.call_timeout, invoke(provider)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::unavailable(format!(
                "{} did not answer within {:.1}s",
                provider.id(),
                self.call_timeout.as_secs_f64()
            ))),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
