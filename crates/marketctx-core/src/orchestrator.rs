//! Multi-ticker market context assembly.
//!
//! Each ticker walks a small state machine:
//!
//! ```text
//! Pending ──► CacheHit ──┐
//!    │                   ├──► Computed
//!    ├──────► Fetching ──┤
//!    │                   └──► PartialFailure
//!    └───────────────────────► PartialFailure   (invalid symbol)
//! ```
//!
//! Tickers run concurrently and never affect each other. A ticker without
//! any price history ends in `PartialFailure` and is left out of the
//! analytics list.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsBuilder, MarketAnalytics};
use crate::cache::MarketCache;
use crate::comparator::{
    BenchmarkOutcome, Comparator, ComparatorSettings, MissingLabel, PeerReport,
};
use crate::data_source::SourceError;
use crate::feed::MarketFeed;
use crate::indicators::{IndicatorOptions, PriceIndicators};
use crate::reference;
use crate::routing::ProviderChain;
use crate::{clean_profile_label, Symbol, TickerFundamentals};

/// One entity to analyze, with optional caller-supplied context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickerRequest {
    pub symbol: String,
    #[serde(default)]
    pub sector_hint: Option<String>,
    #[serde(default)]
    pub industry_hint: Option<String>,
    #[serde(default)]
    pub peer_hints: Vec<String>,
}

impl TickerRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn with_sector_hint(mut self, sector: impl Into<String>) -> Self {
        self.sector_hint = Some(sector.into());
        self
    }

    pub fn with_industry_hint(mut self, industry: impl Into<String>) -> Self {
        self.industry_hint = Some(industry.into());
        self
    }

    pub fn with_peer_hints<I, S>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peer_hints = peers.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&str> for TickerRequest {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for TickerRequest {
    fn from(symbol: String) -> Self {
        Self::new(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerState {
    Pending,
    CacheHit,
    Fetching,
    Computed,
    PartialFailure,
}

impl TickerState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Computed | Self::PartialFailure)
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::CacheHit)
                | (Self::Pending, Self::Fetching)
                | (Self::Pending, Self::PartialFailure)
                | (Self::CacheHit, Self::Computed)
                | (Self::CacheHit, Self::PartialFailure)
                | (Self::Fetching, Self::Computed)
                | (Self::Fetching, Self::PartialFailure)
        )
    }
}

/// Terminal state of one requested ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerOutcome {
    pub ticker: String,
    pub state: TickerState,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Available,
    NoMarketData,
}

/// Result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketContext {
    pub status: ContextStatus,
    pub primary: Option<Symbol>,
    pub analytics: Vec<MarketAnalytics>,
    pub outcomes: Vec<TickerOutcome>,
}

impl MarketContext {
    pub fn primary_analytics(&self) -> Option<&MarketAnalytics> {
        let primary = self.primary.as_ref()?;
        self.analytics.iter().find(|a| &a.ticker == primary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineSettings {
    pub comparator: ComparatorSettings,
    pub indicators: IndicatorOptions,
}

/// Per-ticker state tracker that only accepts valid transitions.
#[derive(Debug)]
struct Lifecycle {
    ticker: String,
    state: TickerState,
}

impl Lifecycle {
    fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            state: TickerState::Pending,
        }
    }

    fn advance(&mut self, next: TickerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(ticker = %self.ticker, from = ?self.state, to = ?next, "ticker state");
        self.state = next;
    }

    fn finish(mut self, next: TickerState, reason: Option<String>) -> TickerOutcome {
        self.advance(next);
        TickerOutcome {
            ticker: self.ticker,
            state: self.state,
            reason,
        }
    }
}

/// Sector/industry labels for one ticker and where they came from.
struct ProfileLabels {
    sector: Result<String, MissingLabel>,
    industry: Result<String, MissingLabel>,
}

impl ProfileLabels {
    /// Caller hint first, then fetched fundamentals, then the reference table.
    fn resolve(
        symbol: &Symbol,
        request: &TickerRequest,
        fundamentals: Result<&TickerFundamentals, &SourceError>,
    ) -> Self {
        let constituent = reference::constituent(symbol);
        let missing = match fundamentals {
            Ok(_) => MissingLabel::Unknown,
            Err(error) => MissingLabel::FetchFailed(error.kind()),
        };
        let fetched = fundamentals.ok();

        let sector = request
            .sector_hint
            .as_deref()
            .and_then(clean_profile_label)
            .or_else(|| fetched.and_then(|f| f.sector.clone()))
            .or_else(|| constituent.map(|c| c.sector.to_owned()))
            .ok_or(missing);
        let industry = request
            .industry_hint
            .as_deref()
            .and_then(clean_profile_label)
            .or_else(|| fetched.and_then(|f| f.industry.clone()))
            .or_else(|| constituent.map(|c| c.industry.to_owned()))
            .ok_or(missing);

        Self { sector, industry }
    }

    fn sector(&self) -> Result<&str, MissingLabel> {
        self.sector.as_deref().map_err(|missing| *missing)
    }

    fn industry(&self) -> Result<&str, MissingLabel> {
        self.industry.as_deref().map_err(|missing| *missing)
    }
}

/// Aggregates price history, fundamentals and benchmarks for a set of tickers.
///
/// The engine is `Send + Sync`; share it behind an `Arc` across requests so
/// the caches are shared too.
pub struct MarketContextEngine {
    feed: MarketFeed,
    settings: EngineSettings,
}

impl MarketContextEngine {
    pub fn new(feed: MarketFeed, settings: EngineSettings) -> Self {
        Self { feed, settings }
    }

    /// Engine over `chain` with a fresh system-clock cache and default settings.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self::new(
            MarketFeed::new(chain, Arc::new(MarketCache::default())),
            EngineSettings::default(),
        )
    }

    pub fn feed(&self) -> &MarketFeed {
        &self.feed
    }

    pub fn cache(&self) -> &MarketCache {
        self.feed.cache()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Analyzes every request concurrently.
    ///
    /// Never fails: tickers that cannot be resolved are reported in
    /// `outcomes` and omitted from `analytics`.
    pub async fn analyze(&self, requests: &[TickerRequest]) -> MarketContext {
        let started = Instant::now();

        let mut seen = HashSet::new();
        let unique: Vec<&TickerRequest> = requests
            .iter()
            .filter(|request| match Symbol::parse(&request.symbol) {
                Ok(symbol) => seen.insert(symbol),
                Err(_) => true,
            })
            .collect();

        let results =
            join_all(unique.into_iter().map(|request| self.analyze_ticker(request))).await;

        let mut analytics = Vec::new();
        let mut outcomes = Vec::with_capacity(results.len());
        for (outcome, result) in results {
            outcomes.push(outcome);
            analytics.extend(result);
        }

        let primary = analytics.first().map(|a: &MarketAnalytics| a.ticker.clone());
        let status = if primary.is_some() {
            ContextStatus::Available
        } else {
            ContextStatus::NoMarketData
        };

        info!(
            requested = requests.len(),
            resolved = analytics.len(),
            primary = primary.as_ref().map(Symbol::as_str),
            latency_ms = started.elapsed().as_millis() as u64,
            "market context assembled"
        );

        MarketContext {
            status,
            primary,
            analytics,
            outcomes,
        }
    }

    /// Runs the full pipeline for one ticker.
    #[tracing::instrument(name = "analyze_ticker", skip_all, fields(ticker = %request.symbol))]
    pub async fn analyze_ticker(
        &self,
        request: &TickerRequest,
    ) -> (TickerOutcome, Option<MarketAnalytics>) {
        let mut lifecycle = Lifecycle::new(request.symbol.trim());

        let symbol = match Symbol::parse(&request.symbol) {
            Ok(symbol) => symbol,
            Err(error) => {
                warn!(error = %error, "rejecting ticker");
                let reason = format!("invalid symbol: {error}");
                return (lifecycle.finish(TickerState::PartialFailure, Some(reason)), None);
            }
        };
        lifecycle.ticker = symbol.to_string();

        let comparator = Comparator::new(&self.feed, &self.settings.comparator);

        let profile_and_benchmarks = async {
            let fundamentals = self.feed.fundamentals(&symbol).await;
            let labels = ProfileLabels::resolve(
                &symbol,
                request,
                fundamentals.as_ref().map(|f| f.value.as_ref()),
            );
            let reference_peers = async {
                if request.peer_hints.is_empty() {
                    Some(
                        comparator
                            .reference_peers(
                                &symbol,
                                labels.sector().ok(),
                                labels.industry().ok(),
                            )
                            .await,
                    )
                } else {
                    None
                }
            };
            let (sector, industry, peers) = tokio::join!(
                comparator.sector(labels.sector()),
                comparator.industry(labels.industry()),
                reference_peers,
            );
            (fundamentals, labels, sector, industry, peers)
        };
        let provided_peers = async {
            if request.peer_hints.is_empty() {
                None
            } else {
                Some(comparator.provided_peers(&symbol, &request.peer_hints).await)
            }
        };

        let (series, profile, market, provided_peers) = tokio::join!(
            self.feed.series(&symbol),
            profile_and_benchmarks,
            comparator.market(),
            provided_peers,
        );
        let (fundamentals, labels, sector, industry, reference_peers) = profile;

        let series = match series {
            Ok(fetched) => {
                lifecycle.advance(if fetched.cache_hit {
                    TickerState::CacheHit
                } else {
                    TickerState::Fetching
                });
                fetched.value
            }
            Err(error) => {
                lifecycle.advance(TickerState::Fetching);
                warn!(code = error.code(), "no price history: {}", error.message());
                return (
                    lifecycle.finish(TickerState::PartialFailure, Some(error.to_string())),
                    None,
                );
            }
        };

        if let Err(error) = &fundamentals {
            debug!(code = error.code(), "fundamentals unavailable");
        }
        let peers = provided_peers
            .or(reference_peers)
            .unwrap_or_else(|| PeerReport {
                label: None,
                size: None,
                outcome: BenchmarkOutcome::Unmapped,
            });

        let analytics = AnalyticsBuilder::new(&series)
            .indicators(&PriceIndicators::compute(&series, self.settings.indicators))
            .fundamentals(fundamentals.as_ref().ok().map(|f| f.value.as_ref()))
            .labels(labels.sector().ok(), labels.industry().ok())
            .market(market)
            .sector(sector)
            .industry(industry)
            .peers(peers)
            .build();

        (lifecycle.finish(TickerState::Computed, None), Some(analytics))
    }
}
