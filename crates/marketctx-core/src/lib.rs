//! # marketctx core
//!
//! Market context aggregation for one or more equity tickers.
//!
//! ## Overview
//!
//! Given a list of tickers the engine returns, per ticker:
//!
//! - **Price indicators**: day move, 20-day volatility, z-score, RSI-14,
//!   moving averages, 52-week range, volume profile and volatility regime
//! - **Fundamentals**: market cap, sector, industry, beta, P/E
//! - **Benchmarks**: S&P 500 proxy, sector ETF, industry ETF and a peer
//!   group average, with relative strength against each
//!
//! Every metric is optional. Missing history or an unreachable benchmark
//! produces `null` for that metric and a diagnostic naming the reason; it
//! never fails the request.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance (primary) and Alpha Vantage (keyed fallback) |
//! | [`routing`] | Primary/fallback chain and the fallback policy |
//! | [`cache`] | TTL caches for series and fundamentals |
//! | [`feed`] | Cache-through access to the provider chain |
//! | [`indicators`] | Pure price/volume indicators |
//! | [`comparator`] | Benchmark outcomes and relative strength |
//! | [`reference`] | Sector/industry ETF maps and the peer universe |
//! | [`analytics`] | Per-ticker output record and builder |
//! | [`orchestrator`] | Multi-ticker pipeline and state machine |
//! | [`config`] | Builder and environment configuration |
//! | [`clock`] | Injected time sources |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ MarketContextEngine  │  per-ticker pipelines, joined concurrently
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ MarketFeed           │────▶│ MarketCache      │
//! └──────────┬───────────┘     └──────────────────┘
//!            │ miss
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ ProviderChain        │────▶│ Yahoo → AV       │
//! └──────────────────────┘     └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marketctx_core::{MarketConfig, TickerRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = MarketConfig::from_env()?.build_engine();
//!     let context = engine
//!         .analyze(&[TickerRequest::new("NVDA"), TickerRequest::new("AMD")])
//!         .await;
//!
//!     if let Some(primary) = context.primary_analytics() {
//!         println!("{} moved {:?}% today", primary.ticker, primary.day_move_pct);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Provider failures are classified by [`SourceErrorKind`]. Only transient
//! kinds are retried against the fallback:
//!
//! ```rust
//! use marketctx_core::{decide_fallback, FallbackDecision, SourceErrorKind};
//!
//! assert_eq!(
//!     decide_fallback(SourceErrorKind::RateLimited, true),
//!     FallbackDecision::TryFallback
//! );
//! assert_eq!(
//!     decide_fallback(SourceErrorKind::NotFound, true),
//!     FallbackDecision::Propagate
//! );
//! ```

pub mod adapters;
pub mod analytics;
pub mod cache;
pub mod circuit_breaker;
pub mod clock;
pub mod comparator;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod feed;
pub mod http_client;
pub mod indicators;
pub mod orchestrator;
pub mod reference;
pub mod routing;
pub mod source;
pub mod throttling;

// Adapter implementations
pub use adapters::{AlphaVantageAdapter, YahooAdapter};

// Analytics output
pub use analytics::{AnalyticsBuilder, ClosePoint, FieldDiagnostic, MarketAnalytics};

// Caching
pub use cache::{MarketCache, TtlStore, FUNDAMENTALS_TTL, SERIES_TTL};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Time sources
pub use clock::{Clock, ManualClock, SystemClock};

// Benchmarks
pub use comparator::{relative_strength, BenchmarkOutcome, ComparatorSettings};

// Configuration
pub use config::{MarketConfig, MarketConfigBuilder};

// Provider trait and types
pub use data_source::{
    MarketDataProvider, ProviderFuture, SeriesRequest, SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    clean_profile_label, PricePoint, PriceSeries, Symbol, TickerFundamentals, UtcDateTime,
};

// Error types
pub use error::{ConfigError, ValidationError};

pub use feed::{Fetched, MarketFeed};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Indicators
pub use indicators::{IndicatorOptions, PriceIndicators, VolatilityRegime};

// Orchestration
pub use orchestrator::{
    ContextStatus, EngineSettings, MarketContext, MarketContextEngine, TickerOutcome,
    TickerRequest, TickerState,
};

// Routing types
pub use routing::{
    decide_fallback, FallbackDecision, ProviderChain, RouteFailure, RouteResult, RouteSuccess,
};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::RequestBudget;
