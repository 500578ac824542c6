//! Engine configuration and wiring.
//!
//! Settings come from a builder, optionally seeded from environment
//! variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `MARKETCTX_ALPHAVANTAGE_API_KEY` (or `ALPHAVANTAGE_API_KEY`, `ALPHA_VANTAGE_API_KEY`) | unset, fallback disabled |
//! | `MARKETCTX_HTTP_TIMEOUT_SECONDS` (or `HTTP_TIMEOUT_SECONDS`) | 12, clamped to 10..=15 |
//! | `MARKETCTX_USER_AGENT` | `marketctx/<version>` |
//! | `MARKETCTX_LOOKBACK_DAYS` | 365 |
//! | `MARKETCTX_SERIES_TTL_SECONDS` | 86400 |
//! | `MARKETCTX_FUNDAMENTALS_TTL_SECONDS` | 604800 |
//! | `MARKETCTX_SPX_PROXY` | `SPY` |
//! | `MARKETCTX_MIN_PEERS` | 3 |
//! | `MARKETCTX_WINSORIZE_52W` | `false` |
//!
//! # Example
//!
//! ```no_run
//! use marketctx_core::MarketConfig;
//!
//! let engine = MarketConfig::builder()
//!     .with_env()
//!     .expect("valid environment")
//!     .with_min_peers(4)
//!     .build()
//!     .build_engine();
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::Duration;

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::cache::{MarketCache, FUNDAMENTALS_TTL, SERIES_TTL};
use crate::clock::{Clock, SystemClock};
use crate::comparator::{ComparatorSettings, DEFAULT_SPX_PROXY, MAX_PEERS, MIN_PEERS};
use crate::data_source::MarketDataProvider;
use crate::feed::{MarketFeed, DEFAULT_LOOKBACK_DAYS};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::indicators::IndicatorOptions;
use crate::orchestrator::{EngineSettings, MarketContextEngine};
use crate::routing::ProviderChain;
use crate::{ConfigError, Symbol};

pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const MIN_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 15;

const ALPHAVANTAGE_KEY_VARS: [&str; 3] = [
    "MARKETCTX_ALPHAVANTAGE_API_KEY",
    "ALPHAVANTAGE_API_KEY",
    "ALPHA_VANTAGE_API_KEY",
];
const TIMEOUT_VARS: [&str; 2] = ["MARKETCTX_HTTP_TIMEOUT_SECONDS", "HTTP_TIMEOUT_SECONDS"];

fn default_user_agent() -> String {
    format!("marketctx/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub alphavantage_api_key: Option<String>,
    pub call_timeout: StdDuration,
    pub user_agent: String,
    pub lookback_days: u32,
    pub series_ttl: Duration,
    pub fundamentals_ttl: Duration,
    pub spx_proxy: Symbol,
    pub min_peers: usize,
    pub max_peers: usize,
    pub winsorize_52w: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfigBuilder::new().build()
    }
}

impl MarketConfig {
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::new()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::builder().with_env()?.build())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            comparator: ComparatorSettings {
                spx_proxy: self.spx_proxy.clone(),
                min_peers: self.min_peers,
                max_peers: self.max_peers,
            },
            indicators: IndicatorOptions {
                winsorize_52w: self.winsorize_52w,
            },
        }
    }

    /// Yahoo first, Alpha Vantage behind it when a key is configured.
    ///
    /// Both adapters read `clock` for their breaker cooldowns.
    pub fn build_chain(
        &self,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> ProviderChain {
        let timeout_ms = self.call_timeout.as_millis() as u64;
        let primary: Arc<dyn MarketDataProvider> = Arc::new(
            YahooAdapter::new(Arc::clone(&http_client))
                .with_timeout_ms(timeout_ms)
                .with_clock(Arc::clone(&clock)),
        );
        let fallback = self.alphavantage_api_key.as_ref().map(|key| {
            Arc::new(
                AlphaVantageAdapter::new(Arc::clone(&http_client), key.clone())
                    .with_timeout_ms(timeout_ms)
                    .with_clock(Arc::clone(&clock)),
            ) as Arc<dyn MarketDataProvider>
        });

        ProviderChain::new(primary, fallback).with_call_timeout(self.call_timeout)
    }

    pub fn build_feed(&self, chain: ProviderChain, clock: Arc<dyn Clock>) -> MarketFeed {
        let cache = MarketCache::new(self.series_ttl, self.fundamentals_ttl, clock);
        MarketFeed::new(chain, Arc::new(cache)).with_lookback_days(self.lookback_days)
    }

    /// Production engine: reqwest transport and the system clock.
    pub fn build_engine(&self) -> MarketContextEngine {
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(&self.user_agent));
        self.build_engine_with(http_client, Arc::new(SystemClock))
    }

    pub fn build_engine_with(
        &self,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> MarketContextEngine {
        let chain = self.build_chain(http_client, Arc::clone(&clock));
        let feed = self.build_feed(chain, clock);
        MarketContextEngine::new(feed, self.engine_settings())
    }
}

/// Builder for [`MarketConfig`].
#[derive(Debug, Clone)]
pub struct MarketConfigBuilder {
    alphavantage_api_key: Option<String>,
    timeout_secs: u64,
    user_agent: String,
    lookback_days: u32,
    series_ttl: Duration,
    fundamentals_ttl: Duration,
    spx_proxy: Symbol,
    min_peers: usize,
    winsorize_52w: bool,
}

impl Default for MarketConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketConfigBuilder {
    pub fn new() -> Self {
        Self {
            alphavantage_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            series_ttl: SERIES_TTL,
            fundamentals_ttl: FUNDAMENTALS_TTL,
            spx_proxy: Symbol::from_normalized(DEFAULT_SPX_PROXY),
            min_peers: MIN_PEERS,
            winsorize_52w: false,
        }
    }

    /// Reads overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&'static str]| -> Option<(&'static str, String)> {
            names.iter().find_map(|name| {
                lookup(*name)
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty())
                    .map(|value| (*name, value))
            })
        };

        if let Some((_, key)) = first(&ALPHAVANTAGE_KEY_VARS) {
            self.alphavantage_api_key = Some(key);
        }
        if let Some((name, raw)) = first(&TIMEOUT_VARS) {
            self.timeout_secs = parse_env(name, &raw)?;
        }
        if let Some((_, agent)) = first(&["MARKETCTX_USER_AGENT"]) {
            self.user_agent = agent;
        }
        if let Some((name, raw)) = first(&["MARKETCTX_LOOKBACK_DAYS"]) {
            let days: u32 = parse_env(name, &raw)?;
            if days == 0 {
                return Err(invalid(name, &raw, "must be at least 1"));
            }
            self.lookback_days = days;
        }
        if let Some((name, raw)) = first(&["MARKETCTX_SERIES_TTL_SECONDS"]) {
            self.series_ttl = Duration::seconds(parse_env(name, &raw)?);
        }
        if let Some((name, raw)) = first(&["MARKETCTX_FUNDAMENTALS_TTL_SECONDS"]) {
            self.fundamentals_ttl = Duration::seconds(parse_env(name, &raw)?);
        }
        if let Some((name, raw)) = first(&["MARKETCTX_SPX_PROXY"]) {
            self.spx_proxy =
                Symbol::parse(&raw).map_err(|error| invalid(name, &raw, error.to_string()))?;
        }
        if let Some((name, raw)) = first(&["MARKETCTX_MIN_PEERS"]) {
            self.min_peers = parse_env(name, &raw)?;
        }
        if let Some((name, raw)) = first(&["MARKETCTX_WINSORIZE_52W"]) {
            self.winsorize_52w = parse_flag(name, &raw)?;
        }

        Ok(self)
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        self.alphavantage_api_key = Some(key.into());
        self
    }

    pub fn without_alphavantage(mut self) -> Self {
        self.alphavantage_api_key = None;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days.max(1);
        self
    }

    pub fn with_series_ttl(mut self, ttl: Duration) -> Self {
        self.series_ttl = ttl;
        self
    }

    pub fn with_fundamentals_ttl(mut self, ttl: Duration) -> Self {
        self.fundamentals_ttl = ttl;
        self
    }

    pub fn with_spx_proxy(mut self, proxy: Symbol) -> Self {
        self.spx_proxy = proxy;
        self
    }

    pub fn with_min_peers(mut self, min_peers: usize) -> Self {
        self.min_peers = min_peers;
        self
    }

    pub fn with_winsorize_52w(mut self, enabled: bool) -> Self {
        self.winsorize_52w = enabled;
        self
    }

    pub fn build(self) -> MarketConfig {
        MarketConfig {
            alphavantage_api_key: self.alphavantage_api_key,
            call_timeout: StdDuration::from_secs(
                self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
            ),
            user_agent: self.user_agent,
            lookback_days: self.lookback_days,
            series_ttl: self.series_ttl,
            fundamentals_ttl: self.fundamentals_ttl,
            spx_proxy: self.spx_proxy,
            min_peers: self.min_peers.max(1),
            max_peers: MAX_PEERS,
            winsorize_52w: self.winsorize_52w,
        }
    }
}

fn parse_env<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|error| invalid(name, raw, error.to_string()))
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, raw, "expected true or false")),
    }
}

fn invalid(name: &'static str, raw: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnv {
        name,
        value: raw.to_owned(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = MarketConfig::default();

        assert_eq!(config.alphavantage_api_key, None);
        assert_eq!(config.call_timeout, StdDuration::from_secs(12));
        assert_eq!(config.lookback_days, 365);
        assert_eq!(config.series_ttl, Duration::hours(24));
        assert_eq!(config.fundamentals_ttl, Duration::days(7));
        assert_eq!(config.spx_proxy.as_str(), "SPY");
        assert_eq!(config.min_peers, 3);
        assert_eq!(config.max_peers, 10);
        assert!(!config.winsorize_52w);
    }

    #[test]
    fn env_overrides_are_applied_in_priority_order() {
        let config = MarketConfig::builder()
            .with_lookup(lookup(&[
                ("ALPHAVANTAGE_API_KEY", "secondary"),
                ("MARKETCTX_ALPHAVANTAGE_API_KEY", "primary"),
                ("HTTP_TIMEOUT_SECONDS", "14"),
                ("MARKETCTX_SPX_PROXY", "$voo"),
                ("MARKETCTX_WINSORIZE_52W", "true"),
                ("MARKETCTX_SERIES_TTL_SECONDS", "60"),
            ]))
            .expect("valid environment")
            .build();

        assert_eq!(config.alphavantage_api_key.as_deref(), Some("primary"));
        assert_eq!(config.call_timeout, StdDuration::from_secs(14));
        assert_eq!(config.spx_proxy.as_str(), "VOO");
        assert!(config.winsorize_52w);
        assert_eq!(config.series_ttl, Duration::seconds(60));
    }

    #[test]
    fn blank_key_does_not_enable_fallback() {
        let config = MarketConfig::builder()
            .with_lookup(lookup(&[("ALPHA_VANTAGE_API_KEY", "   ")]))
            .expect("valid environment")
            .build();

        assert_eq!(config.alphavantage_api_key, None);
        assert!(!config
            .build_chain(Arc::new(ReqwestHttpClient::default()), Arc::new(SystemClock))
            .has_fallback());
    }

    #[test]
    fn timeout_is_clamped() {
        let short = MarketConfig::builder().with_timeout_secs(2).build();
        let long = MarketConfig::builder().with_timeout_secs(90).build();

        assert_eq!(short.call_timeout, StdDuration::from_secs(10));
        assert_eq!(long.call_timeout, StdDuration::from_secs(15));
    }

    #[test]
    fn unparseable_values_name_the_variable() {
        let error = MarketConfig::builder()
            .with_lookup(lookup(&[("MARKETCTX_MIN_PEERS", "three")]))
            .expect_err("must fail");

        match error {
            ConfigError::InvalidEnv { name, value, .. } => {
                assert_eq!(name, "MARKETCTX_MIN_PEERS");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn keyed_config_builds_two_provider_chain() {
        let chain = MarketConfig::builder()
            .with_alphavantage_key("demo")
            .build()
            .build_chain(Arc::new(ReqwestHttpClient::default()), Arc::new(SystemClock));

        assert!(chain.has_fallback());
        assert_eq!(
            chain.providers(),
            vec![crate::ProviderId::Yahoo, crate::ProviderId::Alphavantage]
        );
        assert_eq!(chain.call_timeout(), StdDuration::from_secs(12));
    }
}
