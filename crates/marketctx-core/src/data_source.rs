//! Provider contract and error taxonomy.
//!
//! Every upstream implements [`MarketDataProvider`]. Two operations are
//! needed by the engine:
//!
//! | Operation | Request | Response | Failure kinds |
//! |-----------|---------|----------|---------------|
//! | Series | [`SeriesRequest`] | [`PriceSeries`] | NotFound, RateLimited, Unavailable |
//! | Fundamentals | [`Symbol`] | [`TickerFundamentals`] | NotFound, RateLimited, Unavailable |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{PriceSeries, ProviderId, Symbol, TickerFundamentals};

/// Boxed future returned by provider operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// The symbol does not exist upstream. Permanent.
    NotFound,
    /// The upstream refused the call because of quota.
    RateLimited,
    /// Network failure, timeout, open circuit, 5xx or malformed payload.
    Unavailable,
    /// The request could not be expressed to the upstream.
    InvalidRequest,
}

impl SourceErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Unavailable => "unavailable",
            Self::InvalidRequest => "invalid_request",
        }
    }

    /// Transient failures that another provider may be able to serve.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable)
    }
}

impl Display for SourceErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured provider error used by the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.kind.is_transient()
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Daily history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    pub lookback_days: u32,
}

impl SeriesRequest {
    pub fn new(symbol: Symbol, lookback_days: u32) -> Result<Self, SourceError> {
        if lookback_days == 0 {
            return Err(SourceError::invalid_request(
                "series lookback must be at least one day",
            ));
        }
        Ok(Self {
            symbol,
            lookback_days,
        })
    }
}

/// Upstream market data source.
///
/// Implementations must be `Send + Sync`; one instance serves every
/// concurrent request.
pub trait MarketDataProvider: Send + Sync {
    /// Identifier attached to every result this provider returns.
    fn id(&self) -> ProviderId;

    /// Fetches daily closes and volumes covering `req.lookback_days`.
    fn fetch_series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries>;

    /// Fetches the profile and valuation snapshot for `symbol`.
    fn fetch_fundamentals<'a>(&'a self, symbol: Symbol) -> ProviderFuture<'a, TickerFundamentals>;
}
