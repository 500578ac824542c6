use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::macros::format_description;
use time::Date;
use tracing::debug;

use super::{is_placeholder, parse_loose_f64, status_error, transport_error, trim_to_lookback};
use crate::circuit_breaker::CircuitBreaker;
use crate::clock::Clock;
use crate::data_source::{MarketDataProvider, ProviderFuture, SeriesRequest, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::throttling::RequestBudget;
use crate::{PricePoint, PriceSeries, ProviderId, Symbol, TickerFundamentals};

const QUERY_URL: &str = "https://www.alphavantage.co/query";
/// Points returned by `outputsize=compact`.
const COMPACT_POINTS: u32 = 100;

/// Keyed fallback provider backed by Alpha Vantage.
///
/// Only constructed when an API key is configured. Calls are metered by a
/// local budget matching the free tier so an exhausted quota is reported as
/// rate limited without a network round-trip.
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    circuit_breaker: Arc<CircuitBreaker>,
    budget: RequestBudget,
    timeout_ms: u64,
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            budget: RequestBudget::alphavantage_free_tier(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_budget(mut self, budget: RequestBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Measures the breaker cooldown with `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.circuit_breaker = Arc::new(CircuitBreaker::new(self.circuit_breaker.config(), clock));
        self
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    async fn query(
        &self,
        function: &str,
        symbol: &Symbol,
        extra: &str,
    ) -> Result<Value, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "alphavantage circuit breaker is open; skipping upstream call",
            ));
        }

        if let Err(wait) = self.budget.try_acquire() {
            return Err(SourceError::rate_limited(format!(
                "alphavantage free-tier budget exhausted; retry in {:.1}s",
                wait.as_secs_f64()
            )));
        }

        let url = format!(
            "{QUERY_URL}?function={function}&symbol={}{extra}&apikey={}",
            urlencoding::encode(&provider_symbol(symbol)),
            urlencoding::encode(&self.api_key)
        );
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|e| {
            self.circuit_breaker.record_failure();
            transport_error(ProviderId::Alphavantage, &e)
        })?;

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(status_error(ProviderId::Alphavantage, &response));
        }
        self.circuit_breaker.record_success();

        parse_envelope(&response)
    }

    async fn series(&self, req: SeriesRequest) -> Result<PriceSeries, SourceError> {
        let outputsize = if req.lookback_days <= COMPACT_POINTS {
            "compact"
        } else {
            "full"
        };
        let payload = self
            .query(
                "TIME_SERIES_DAILY",
                &req.symbol,
                &format!("&outputsize={outputsize}"),
            )
            .await?;

        let points = parse_daily_series(payload)?;
        let points = trim_to_lookback(points, req.lookback_days);
        if points.is_empty() {
            return Err(SourceError::not_found(format!(
                "alphavantage has no daily history for '{}'",
                req.symbol
            )));
        }

        debug!(symbol = %req.symbol, points = points.len(), "alphavantage series fetched");
        Ok(PriceSeries::new(req.symbol, ProviderId::Alphavantage, points))
    }

    async fn fundamentals(&self, symbol: Symbol) -> Result<TickerFundamentals, SourceError> {
        let payload = self.query("OVERVIEW", &symbol, "").await?;
        parse_overview(&symbol, payload)
    }
}

impl MarketDataProvider for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn fetch_series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(self.series(req))
    }

    fn fetch_fundamentals<'a>(&'a self, symbol: Symbol) -> ProviderFuture<'a, TickerFundamentals> {
        Box::pin(self.fundamentals(symbol))
    }
}

/// Alpha Vantage spells share classes with a dot (`BRK.B`).
fn provider_symbol(symbol: &Symbol) -> String {
    match symbol.as_str().rsplit_once('-') {
        Some((base, class)) if class.len() == 1 => format!("{base}.{class}"),
        _ => symbol.as_str().to_owned(),
    }
}

/// Decodes the JSON body and maps in-band notices onto the error taxonomy.
///
/// Alpha Vantage answers HTTP 200 for throttling (`Note`, `Information`) and
/// for unknown symbols (`Error Message`).
fn parse_envelope(response: &HttpResponse) -> Result<Value, SourceError> {
    let payload: Value = serde_json::from_str(&response.body)
        .map_err(|e| SourceError::unavailable(format!("alphavantage payload is malformed: {e}")))?;

    let notice = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_owned);
    if let Some(message) = notice("Note").or_else(|| notice("Information")) {
        return Err(SourceError::rate_limited(format!("alphavantage: {message}")));
    }
    if let Some(message) = notice("Error Message") {
        return Err(SourceError::not_found(format!("alphavantage: {message}")));
    }
    if !payload.is_object() {
        return Err(SourceError::unavailable("alphavantage payload is not an object"));
    }
    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: Option<HashMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume", default)]
    volume: Option<String>,
}

fn parse_daily_series(payload: Value) -> Result<Vec<PricePoint>, SourceError> {
    let parsed: DailySeriesResponse = serde_json::from_value(payload).map_err(|e| {
        SourceError::unavailable(format!("alphavantage daily series is malformed: {e}"))
    })?;
    let Some(series) = parsed.series else {
        return Ok(Vec::new());
    };

    let date_format = format_description!("[year]-[month]-[day]");
    let points = series
        .into_iter()
        .filter_map(|(date, bar)| {
            let date = Date::parse(&date, date_format).ok()?;
            let close = parse_loose_f64(&bar.close)?;
            let volume = bar
                .volume
                .as_deref()
                .and_then(|raw| raw.trim().parse::<u64>().ok());
            PricePoint::new(date, close, volume).ok()
        })
        .collect();

    Ok(points)
}

#[derive(Debug, Default, Deserialize)]
struct CompanyOverview {
    #[serde(rename = "Symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Sector", default)]
    sector: Option<String>,
    #[serde(rename = "Industry", default)]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization", default)]
    market_cap: Option<String>,
    #[serde(rename = "Beta", default)]
    beta: Option<String>,
    #[serde(rename = "PERatio", default)]
    pe_ratio: Option<String>,
}

fn parse_overview(symbol: &Symbol, payload: Value) -> Result<TickerFundamentals, SourceError> {
    let overview: CompanyOverview = serde_json::from_value(payload).map_err(|e| {
        SourceError::unavailable(format!("alphavantage overview is malformed: {e}"))
    })?;
    if overview.symbol.is_none() {
        return Err(SourceError::not_found(format!(
            "alphavantage has no overview for '{symbol}'"
        )));
    }

    let number = |raw: &Option<String>| raw.as_deref().and_then(parse_loose_f64);
    let text = |raw: Option<String>| raw.filter(|value| !is_placeholder(value));

    let fundamentals = TickerFundamentals {
        market_cap: number(&overview.market_cap),
        beta: number(&overview.beta),
        pe_ratio: number(&overview.pe_ratio),
        long_name: text(overview.name),
        sector: text(overview.sector).map(|s| title_case(&s)),
        industry: text(overview.industry).map(|s| title_case(&s)),
        ..TickerFundamentals::empty(symbol.clone(), ProviderId::Alphavantage)
    };
    Ok(fundamentals.sanitized())
}

/// Alpha Vantage reports labels in upper case (`TECHNOLOGY`).
fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
