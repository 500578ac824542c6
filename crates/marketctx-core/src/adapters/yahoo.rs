use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use super::{status_error, transport_error, trim_to_lookback};
use crate::circuit_breaker::CircuitBreaker;
use crate::clock::{Clock, SystemClock};
use crate::data_source::{MarketDataProvider, ProviderFuture, SeriesRequest, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol, TickerFundamentals, UtcDateTime};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str = "assetProfile,price,summaryDetail,defaultKeyStatistics";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    fetched_at: UtcDateTime,
}

/// Cookie/crumb handshake required by the quoteSummary endpoint.
///
/// The session cookie lives in the transport's cookie jar; only the crumb is
/// held here. Refreshes are serialized by the async mutex so concurrent
/// callers share one handshake.
#[derive(Debug, Default)]
struct CrumbStore {
    crumb: Mutex<Option<CachedCrumb>>,
}

impl CrumbStore {
    async fn get(
        &self,
        http_client: &dyn HttpClient,
        clock: &dyn Clock,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let mut guard = self.crumb.lock().await;
        if let Some(cached) = guard.as_ref() {
            if clock.now().since(cached.fetched_at) < CRUMB_TTL {
                return Ok(cached.value.clone());
            }
        }

        let value = fetch_crumb(http_client, timeout_ms).await?;
        *guard = Some(CachedCrumb {
            value: value.clone(),
            fetched_at: clock.now(),
        });
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

async fn fetch_crumb(http_client: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    // fc.yahoo.com answers 404 but still sets the session cookie.
    http_client
        .execute(cookie_request)
        .await
        .map_err(|e| transport_error(ProviderId::Yahoo, &e))?;

    for endpoint in CRUMB_URLS {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        let Ok(response) = http_client.execute(request).await else {
            continue;
        };
        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "yahoo rate limited the crumb handshake",
            ));
        }
        let body = response.body.trim();
        if response.is_success() && is_plausible_crumb(body) {
            return Ok(body.to_owned());
        }
    }

    Err(SourceError::unavailable(
        "failed to obtain a yahoo crumb from any endpoint",
    ))
}

fn is_plausible_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
        && !body.to_ascii_lowercase().contains("too many requests")
}

/// Primary provider backed by Yahoo Finance's public chart and quoteSummary APIs.
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    clock: Arc<dyn Clock>,
    crumbs: CrumbStore,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            clock: Arc::new(SystemClock),
            crumbs: CrumbStore::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Drives the crumb lifetime and the breaker cooldown from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.circuit_breaker = Arc::new(CircuitBreaker::new(
            self.circuit_breaker.config(),
            Arc::clone(&clock),
        ));
        self.clock = clock;
        self
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Executes a GET guarded by the circuit breaker.
    ///
    /// NotFound responses count as success for the breaker: the upstream is
    /// healthy, the symbol is not.
    async fn get(&self, url: &str) -> Result<HttpResponse, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "yahoo circuit breaker is open; skipping upstream call",
            ));
        }

        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|e| {
            self.circuit_breaker.record_failure();
            transport_error(ProviderId::Yahoo, &e)
        })?;

        if response.is_success() || response.status == 404 {
            self.circuit_breaker.record_success();
        } else {
            self.circuit_breaker.record_failure();
        }
        Ok(response)
    }

    async fn series(&self, req: SeriesRequest) -> Result<PriceSeries, SourceError> {
        let url = format!(
            "{CHART_URL}/{}?range={}&interval=1d&includePrePost=false",
            urlencoding::encode(req.symbol.as_str()),
            chart_range(req.lookback_days)
        );
        let response = self.get(&url).await?;
        let points = parse_chart(&response)?;
        let points = trim_to_lookback(points, req.lookback_days);
        if points.is_empty() {
            return Err(SourceError::not_found(format!(
                "yahoo has no daily history for '{}'",
                req.symbol
            )));
        }

        debug!(symbol = %req.symbol, points = points.len(), "yahoo series fetched");
        Ok(PriceSeries::new(req.symbol, ProviderId::Yahoo, points))
    }

    async fn fundamentals(&self, symbol: Symbol) -> Result<TickerFundamentals, SourceError> {
        let mut refreshed = false;
        loop {
            let crumb = self
                .crumbs
                .get(self.http_client.as_ref(), self.clock.as_ref(), self.timeout_ms)
                .await?;
            let url = format!(
                "{SUMMARY_URL}/{}?modules={SUMMARY_MODULES}&crumb={}",
                urlencoding::encode(symbol.as_str()),
                urlencoding::encode(&crumb)
            );
            let response = self.get(&url).await?;

            if matches!(response.status, 401 | 403) && !refreshed {
                debug!(symbol = %symbol, "yahoo crumb rejected; refreshing");
                self.crumbs.invalidate().await;
                refreshed = true;
                continue;
            }

            return parse_summary(&symbol, &response);
        }
    }
}

impl MarketDataProvider for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch_series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(self.series(req))
    }

    fn fetch_fundamentals<'a>(&'a self, symbol: Symbol) -> ProviderFuture<'a, TickerFundamentals> {
        Box::pin(self.fundamentals(symbol))
    }
}

/// Smallest chart range that covers the requested number of calendar days.
fn chart_range(lookback_days: u32) -> &'static str {
    match lookback_days {
        0..=31 => "1mo",
        32..=92 => "3mo",
        93..=183 => "6mo",
        184..=366 => "1y",
        367..=731 => "2y",
        _ => "5y",
    }
}

fn parse_chart(response: &HttpResponse) -> Result<Vec<PricePoint>, SourceError> {
    let parsed: Option<YahooChartResponse> = serde_json::from_str(&response.body).ok();

    if let Some(error) = parsed.as_ref().and_then(|p| p.chart.error.as_ref()) {
        return Err(api_error("chart", error));
    }
    if !response.is_success() {
        return Err(status_error(ProviderId::Yahoo, response));
    }
    let chart = parsed
        .ok_or_else(|| SourceError::unavailable("yahoo chart payload is malformed"))?
        .chart;

    let Some(result) = chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let points = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = quote.close.get(i).copied().flatten()?;
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());
            let date = OffsetDateTime::from_unix_timestamp(ts.saturating_add(offset))
                .ok()?
                .date();
            PricePoint::new(date, close, volume).ok()
        })
        .collect();

    Ok(points)
}

fn parse_summary(
    symbol: &Symbol,
    response: &HttpResponse,
) -> Result<TickerFundamentals, SourceError> {
    let parsed: Option<YahooQuoteSummaryResponse> = serde_json::from_str(&response.body).ok();

    if let Some(error) = parsed.as_ref().and_then(|p| p.quote_summary.error.as_ref()) {
        return Err(api_error("quoteSummary", error));
    }
    if !response.is_success() {
        return Err(status_error(ProviderId::Yahoo, response));
    }
    let summary = parsed
        .ok_or_else(|| SourceError::unavailable("yahoo quoteSummary payload is malformed"))?
        .quote_summary;

    let result = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("yahoo has no profile for '{symbol}'")))?;

    let profile = result.asset_profile.unwrap_or_default();
    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    let fundamentals = TickerFundamentals {
        long_name: price.long_name.or(price.short_name),
        sector: profile.sector,
        industry: profile.industry,
        market_cap: raw(&price.market_cap).or_else(|| raw(&detail.market_cap)),
        beta: raw(&detail.beta).or_else(|| raw(&stats.beta)),
        pe_ratio: raw(&detail.trailing_pe),
        ..TickerFundamentals::empty(symbol.clone(), ProviderId::Yahoo)
    };
    Ok(fundamentals.sanitized())
}

fn api_error(endpoint: &str, error: &YahooApiError) -> SourceError {
    let code = error.code.as_deref().unwrap_or_default();
    let description = error.description.as_deref().unwrap_or("no description");
    if code.eq_ignore_ascii_case("not found") {
        SourceError::not_found(format!("yahoo {endpoint}: {description}"))
    } else if code.to_ascii_lowercase().contains("too many") {
        SourceError::rate_limited(format!("yahoo {endpoint}: {description}"))
    } else {
        SourceError::unavailable(format!("yahoo {endpoint} error {code}: {description}"))
    }
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<YahooAssetProfile>,
    #[serde(default)]
    price: Option<YahooPriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooKeyStatistics>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooAssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooPriceModule {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(default)]
    beta: Option<YahooRawValue>,
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooKeyStatistics {
    #[serde(default)]
    beta: Option<YahooRawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`; an empty object means absent.
#[derive(Debug, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpError;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex as StdMutex;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    /// Replays scripted responses in order and records every request.
    #[derive(Debug, Default)]
    struct RecordingHttpClient {
        responses: StdMutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: StdMutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn scripted(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: StdMutex::new(responses.into()),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self
                .responses
                .lock()
                .expect("response script should not be poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
            Box::pin(async move { response })
        }
    }

    const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL","gmtoffset":-18000},
        "timestamp":[1704292200,1704378600,1704465000],
        "indicators":{"quote":[{"close":[184.25,null,181.18],"volume":[58414500,71983600,62303300]}]}}],
        "error":null}}"#;

    fn adapter(client: Arc<RecordingHttpClient>) -> YahooAdapter {
        YahooAdapter::new(client)
    }

    fn request(raw: &str) -> SeriesRequest {
        SeriesRequest::new(Symbol::parse(raw).expect("valid symbol"), 365).expect("valid request")
    }

    #[test]
    fn parses_chart_and_skips_null_closes() {
        let client = Arc::new(RecordingHttpClient::scripted(vec![Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))]));
        let adapter = adapter(Arc::clone(&client));

        let series = block_on(adapter.fetch_series(request("aapl"))).expect("series should parse");

        assert_eq!(series.source, ProviderId::Yahoo);
        assert_eq!(series.symbol.as_str(), "AAPL");
        assert_eq!(series.closes(), vec![184.25, 181.18]);
        assert_eq!(series.points()[0].date.to_string(), "2024-01-03");
        assert_eq!(series.points()[0].volume, Some(58_414_500));
        assert!(client.recorded_urls()[0].contains("/v8/finance/chart/AAPL?range=1y&interval=1d"));
    }

    #[test]
    fn chart_not_found_maps_to_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client =
            Arc::new(RecordingHttpClient::scripted(vec![Ok(HttpResponse::new(404, body))]));

        let error = block_on(adapter(client).fetch_series(request("ZZZZINVALID")))
            .expect_err("unknown symbol should fail");

        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(error.message().contains("delisted"));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let client = Arc::new(RecordingHttpClient::scripted(vec![Ok(HttpResponse::new(
            429,
            "Too Many Requests",
        ))]));

        let error = block_on(adapter(client).fetch_series(request("AAPL"))).expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }

    #[test]
    fn malformed_payload_is_unavailable() {
        let client = Arc::new(RecordingHttpClient::scripted(vec![Ok(HttpResponse::ok_json(
            "<html>oops</html>",
        ))]));

        let error = block_on(adapter(client).fetch_series(request("AAPL"))).expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    #[test]
    fn circuit_breaker_opens_after_repeated_transport_failures() {
        let client = Arc::new(RecordingHttpClient::scripted(
            (0..3).map(|_| Err(HttpError::timeout("upstream timeout"))).collect(),
        ));
        let adapter = adapter(Arc::clone(&client));

        for _ in 0..3 {
            let error = block_on(adapter.fetch_series(request("MSFT"))).expect_err("must fail");
            assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        }

        let error = block_on(adapter.fetch_series(request("MSFT"))).expect_err("breaker blocks");
        assert!(error.message().contains("circuit breaker is open"));
        assert_eq!(client.recorded_urls().len(), 3, "open breaker makes no call");
    }

    #[test]
    fn fundamentals_perform_crumb_handshake_and_parse_profile() {
        let summary = r#"{"quoteSummary":{"result":[{
            "assetProfile":{"sector":"Technology","industry":"Consumer Electronics"},
            "price":{"marketCap":{"raw":2.9e12,"fmt":"2.9T"},"longName":"Apple Inc."},
            "summaryDetail":{"beta":{"raw":1.29},"trailingPE":{"raw":29.8}},
            "defaultKeyStatistics":{"beta":{}}}],"error":null}}"#;
        let client = Arc::new(RecordingHttpClient::scripted(vec![
            Ok(HttpResponse::new(404, "")),
            Ok(HttpResponse::ok_json("abcCRUMB123")),
            Ok(HttpResponse::ok_json(summary)),
        ]));
        let adapter = adapter(Arc::clone(&client));

        let fundamentals = block_on(
            adapter.fetch_fundamentals(Symbol::parse("AAPL").expect("valid symbol")),
        )
        .expect("fundamentals should parse");

        assert_eq!(fundamentals.sector.as_deref(), Some("Technology"));
        assert_eq!(fundamentals.industry.as_deref(), Some("Consumer Electronics"));
        assert_eq!(fundamentals.market_cap, Some(2.9e12));
        assert_eq!(fundamentals.beta, Some(1.29));
        assert_eq!(fundamentals.pe_ratio, Some(29.8));
        assert_eq!(fundamentals.long_name.as_deref(), Some("Apple Inc."));

        let urls = client.recorded_urls();
        assert_eq!(urls.len(), 3);
        assert!(urls[2].ends_with("crumb=abcCRUMB123"));
    }

    #[test]
    fn rejected_crumb_is_refreshed_once() {
        let summary = r#"{"quoteSummary":{"result":[{"assetProfile":{"sector":"Energy"}}],"error":null}}"#;
        let client = Arc::new(RecordingHttpClient::scripted(vec![
            Ok(HttpResponse::new(404, "")),
            Ok(HttpResponse::ok_json("first")),
            Ok(HttpResponse::new(401, r#"{"finance":{"error":{"code":"Unauthorized"}}}"#)),
            Ok(HttpResponse::new(404, "")),
            Ok(HttpResponse::ok_json("second")),
            Ok(HttpResponse::ok_json(summary)),
        ]));
        let adapter = adapter(Arc::clone(&client));

        let fundamentals = block_on(
            adapter.fetch_fundamentals(Symbol::parse("XOM").expect("valid symbol")),
        )
        .expect("second attempt should succeed");

        assert_eq!(fundamentals.sector.as_deref(), Some("Energy"));
        assert!(client.recorded_urls()[5].ends_with("crumb=second"));
    }

    #[test]
    fn chart_range_covers_lookback() {
        assert_eq!(chart_range(20), "1mo");
        assert_eq!(chart_range(90), "3mo");
        assert_eq!(chart_range(365), "1y");
        assert_eq!(chart_range(700), "2y");
        assert_eq!(chart_range(2000), "5y");
    }

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_wake(_: *const ()) {}

    unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

    unsafe fn noop_raw_waker_drop(_: *const ()) {}

    static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_wake,
        noop_raw_waker_wake_by_ref,
        noop_raw_waker_drop,
    );
}
