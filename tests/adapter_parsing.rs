//! Behavior tests for the Yahoo and Alpha Vantage adapters wired through
//! the production configuration over a canned transport.

use std::sync::Arc;

use marketctx_core::{
    HttpClient, HttpError, HttpResponse, MarketConfig, MarketContextEngine, ProviderId,
    SourceErrorKind,
};
use marketctx_tests::{start_clock, symbol, RoutedHttpClient};
use time::macros::date;

const YAHOO_CHART_AAPL: &str = r#"{"chart":{"result":[{
    "meta":{"symbol":"AAPL","gmtoffset":-18000},
    "timestamp":[1704292200,1704378600,1704465000,1704724200],
    "indicators":{"quote":[{
        "close":[184.25,181.91,null,185.56],
        "volume":[58414500,71983600,62303300,59144500]}]}}],
    "error":null}}"#;

const YAHOO_CHART_NOT_FOUND: &str = r#"{"chart":{"result":null,
    "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

const YAHOO_SUMMARY_NVDA: &str = r#"{"quoteSummary":{"result":[{
    "assetProfile":{"sector":"Technology","industry":"Semiconductors"},
    "price":{"marketCap":{"raw":3.1e12,"fmt":"3.1T"},"longName":"NVIDIA Corporation"},
    "summaryDetail":{"beta":{"raw":1.68},"trailingPE":{"raw":64.2}},
    "defaultKeyStatistics":{}}],"error":null}}"#;

const AV_DAILY_AAPL: &str = r#"{"Meta Data":{"2. Symbol":"AAPL"},
    "Time Series (Daily)":{
        "2024-01-08":{"1. open":"182.09","4. close":"185.56","5. volume":"59144500"},
        "2024-01-05":{"1. open":"181.99","4. close":"181.18","5. volume":"62303300"},
        "2024-01-04":{"1. open":"182.15","4. close":"181.91","5. volume":"71983600"}}}"#;

const AV_NOTE: &str = r#"{"Note":"Thank you for using Alpha Vantage! Our standard API call frequency is 25 requests per day."}"#;

fn engine_over(
    transport: &Arc<RoutedHttpClient>,
    alphavantage_key: Option<&str>,
) -> MarketContextEngine {
    let builder = MarketConfig::builder().without_alphavantage();
    let builder = match alphavantage_key {
        Some(key) => builder.with_alphavantage_key(key),
        None => builder,
    };
    let http: Arc<dyn HttpClient> = Arc::clone(transport) as Arc<dyn HttpClient>;
    builder
        .build()
        .build_engine_with(http, Arc::new(start_clock()))
}

// =============================================================================
// Yahoo
// =============================================================================

#[tokio::test]
async fn yahoo_chart_is_normalized_to_ascending_dated_closes() {
    // Given: a chart payload with one null close
    let transport = Arc::new(
        RoutedHttpClient::new().route(
            "/v8/finance/chart/AAPL",
            Ok(HttpResponse::ok_json(YAHOO_CHART_AAPL)),
        ),
    );
    let engine = engine_over(&transport, None);

    // When: the series is fetched
    let routed = engine
        .feed()
        .chain()
        .fetch_series(&symbol("AAPL"), 365)
        .await
        .expect("chart should parse");

    // Then: the null session is skipped and dates are exchange-local
    let series = routed.data;
    assert_eq!(series.source, ProviderId::Yahoo);
    assert_eq!(series.closes(), vec![184.25, 181.91, 185.56]);
    assert_eq!(series.points()[0].date, date!(2024 - 01 - 03));
    assert_eq!(series.last().map(|p| p.date), Some(date!(2024 - 01 - 08)));
    assert_eq!(series.points()[0].volume, Some(58_414_500));
    assert!(transport.urls()[0].contains("range=1y&interval=1d"));
}

#[tokio::test]
async fn yahoo_not_found_error_in_body_is_permanent() {
    // Given: Yahoo reports the symbol as unknown
    let transport = Arc::new(RoutedHttpClient::new().route(
        "/v8/finance/chart/ZZZZINVALID",
        Ok(HttpResponse::new(404, YAHOO_CHART_NOT_FOUND)),
    ));
    let engine = engine_over(&transport, Some("demo"));

    // When: the series is fetched
    let failure = engine
        .feed()
        .chain()
        .fetch_series(&symbol("ZZZZINVALID"), 365)
        .await
        .expect_err("unknown symbol");

    // Then: NotFound is returned and Alpha Vantage is never queried
    assert_eq!(failure.kind(), SourceErrorKind::NotFound);
    assert_eq!(transport.requests_matching("alphavantage.co"), 0);
}

#[tokio::test]
async fn yahoo_fundamentals_use_the_crumb_handshake() {
    // Given: cookie, crumb and quoteSummary endpoints
    let transport = Arc::new(
        RoutedHttpClient::new()
            .route("fc.yahoo.com", Ok(HttpResponse::new(404, "")))
            .route(
                "query1.finance.yahoo.com/v1/test/getcrumb",
                Ok(HttpResponse::ok_json("Xy9crumbQ")),
            )
            .route(
                "/v10/finance/quoteSummary/NVDA",
                Ok(HttpResponse::ok_json(YAHOO_SUMMARY_NVDA)),
            ),
    );
    let engine = engine_over(&transport, None);

    // When: fundamentals are fetched twice
    let first = engine
        .feed()
        .chain()
        .fetch_fundamentals(&symbol("NVDA"))
        .await
        .expect("profile should parse");
    engine
        .feed()
        .chain()
        .fetch_fundamentals(&symbol("NVDA"))
        .await
        .expect("profile should parse");

    // Then: labels and valuation are normalized and the crumb is reused
    let fundamentals = first.data;
    assert_eq!(fundamentals.sector.as_deref(), Some("Technology"));
    assert_eq!(fundamentals.industry.as_deref(), Some("Semiconductors"));
    assert_eq!(fundamentals.market_cap, Some(3.1e12));
    assert_eq!(fundamentals.beta, Some(1.68));
    assert_eq!(fundamentals.pe_ratio, Some(64.2));
    assert_eq!(transport.requests_matching("getcrumb"), 1);
    assert_eq!(transport.requests_matching("quoteSummary"), 2);
    assert!(transport.urls().iter().any(|url| url.ends_with("crumb=Xy9crumbQ")));
}

#[tokio::test]
async fn yahoo_transport_failure_is_unavailable() {
    // Given: the network drops every request
    let transport = Arc::new(RoutedHttpClient::new().route(
        "/v8/finance/chart/MSFT",
        Err(HttpError::timeout("deadline elapsed")),
    ));
    let engine = engine_over(&transport, None);

    // When: the series is fetched
    let failure = engine
        .feed()
        .chain()
        .fetch_series(&symbol("MSFT"), 365)
        .await
        .expect_err("transport failed");

    // Then: the failure is transient
    assert_eq!(failure.kind(), SourceErrorKind::Unavailable);
}

// =============================================================================
// Alpha Vantage fallback
// =============================================================================

#[tokio::test]
async fn throttled_yahoo_falls_back_to_alpha_vantage_daily_series() {
    // Given: Yahoo answers 429 and Alpha Vantage has the history
    let transport = Arc::new(
        RoutedHttpClient::new()
            .route("/v8/finance/chart/AAPL", Ok(HttpResponse::new(429, "Too Many Requests")))
            .route(
                "function=TIME_SERIES_DAILY&symbol=AAPL",
                Ok(HttpResponse::ok_json(AV_DAILY_AAPL)),
            ),
    );
    let engine = engine_over(&transport, Some("demo"));

    // When: the series is fetched
    let routed = engine
        .feed()
        .chain()
        .fetch_series(&symbol("AAPL"), 365)
        .await
        .expect("fallback should answer");

    // Then: the series is tagged with the fallback and sorted ascending
    assert_eq!(routed.selected_source, ProviderId::Alphavantage);
    assert_eq!(routed.data.source, ProviderId::Alphavantage);
    assert_eq!(routed.data.closes(), vec![181.91, 181.18, 185.56]);
    assert!(transport
        .urls()
        .iter()
        .any(|url| url.contains("apikey=demo") && url.contains("outputsize=full")));
}

#[tokio::test]
async fn alpha_vantage_note_is_reported_as_rate_limited() {
    // Given: both providers throttled, Alpha Vantage via an in-band note
    let transport = Arc::new(
        RoutedHttpClient::new()
            .route("/v8/finance/chart/AAPL", Ok(HttpResponse::new(429, "")))
            .route("alphavantage.co", Ok(HttpResponse::ok_json(AV_NOTE))),
    );
    let engine = engine_over(&transport, Some("demo"));

    // When: the series is fetched
    let failure = engine
        .feed()
        .chain()
        .fetch_series(&symbol("AAPL"), 365)
        .await
        .expect_err("both providers throttled");

    // Then: the final error is RateLimited from Alpha Vantage
    let (provider, error) = failure.errors.last().expect("errors recorded");
    assert_eq!(*provider, ProviderId::Alphavantage);
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert_eq!(failure.errors.len(), 2);
}

#[tokio::test]
async fn share_classes_are_spelled_with_a_dot_for_alpha_vantage() {
    // Given: Yahoo down and a dash share-class ticker
    let transport = Arc::new(
        RoutedHttpClient::new()
            .route("/v8/finance/chart/", Ok(HttpResponse::new(503, "")))
            .route("alphavantage.co", Ok(HttpResponse::ok_json(AV_DAILY_AAPL))),
    );
    let engine = engine_over(&transport, Some("demo"));

    // When: BRK-B is fetched
    engine
        .feed()
        .chain()
        .fetch_series(&symbol("BRK-B"), 30)
        .await
        .expect("fallback should answer");

    // Then: the Alpha Vantage query uses BRK.B and compact output
    let urls = transport.urls();
    let query = urls
        .iter()
        .find(|url| url.contains("alphavantage.co"))
        .expect("fallback queried");
    assert!(query.contains("symbol=BRK.B"), "{query}");
    assert!(query.contains("outputsize=compact"));
}
