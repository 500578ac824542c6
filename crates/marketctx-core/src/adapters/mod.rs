mod alphavantage;
mod yahoo;

pub use alphavantage::AlphaVantageAdapter;
pub use yahoo::YahooAdapter;

use time::{Date, Duration};

use crate::data_source::SourceError;
use crate::http_client::{HttpError, HttpResponse};
use crate::{PricePoint, ProviderId};

/// Maps a non-2xx status onto the provider error taxonomy.
fn status_error(provider: ProviderId, response: &HttpResponse) -> SourceError {
    match response.status {
        404 => SourceError::not_found(format!("{provider} returned 404")),
        429 => SourceError::rate_limited(format!("{provider} returned 429 Too Many Requests")),
        status => SourceError::unavailable(format!("{provider} returned status {status}")),
    }
}

fn transport_error(provider: ProviderId, error: &HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::unavailable(format!("{provider} request timed out: {}", error.message()))
    } else {
        SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
    }
}

/// Keeps points dated within `lookback_days` calendar days of the newest point.
fn trim_to_lookback(points: Vec<PricePoint>, lookback_days: u32) -> Vec<PricePoint> {
    let Some(newest) = points.iter().map(|point| point.date).max() else {
        return points;
    };
    let cutoff: Date = newest
        .checked_sub(Duration::days(i64::from(lookback_days)))
        .unwrap_or(Date::MIN);
    points.into_iter().filter(|point| point.date > cutoff).collect()
}

/// Parses numbers that providers sometimes send as strings, treating
/// placeholders such as `"None"` or `"-"` as absent.
fn parse_loose_f64(raw: &str) -> Option<f64> {
    if is_placeholder(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("none")
}
