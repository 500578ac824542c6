use serde::{Deserialize, Serialize};
use time::Date;

use crate::{ProviderId, Symbol, ValidationError};

/// Daily close for one trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl PricePoint {
    pub fn new(date: Date, close: f64, volume: Option<u64>) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        if close <= 0.0 {
            return Err(ValidationError::NonPositiveValue { field: "close" });
        }

        Ok(Self {
            date,
            close,
            volume,
        })
    }
}

/// Ascending, date-unique daily series tagged with its ticker and source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub source: ProviderId,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from unordered points.
    ///
    /// Points are sorted by date. When a date repeats, the point that came
    /// last in the input wins, which matches how providers append
    /// corrections for the current session.
    pub fn new(symbol: Symbol, source: ProviderId, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            symbol,
            source,
            points: deduped,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    /// Volumes of the sessions that reported one, oldest first.
    pub fn volumes(&self) -> Vec<u64> {
        self.points.iter().filter_map(|point| point.volume).collect()
    }

    /// The trailing `n` points, or all of them when the series is shorter.
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

/// Slow-moving company profile and valuation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerFundamentals {
    pub symbol: Symbol,
    pub source: ProviderId,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,
}

impl TickerFundamentals {
    pub fn empty(symbol: Symbol, source: ProviderId) -> Self {
        Self {
            symbol,
            source,
            long_name: None,
            sector: None,
            industry: None,
            market_cap: None,
            beta: None,
            pe_ratio: None,
        }
    }

    /// Drops labels that cannot be real sectors/industries and non-finite numbers.
    pub fn sanitized(self) -> Self {
        Self {
            sector: self.sector.as_deref().and_then(clean_profile_label),
            industry: self.industry.as_deref().and_then(clean_profile_label),
            long_name: self
                .long_name
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
            market_cap: self.market_cap.filter(|v| v.is_finite() && *v > 0.0),
            beta: self.beta.filter(|v| v.is_finite()),
            pe_ratio: self.pe_ratio.filter(|v| v.is_finite()),
            ..self
        }
    }

    pub fn has_profile(&self) -> bool {
        self.sector.is_some() || self.industry.is_some()
    }
}

const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "inc.",
    "incorporated",
    "corp",
    "corp.",
    "corporation",
    "ltd",
    "ltd.",
    "limited",
    "llc",
    "plc",
    "co",
    "co.",
    "company",
    "holdings",
    "group",
    "sa",
    "ag",
    "nv",
];

/// Normalizes a free-text sector or industry label.
///
/// Returns `None` for blank values, bare corporate suffixes and single short
/// all-caps tokens, which in practice are tickers leaked into the profile.
pub fn clean_profile_label(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if CORPORATE_SUFFIXES.contains(&value.to_ascii_lowercase().as_str()) {
        return None;
    }
    let looks_like_ticker = value.chars().count() <= 4
        && value.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit());
    if looks_like_ticker {
        return None;
    }
    Some(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    #[test]
    fn series_is_sorted_and_deduplicated() {
        let points = vec![
            PricePoint::new(date!(2024 - 01 - 03), 12.0, None).expect("valid"),
            PricePoint::new(date!(2024 - 01 - 02), 11.0, Some(5)).expect("valid"),
            PricePoint::new(date!(2024 - 01 - 03), 12.5, Some(7)).expect("valid"),
        ];

        let series = PriceSeries::new(symbol(), ProviderId::Yahoo, points);

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![11.0, 12.5]);
        assert_eq!(series.volumes(), vec![5, 7]);
    }

    #[test]
    fn rejects_non_positive_close() {
        let err = PricePoint::new(date!(2024 - 01 - 02), 0.0, None).expect_err("must fail");
        assert_eq!(err, ValidationError::NonPositiveValue { field: "close" });
        let err = PricePoint::new(date!(2024 - 01 - 02), f64::NAN, None).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "close" });
    }

    #[test]
    fn tail_returns_whole_series_when_short() {
        let points = vec![PricePoint::new(date!(2024 - 01 - 02), 1.0, None).expect("valid")];
        let series = PriceSeries::new(symbol(), ProviderId::Yahoo, points);
        assert_eq!(series.tail(32).len(), 1);
    }

    #[test]
    fn profile_labels_reject_suffixes_and_short_tokens() {
        assert_eq!(clean_profile_label(" Technology "), Some(String::from("Technology")));
        assert_eq!(clean_profile_label("Inc."), None);
        assert_eq!(clean_profile_label("AAPL"), None);
        assert_eq!(clean_profile_label("  "), None);
        assert_eq!(clean_profile_label("Bank"), Some(String::from("Bank")));
        assert_eq!(
            clean_profile_label("Oil & Gas E&P"),
            Some(String::from("Oil & Gas E&P"))
        );
    }

    #[test]
    fn sanitized_fundamentals_drop_bad_values() {
        let raw = TickerFundamentals {
            sector: Some(String::from("Corp")),
            industry: Some(String::from("Semiconductors")),
            market_cap: Some(0.0),
            beta: Some(f64::INFINITY),
            pe_ratio: Some(31.5),
            ..TickerFundamentals::empty(symbol(), ProviderId::Yahoo)
        };

        let clean = raw.sanitized();

        assert_eq!(clean.sector, None);
        assert_eq!(clean.industry.as_deref(), Some("Semiconductors"));
        assert_eq!(clean.market_cap, None);
        assert_eq!(clean.beta, None);
        assert_eq!(clean.pe_ratio, Some(31.5));
    }
}
