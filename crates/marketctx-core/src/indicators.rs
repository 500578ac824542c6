//! Price and volume indicators over a daily close series.
//!
//! Every function is pure and returns `None` when the series is too short
//! for the indicator to mean anything. Short history is never reported as
//! zero.

use serde::{Deserialize, Serialize};

use crate::PriceSeries;

pub const VOLATILITY_WINDOW: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const SHORT_MA_WINDOW: usize = 50;
pub const LONG_MA_WINDOW: usize = 200;
pub const TRADING_DAYS_PER_YEAR: usize = 252;
pub const VOLUME_WINDOW: usize = 20;
pub const UNUSUAL_VOLUME_RATIO: f64 = 2.0;
pub const NEAR_HIGH_THRESHOLD_PCT: f64 = -5.0;

const WINSOR_LOW_QUANTILE: f64 = 0.01;
const WINSOR_HIGH_QUANTILE: f64 = 0.99;

/// Bucketed 20-day volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

impl VolatilityRegime {
    /// Below 1% is low, above 3% is high, both bounds inclusive for normal.
    pub fn classify(volatility_pct: f64) -> Option<Self> {
        if !volatility_pct.is_finite() {
            return None;
        }
        Some(if volatility_pct < 1.0 {
            Self::Low
        } else if volatility_pct > 3.0 {
            Self::High
        } else {
            Self::Normal
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// Percentage change between the last two closes.
pub fn day_move_pct(closes: &[f64]) -> Option<f64> {
    let [.., prev, last] = closes else {
        return None;
    };
    pct_change(*prev, *last)
}

/// Close-to-close returns in percent, oldest first.
pub fn daily_returns_pct(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter_map(|pair| pct_change(pair[0], pair[1]))
        .collect()
}

/// Population standard deviation of the trailing 20 daily returns, in percent.
pub fn volatility_20d(closes: &[f64]) -> Option<f64> {
    if closes.len() < VOLATILITY_WINDOW + 1 {
        return None;
    }
    let returns = daily_returns_pct(&closes[closes.len() - (VOLATILITY_WINDOW + 1)..]);
    if returns.len() < VOLATILITY_WINDOW {
        return None;
    }
    population_std_dev(&returns)
}

/// Today's move expressed in units of 20-day volatility.
pub fn move_zscore(day_move_pct: Option<f64>, volatility_pct: Option<f64>) -> Option<f64> {
    let volatility = volatility_pct.filter(|v| *v > 0.0)?;
    finite(day_move_pct? / volatility)
}

/// Wilder's 14-period RSI over the whole series.
pub fn rsi_14(closes: &[f64]) -> Option<f64> {
    if closes.len() < RSI_PERIOD + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let (seed, rest) = deltas.split_at(RSI_PERIOD);

    let period = RSI_PERIOD as f64;
    let mut avg_gain = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / period;
    let mut avg_loss = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period;

    for delta in rest {
        avg_gain = (avg_gain * (period - 1.0) + delta.max(0.0)) / period;
        avg_loss = (avg_loss * (period - 1.0) + (-delta).max(0.0)) / period;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    finite(100.0 - 100.0 / (1.0 + rs)).map(|rsi| rsi.clamp(0.0, 100.0))
}

/// Mean of the last `window` closes.
pub fn simple_moving_average(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    mean(&closes[closes.len() - window..])
}

/// Highest and lowest close over roughly one trading year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearRange {
    pub high: f64,
    pub low: f64,
}

/// Range over the trailing 252 closes, optionally clipped to the
/// 1st/99th percentiles first so a single bad print cannot set the range.
pub fn year_range(closes: &[f64], winsorize: bool) -> Option<YearRange> {
    let start = closes.len().saturating_sub(TRADING_DAYS_PER_YEAR);
    let window = &closes[start..];
    if window.is_empty() {
        return None;
    }

    let clipped;
    let window = if winsorize {
        clipped = winsorized(window, WINSOR_LOW_QUANTILE, WINSOR_HIGH_QUANTILE);
        clipped.as_slice()
    } else {
        window
    };

    let high = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().copied().fold(f64::INFINITY, f64::min);
    Some(YearRange {
        high: finite(high)?,
        low: finite(low)?,
    })
}

/// Distance of `last` from `reference` in percent of `reference`.
pub fn pct_from(last: f64, reference: f64) -> Option<f64> {
    pct_change(reference, last)
}

pub fn is_near_52w_high(pct_from_high: Option<f64>) -> Option<bool> {
    pct_from_high.map(|pct| pct >= NEAR_HIGH_THRESHOLD_PCT)
}

/// Latest volume against its trailing 20-session average.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VolumeProfile {
    pub current: Option<u64>,
    pub average_20d: Option<f64>,
    pub ratio: Option<f64>,
}

impl VolumeProfile {
    pub fn is_unusual(&self) -> Option<bool> {
        self.ratio.map(|ratio| ratio > UNUSUAL_VOLUME_RATIO)
    }
}

/// Builds the profile from reported volumes, oldest first. Sessions without
/// a reported volume are expected to be filtered out already.
pub fn volume_profile(volumes: &[u64]) -> VolumeProfile {
    if volumes.len() < VOLUME_WINDOW {
        return VolumeProfile::default();
    }
    let window: Vec<f64> = volumes[volumes.len() - VOLUME_WINDOW..]
        .iter()
        .map(|v| *v as f64)
        .collect();
    let current = volumes.last().copied();
    let average = mean(&window);
    let ratio = match (current, average) {
        (Some(current), Some(average)) if average > 0.0 => finite(current as f64 / average),
        _ => None,
    };

    VolumeProfile {
        current,
        average_20d: average,
        ratio,
    }
}

/// Options that change how indicators are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorOptions {
    pub winsorize_52w: bool,
}

/// Every price/volume indicator for one series, each independently absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceIndicators {
    pub current_price: Option<f64>,
    pub day_move_pct: Option<f64>,
    pub volatility_20d: Option<f64>,
    pub move_zscore: Option<f64>,
    pub rsi_14: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub pct_from_52w_high: Option<f64>,
    pub pct_from_52w_low: Option<f64>,
    pub near_52w_high: Option<bool>,
    pub volume: VolumeProfile,
    pub unusual_volume: Option<bool>,
    pub volatility_regime: Option<VolatilityRegime>,
}

impl PriceIndicators {
    pub fn compute(series: &PriceSeries, options: IndicatorOptions) -> Self {
        let closes = series.closes();
        let current_price = closes.last().copied();

        let day_move_pct = day_move_pct(&closes);
        let volatility_20d = volatility_20d(&closes);
        let range = year_range(&closes, options.winsorize_52w);
        let pct_from_52w_high = current_price
            .zip(range)
            .and_then(|(last, range)| pct_from(last, range.high));
        let pct_from_52w_low = current_price
            .zip(range)
            .and_then(|(last, range)| pct_from(last, range.low));
        let volume = volume_profile(&series.volumes());

        Self {
            current_price,
            day_move_pct,
            volatility_20d,
            move_zscore: move_zscore(day_move_pct, volatility_20d),
            rsi_14: rsi_14(&closes),
            ma_50: simple_moving_average(&closes, SHORT_MA_WINDOW),
            ma_200: simple_moving_average(&closes, LONG_MA_WINDOW),
            high_52w: range.map(|range| range.high),
            low_52w: range.map(|range| range.low),
            pct_from_52w_high,
            pct_from_52w_low,
            near_52w_high: is_near_52w_high(pct_from_52w_high),
            unusual_volume: volume.is_unusual(),
            volume,
            volatility_regime: volatility_20d.and_then(VolatilityRegime::classify),
        }
    }
}

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    finite((to - from) / from * 100.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    finite(variance.sqrt())
}

/// Linear-interpolated quantile of an unsorted slice.
fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn winsorized(values: &[f64], low_q: f64, high_q: f64) -> Vec<f64> {
    let (Some(low), Some(high)) = (quantile(values, low_q), quantile(values, high_q)) else {
        return values.to_vec();
    };
    if low <= 0.0 || high <= 0.0 || low >= high {
        return values.to_vec();
    }
    values.iter().map(|v| v.clamp(low, high)).collect()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn day_move_needs_two_points() {
        assert_eq!(day_move_pct(&[]), None);
        assert_eq!(day_move_pct(&[100.0]), None);
        assert_close(day_move_pct(&[100.0, 110.0]), 10.0);
        assert_close(day_move_pct(&[50.0, 100.0, 90.0]), -10.0);
    }

    #[test]
    fn volatility_needs_twenty_one_points() {
        assert_eq!(volatility_20d(&ramp(20)), None);
        assert!(volatility_20d(&ramp(21)).is_some());
    }

    #[test]
    fn constant_returns_have_zero_volatility_and_no_zscore() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();

        let volatility = volatility_20d(&closes).expect("enough history");

        assert!(volatility.abs() < 1e-9);
        assert_eq!(move_zscore(day_move_pct(&closes), Some(0.0)), None);
    }

    #[test]
    fn zscore_divides_move_by_volatility() {
        assert_close(move_zscore(Some(3.0), Some(1.5)), 2.0);
        assert_eq!(move_zscore(None, Some(1.5)), None);
        assert_eq!(move_zscore(Some(3.0), None), None);
    }

    #[test]
    fn rsi_is_hundred_for_rising_series() {
        assert_eq!(rsi_14(&ramp(14)), None);
        assert_eq!(rsi_14(&ramp(20)), Some(100.0));
    }

    #[test]
    fn rsi_is_zero_for_falling_series() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        assert_close(rsi_14(&closes), 0.0);
    }

    #[test]
    fn rsi_uses_wilder_smoothing() {
        // Seven up days then seven down days seed gain == loss; one more up day tilts it.
        let mut closes = vec![100.0];
        for _ in 0..7 {
            closes.push(closes[closes.len() - 1] + 1.0);
        }
        for _ in 0..7 {
            closes.push(closes[closes.len() - 1] - 1.0);
        }
        closes.push(closes[closes.len() - 1] + 2.0);

        // seed: gain 0.5, loss 0.5; then gain (0.5*13+2)/14, loss (0.5*13)/14
        let gain = (0.5 * 13.0 + 2.0) / 14.0;
        let loss = (0.5 * 13.0) / 14.0;
        let expected = 100.0 - 100.0 / (1.0 + gain / loss);

        assert_close(rsi_14(&closes), expected);
    }

    #[test]
    fn moving_averages_need_full_window() {
        assert_eq!(simple_moving_average(&ramp(49), SHORT_MA_WINDOW), None);
        assert_close(simple_moving_average(&ramp(50), SHORT_MA_WINDOW), 124.5);
        assert_eq!(simple_moving_average(&ramp(199), LONG_MA_WINDOW), None);
    }

    #[test]
    fn year_range_uses_trailing_window() {
        let mut closes = vec![1_000.0];
        closes.extend(ramp(252));

        let range = year_range(&closes, false).expect("non-empty");

        assert_eq!(range.high, 351.0);
        assert_eq!(range.low, 100.0);
        assert_eq!(year_range(&[], false), None);
    }

    #[test]
    fn winsorizing_clips_a_single_spike() {
        let mut closes = ramp(200);
        closes[100] = 10_000.0;

        let raw = year_range(&closes, false).expect("range");
        let clipped = year_range(&closes, true).expect("range");

        assert_eq!(raw.high, 10_000.0);
        assert!(clipped.high < 300.0, "spike should be clipped, got {}", clipped.high);
        assert!(clipped.low > 100.0);
    }

    #[test]
    fn distance_from_high_and_near_flag() {
        let pct = pct_from(95.0, 100.0);
        assert_close(pct, -5.0);
        assert_eq!(is_near_52w_high(pct), Some(true));
        assert_eq!(is_near_52w_high(Some(-5.01)), Some(false));
        assert_eq!(is_near_52w_high(None), None);
    }

    #[test]
    fn volume_profile_flags_spikes() {
        let mut volumes = vec![1_000_u64; 19];
        volumes.push(5_000);

        let profile = volume_profile(&volumes);

        assert_eq!(profile.current, Some(5_000));
        assert_close(profile.average_20d, 1_200.0);
        assert_close(profile.ratio, 5_000.0 / 1_200.0);
        assert_eq!(profile.is_unusual(), Some(true));
    }

    #[test]
    fn volume_profile_is_absent_when_short_or_zero() {
        assert_eq!(volume_profile(&[10; 19]), VolumeProfile::default());

        let profile = volume_profile(&[0; 20]);
        assert_eq!(profile.ratio, None);
        assert_eq!(profile.is_unusual(), None);
    }

    #[test]
    fn regime_boundaries_are_inclusive_for_normal() {
        assert_eq!(VolatilityRegime::classify(0.99), Some(VolatilityRegime::Low));
        assert_eq!(VolatilityRegime::classify(1.0), Some(VolatilityRegime::Normal));
        assert_eq!(VolatilityRegime::classify(3.0), Some(VolatilityRegime::Normal));
        assert_eq!(VolatilityRegime::classify(3.01), Some(VolatilityRegime::High));
        assert_eq!(VolatilityRegime::classify(f64::NAN), None);
    }
}
