//! Per-ticker analytics record and its builder.

use serde::Serialize;
use time::Date;

use crate::comparator::{
    relative_strength, BenchmarkOutcome, IndustryReport, PeerReport, SectorReport,
};
use crate::indicators::{PriceIndicators, VolatilityRegime};
use crate::{PriceSeries, ProviderId, Symbol, TickerFundamentals};

/// Number of trailing closes kept for display.
pub const DISPLAY_SERIES_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosePoint {
    pub date: Date,
    pub close: f64,
}

/// Reason a comparator field is null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiagnostic {
    pub field: &'static str,
    #[serde(flatten)]
    pub outcome: BenchmarkOutcome,
}

/// Everything known about one ticker's market context.
///
/// Every metric is optional and serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalytics {
    pub ticker: Symbol,
    pub data_source: ProviderId,
    pub last_close_date: Option<Date>,
    pub price_series_days: usize,
    pub current_price: Option<f64>,
    pub price_series: Vec<ClosePoint>,

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
    pub average_volume_20d: Option<f64>,
    pub current_volume: Option<u64>,
    pub volume_ratio: Option<f64>,
    pub unusual_volume: Option<bool>,
    pub volatility_regime: Option<VolatilityRegime>,

    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,

    pub spx_move_today: Option<f64>,
    pub sector_etf: Option<String>,
    pub sector_move_today: Option<f64>,
    pub industry_benchmark: Option<String>,
    pub industry_move_today: Option<f64>,
    pub peer_group_label: Option<String>,
    pub peer_group_size: Option<usize>,
    pub peer_avg_move_today: Option<f64>,
    pub relative_strength_vs_sector: Option<f64>,
    pub relative_strength_vs_industry: Option<f64>,
    pub relative_strength_vs_peers: Option<f64>,

    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Accumulates analytics one section at a time.
///
/// Each setter is independent; a missing section leaves its fields null and
/// never prevents the others from being filled.
#[derive(Debug, Clone)]
pub struct AnalyticsBuilder {
    analytics: MarketAnalytics,
    market: BenchmarkOutcome,
    sector: BenchmarkOutcome,
    industry: BenchmarkOutcome,
    peers: BenchmarkOutcome,
}

impl AnalyticsBuilder {
    pub fn new(series: &PriceSeries) -> Self {
        let analytics = MarketAnalytics {
            ticker: series.symbol.clone(),
            data_source: series.source,
            last_close_date: series.last().map(|point| point.date),
            price_series_days: series.len(),
            current_price: series.last().map(|point| point.close),
            price_series: series
                .tail(DISPLAY_SERIES_LEN)
                .iter()
                .map(|point| ClosePoint {
                    date: point.date,
                    close: point.close,
                })
                .collect(),
            day_move_pct: None,
            volatility_20d: None,
            move_zscore: None,
            rsi_14: None,
            ma_50: None,
            ma_200: None,
            high_52w: None,
            low_52w: None,
            pct_from_52w_high: None,
            pct_from_52w_low: None,
            near_52w_high: None,
            average_volume_20d: None,
            current_volume: None,
            volume_ratio: None,
            unusual_volume: None,
            volatility_regime: None,
            market_cap: None,
            sector: None,
            industry: None,
            beta: None,
            pe_ratio: None,
            spx_move_today: None,
            sector_etf: None,
            sector_move_today: None,
            industry_benchmark: None,
            industry_move_today: None,
            peer_group_label: None,
            peer_group_size: None,
            peer_avg_move_today: None,
            relative_strength_vs_sector: None,
            relative_strength_vs_industry: None,
            relative_strength_vs_peers: None,
            diagnostics: Vec::new(),
        };

        Self {
            analytics,
            market: BenchmarkOutcome::Unmapped,
            sector: BenchmarkOutcome::Unmapped,
            industry: BenchmarkOutcome::Unmapped,
            peers: BenchmarkOutcome::Unmapped,
        }
    }

    pub fn indicators(mut self, indicators: &PriceIndicators) -> Self {
        let a = &mut self.analytics;
        if indicators.current_price.is_some() {
            a.current_price = indicators.current_price;
        }
        a.day_move_pct = indicators.day_move_pct;
        a.volatility_20d = indicators.volatility_20d;
        a.move_zscore = indicators.move_zscore;
        a.rsi_14 = indicators.rsi_14;
        a.ma_50 = indicators.ma_50;
        a.ma_200 = indicators.ma_200;
        a.high_52w = indicators.high_52w;
        a.low_52w = indicators.low_52w;
        a.pct_from_52w_high = indicators.pct_from_52w_high;
        a.pct_from_52w_low = indicators.pct_from_52w_low;
        a.near_52w_high = indicators.near_52w_high;
        a.average_volume_20d = indicators.volume.average_20d;
        a.current_volume = indicators.volume.current;
        a.volume_ratio = indicators.volume.ratio;
        a.unusual_volume = indicators.unusual_volume;
        a.volatility_regime = indicators.volatility_regime;
        self
    }

    pub fn fundamentals(mut self, fundamentals: Option<&TickerFundamentals>) -> Self {
        if let Some(fundamentals) = fundamentals {
            let a = &mut self.analytics;
            a.market_cap = fundamentals.market_cap;
            a.beta = fundamentals.beta;
            a.pe_ratio = fundamentals.pe_ratio;
            a.sector = a.sector.take().or_else(|| fundamentals.sector.clone());
            a.industry = a.industry.take().or_else(|| fundamentals.industry.clone());
        }
        self
    }

    /// Resolved sector/industry labels; these win over the fundamentals' own.
    pub fn labels(mut self, sector: Option<&str>, industry: Option<&str>) -> Self {
        if let Some(sector) = sector {
            self.analytics.sector = Some(sector.to_owned());
        }
        if let Some(industry) = industry {
            self.analytics.industry = Some(industry.to_owned());
        }
        self
    }

    pub fn market(mut self, outcome: BenchmarkOutcome) -> Self {
        self.analytics.spx_move_today = outcome.value();
        self.market = outcome;
        self
    }

    pub fn sector(mut self, report: SectorReport) -> Self {
        self.analytics.sector_etf = report.etf.map(str::to_owned);
        self.analytics.sector_move_today = report.outcome.value();
        self.sector = report.outcome;
        self
    }

    pub fn industry(mut self, report: IndustryReport) -> Self {
        self.analytics.industry_benchmark = report.benchmark.map(|b| b.label.to_owned());
        self.analytics.industry_move_today = report.outcome.value();
        self.industry = report.outcome;
        self
    }

    pub fn peers(mut self, report: PeerReport) -> Self {
        self.analytics.peer_group_label = report.label.map(str::to_owned);
        self.analytics.peer_group_size = report.size;
        self.analytics.peer_avg_move_today = report.outcome.value();
        self.peers = report.outcome;
        self
    }

    /// Derives the relative-strength fields and a diagnostic for every
    /// comparator field left null.
    pub fn build(self) -> MarketAnalytics {
        let Self {
            mut analytics,
            market,
            sector,
            industry,
            peers,
        } = self;

        let stock = analytics.day_move_pct;
        analytics.relative_strength_vs_sector = relative_strength(stock, sector.value());
        analytics.relative_strength_vs_industry = relative_strength(stock, industry.value());
        analytics.relative_strength_vs_peers = relative_strength(stock, peers.value());

        let own_move = if stock.is_some() {
            None
        } else {
            Some(BenchmarkOutcome::InsufficientHistory)
        };
        let derived = |comparator: BenchmarkOutcome| -> BenchmarkOutcome {
            own_move.unwrap_or(comparator)
        };

        let fields = [
            ("spx_move_today", market),
            ("sector_move_today", sector),
            ("industry_move_today", industry),
            ("peer_avg_move_today", peers),
            ("relative_strength_vs_sector", derived(sector)),
            ("relative_strength_vs_industry", derived(industry)),
            ("relative_strength_vs_peers", derived(peers)),
        ];
        analytics.diagnostics = fields
            .into_iter()
            .filter(|(_, outcome)| !outcome.is_computed())
            .map(|(field, outcome)| FieldDiagnostic { field, outcome })
            .collect();

        analytics
    }
}
