//! Benchmarks a ticker's daily move against the market, its sector ETF,
//! an industry ETF and a peer group.
//!
//! Each benchmark resolves on its own. A failed ETF fetch turns into a
//! [`BenchmarkOutcome::FetchFailed`] for that benchmark only, and a label
//! with no benchmark mapping turns into [`BenchmarkOutcome::Unmapped`].

use std::collections::BTreeSet;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data_source::SourceErrorKind;
use crate::feed::MarketFeed;
use crate::indicators::day_move_pct;
use crate::reference::{self, IndustryBenchmark, PeerBasis, PeerGroup};
use crate::Symbol;

pub const DEFAULT_SPX_PROXY: &str = "SPY";
pub const MIN_PEERS: usize = 3;
pub const MAX_PEERS: usize = 10;

/// How one benchmark value was (or was not) obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BenchmarkOutcome {
    Computed { value: f64 },
    /// No benchmark is mapped for the ticker's label, or the label is unknown.
    Unmapped,
    FetchFailed { kind: SourceErrorKind },
    /// The benchmark series has fewer than two closes.
    InsufficientHistory,
    BelowMinimumPeers { resolved: usize, required: usize },
}

impl BenchmarkOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Computed { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Computed { value } => format!("computed ({value:.4})"),
            Self::Unmapped => String::from("no benchmark mapped"),
            Self::FetchFailed { kind } => format!("benchmark fetch failed ({kind})"),
            Self::InsufficientHistory => String::from("not enough price history"),
            Self::BelowMinimumPeers { resolved, required } => {
                format!("{resolved} of {required} required peers resolved")
            }
        }
    }
}

/// `stock - comparator`, absent when either side is absent.
pub fn relative_strength(stock_move: Option<f64>, comparator_move: Option<f64>) -> Option<f64> {
    let value = stock_move? - comparator_move?;
    value.is_finite().then_some(value)
}

/// Average of the resolved peer moves, gated on a minimum peer count.
pub fn peer_average(moves: &[Option<f64>], min_peers: usize) -> BenchmarkOutcome {
    let resolved: Vec<f64> = moves.iter().flatten().copied().collect();
    let required = min_peers.max(1);
    if resolved.len() < required {
        return BenchmarkOutcome::BelowMinimumPeers {
            resolved: resolved.len(),
            required,
        };
    }
    let average = resolved.iter().sum::<f64>() / resolved.len() as f64;
    if average.is_finite() {
        BenchmarkOutcome::Computed { value: average }
    } else {
        BenchmarkOutcome::InsufficientHistory
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparatorSettings {
    pub spx_proxy: Symbol,
    pub min_peers: usize,
    pub max_peers: usize,
}

impl Default for ComparatorSettings {
    fn default() -> Self {
        Self {
            spx_proxy: Symbol::from_normalized(DEFAULT_SPX_PROXY),
            min_peers: MIN_PEERS,
            max_peers: MAX_PEERS,
        }
    }
}

/// Sector benchmark result.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorReport {
    pub etf: Option<&'static str>,
    pub outcome: BenchmarkOutcome,
}

/// Industry benchmark result.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryReport {
    pub benchmark: Option<IndustryBenchmark>,
    pub outcome: BenchmarkOutcome,
}

/// Peer group result.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerReport {
    pub label: Option<&'static str>,
    pub size: Option<usize>,
    pub outcome: BenchmarkOutcome,
}

impl PeerReport {
    fn unmapped() -> Self {
        Self {
            label: None,
            size: None,
            outcome: BenchmarkOutcome::Unmapped,
        }
    }
}

/// Why a profile label is missing, used to tell "unknown" from "fetch failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLabel {
    Unknown,
    FetchFailed(SourceErrorKind),
}

impl MissingLabel {
    fn outcome(self) -> BenchmarkOutcome {
        match self {
            Self::Unknown => BenchmarkOutcome::Unmapped,
            Self::FetchFailed(kind) => BenchmarkOutcome::FetchFailed { kind },
        }
    }
}

pub struct Comparator<'a> {
    feed: &'a MarketFeed,
    settings: &'a ComparatorSettings,
}

impl<'a> Comparator<'a> {
    pub fn new(feed: &'a MarketFeed, settings: &'a ComparatorSettings) -> Self {
        Self { feed, settings }
    }

    /// Day move of any benchmark symbol, read through the series cache.
    pub async fn benchmark_move(&self, symbol: &Symbol) -> BenchmarkOutcome {
        match self.feed.series(symbol).await {
            Ok(fetched) => match day_move_pct(&fetched.value.closes()) {
                Some(value) => BenchmarkOutcome::Computed { value },
                None => BenchmarkOutcome::InsufficientHistory,
            },
            Err(error) => {
                debug!(benchmark = %symbol, code = error.code(), "benchmark unavailable");
                BenchmarkOutcome::FetchFailed { kind: error.kind() }
            }
        }
    }

    pub async fn market(&self) -> BenchmarkOutcome {
        self.benchmark_move(&self.settings.spx_proxy).await
    }

    pub async fn sector(&self, sector: Result<&str, MissingLabel>) -> SectorReport {
        let sector = match sector {
            Ok(sector) => sector,
            Err(missing) => {
                return SectorReport {
                    etf: None,
                    outcome: missing.outcome(),
                }
            }
        };
        let Some(etf) = reference::sector_etf(sector) else {
            return SectorReport {
                etf: None,
                outcome: BenchmarkOutcome::Unmapped,
            };
        };
        let outcome = match Symbol::parse(etf) {
            Ok(symbol) => self.benchmark_move(&symbol).await,
            Err(_) => BenchmarkOutcome::Unmapped,
        };
        SectorReport {
            etf: Some(etf),
            outcome,
        }
    }

    pub async fn industry(&self, industry: Result<&str, MissingLabel>) -> IndustryReport {
        let industry = match industry {
            Ok(industry) => industry,
            Err(missing) => {
                return IndustryReport {
                    benchmark: None,
                    outcome: missing.outcome(),
                }
            }
        };
        let Some(benchmark) = reference::industry_benchmark(industry) else {
            return IndustryReport {
                benchmark: None,
                outcome: BenchmarkOutcome::Unmapped,
            };
        };
        let outcome = match Symbol::parse(benchmark.etf) {
            Ok(symbol) => self.benchmark_move(&symbol).await,
            Err(_) => BenchmarkOutcome::Unmapped,
        };
        IndustryReport {
            benchmark: Some(benchmark),
            outcome,
        }
    }

    /// Peer group named by the caller. Unparseable hints and the subject
    /// itself are skipped.
    pub async fn provided_peers(&self, subject: &Symbol, hints: &[String]) -> PeerReport {
        let mut seen = BTreeSet::new();
        let symbols: Vec<Symbol> = hints
            .iter()
            .filter_map(|hint| Symbol::parse(hint).ok())
            .filter(|symbol| symbol != subject)
            .filter(|symbol| seen.insert(symbol.clone()))
            .take(self.settings.max_peers)
            .collect();
        if symbols.is_empty() {
            return PeerReport::unmapped();
        }
        self.peer_group(PeerGroup {
            basis: PeerBasis::Provided,
            symbols,
        })
        .await
    }

    /// Peer group drawn from the reference universe by industry, then sector.
    pub async fn reference_peers(
        &self,
        subject: &Symbol,
        sector: Option<&str>,
        industry: Option<&str>,
    ) -> PeerReport {
        match reference::reference_peers(
            subject,
            sector,
            industry,
            self.settings.min_peers,
            self.settings.max_peers,
        ) {
            Some(group) => self.peer_group(group).await,
            None => PeerReport::unmapped(),
        }
    }

    async fn peer_group(&self, group: PeerGroup) -> PeerReport {
        let moves = join_all(
            group
                .symbols
                .iter()
                .map(|symbol| async move { self.benchmark_move(symbol).await.value() }),
        )
        .await;

        PeerReport {
            label: Some(group.basis.label()),
            size: Some(group.symbols.len()),
            outcome: peer_average(&moves, self.settings.min_peers),
        }
    }
}
