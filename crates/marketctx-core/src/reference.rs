//! Static benchmark and peer reference data.

use crate::Symbol;

/// Sector label (lowercase) to SPDR sector ETF.
const SECTOR_ETFS: &[(&str, &str)] = &[
    ("technology", "XLK"),
    ("information technology", "XLK"),
    ("health care", "XLV"),
    ("healthcare", "XLV"),
    ("financials", "XLF"),
    ("financial services", "XLF"),
    ("consumer cyclical", "XLY"),
    ("consumer discretionary", "XLY"),
    ("consumer defensive", "XLP"),
    ("consumer staples", "XLP"),
    ("industrials", "XLI"),
    ("energy", "XLE"),
    ("utilities", "XLU"),
    ("real estate", "XLRE"),
    ("basic materials", "XLB"),
    ("materials", "XLB"),
    ("communication services", "XLC"),
    ("communication", "XLC"),
];

/// Industry ETF with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndustryBenchmark {
    pub etf: &'static str,
    pub label: &'static str,
}

struct IndustryRule {
    keywords: &'static [&'static str],
    benchmark: IndustryBenchmark,
}

// Order matters: the first rule with a matching keyword wins.
const INDUSTRY_RULES: &[IndustryRule] = &[
    IndustryRule {
        keywords: &["semiconductor", "semi", "chip"],
        benchmark: IndustryBenchmark {
            etf: "SOXX",
            label: "Semiconductors (SOXX)",
        },
    },
    IndustryRule {
        keywords: &["consumer electronics", "iphone", "smartphone", "wearable"],
        benchmark: IndustryBenchmark {
            etf: "VGT",
            label: "Tech Hardware (VGT)",
        },
    },
    IndustryRule {
        keywords: &["software", "application", "saas", "cloud"],
        benchmark: IndustryBenchmark {
            etf: "IGV",
            label: "Software (IGV)",
        },
    },
    IndustryRule {
        keywords: &["internet retail", "e-commerce", "ecommerce", "online retail"],
        benchmark: IndustryBenchmark {
            etf: "IBUY",
            label: "Online Retail (IBUY)",
        },
    },
    IndustryRule {
        keywords: &["internet", "digital"],
        benchmark: IndustryBenchmark {
            etf: "FDN",
            label: "Internet (FDN)",
        },
    },
    IndustryRule {
        keywords: &["cyber", "security"],
        benchmark: IndustryBenchmark {
            etf: "HACK",
            label: "Cybersecurity (HACK)",
        },
    },
    IndustryRule {
        keywords: &["biotech"],
        benchmark: IndustryBenchmark {
            etf: "IBB",
            label: "Biotech (IBB)",
        },
    },
    IndustryRule {
        keywords: &["retail"],
        benchmark: IndustryBenchmark {
            etf: "XRT",
            label: "Retail (XRT)",
        },
    },
    IndustryRule {
        keywords: &["bank"],
        benchmark: IndustryBenchmark {
            etf: "KBE",
            label: "Banks (KBE)",
        },
    },
    IndustryRule {
        keywords: &["oil", "gas", "exploration", "drilling", "energy equipment"],
        benchmark: IndustryBenchmark {
            etf: "XOP",
            label: "Oil & Gas E&P (XOP)",
        },
    },
];

/// A large-cap reference constituent with its profile labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constituent {
    pub symbol: &'static str,
    pub sector: &'static str,
    pub industry: &'static str,
}

const fn c(symbol: &'static str, sector: &'static str, industry: &'static str) -> Constituent {
    Constituent {
        symbol,
        sector,
        industry,
    }
}

const TECH: &str = "Technology";
const COMM: &str = "Communication Services";
const CYCL: &str = "Consumer Cyclical";
const DEF: &str = "Consumer Defensive";
const FIN: &str = "Financial Services";
const HEALTH: &str = "Healthcare";
const ENERGY: &str = "Energy";
const IND: &str = "Industrials";
const UTIL: &str = "Utilities";
const RE: &str = "Real Estate";
const MAT: &str = "Basic Materials";

/// Reference universe, roughly in descending market-cap order within each
/// sector so that capped peer lists keep the largest names.
pub const CONSTITUENTS: &[Constituent] = &[
    c("AAPL", TECH, "Consumer Electronics"),
    c("MSFT", TECH, "Software - Infrastructure"),
    c("NVDA", TECH, "Semiconductors"),
    c("AVGO", TECH, "Semiconductors"),
    c("ORCL", TECH, "Software - Infrastructure"),
    c("CRM", TECH, "Software - Application"),
    c("AMD", TECH, "Semiconductors"),
    c("ADBE", TECH, "Software - Application"),
    c("CSCO", TECH, "Communication Equipment"),
    c("ACN", TECH, "Information Technology Services"),
    c("NOW", TECH, "Software - Application"),
    c("IBM", TECH, "Information Technology Services"),
    c("QCOM", TECH, "Semiconductors"),
    c("TXN", TECH, "Semiconductors"),
    c("INTU", TECH, "Software - Application"),
    c("AMAT", TECH, "Semiconductor Equipment & Materials"),
    c("PANW", TECH, "Software - Infrastructure"),
    c("MU", TECH, "Semiconductors"),
    c("LRCX", TECH, "Semiconductor Equipment & Materials"),
    c("KLAC", TECH, "Semiconductor Equipment & Materials"),
    c("INTC", TECH, "Semiconductors"),
    c("CRWD", TECH, "Software - Infrastructure"),
    c("FTNT", TECH, "Software - Infrastructure"),
    c("DELL", TECH, "Computer Hardware"),
    c("HPQ", TECH, "Computer Hardware"),
    c("GOOGL", COMM, "Internet Content & Information"),
    c("META", COMM, "Internet Content & Information"),
    c("NFLX", COMM, "Entertainment"),
    c("TMUS", COMM, "Telecom Services"),
    c("DIS", COMM, "Entertainment"),
    c("VZ", COMM, "Telecom Services"),
    c("CMCSA", COMM, "Telecom Services"),
    c("T", COMM, "Telecom Services"),
    c("PINS", COMM, "Internet Content & Information"),
    c("SNAP", COMM, "Internet Content & Information"),
    c("AMZN", CYCL, "Internet Retail"),
    c("TSLA", CYCL, "Auto Manufacturers"),
    c("HD", CYCL, "Home Improvement Retail"),
    c("MCD", CYCL, "Restaurants"),
    c("BKNG", CYCL, "Travel Services"),
    c("LOW", CYCL, "Home Improvement Retail"),
    c("TJX", CYCL, "Apparel Retail"),
    c("SBUX", CYCL, "Restaurants"),
    c("NKE", CYCL, "Footwear & Accessories"),
    c("CMG", CYCL, "Restaurants"),
    c("EBAY", CYCL, "Internet Retail"),
    c("GM", CYCL, "Auto Manufacturers"),
    c("F", CYCL, "Auto Manufacturers"),
    c("ETSY", CYCL, "Internet Retail"),
    c("WMT", DEF, "Discount Stores"),
    c("COST", DEF, "Discount Stores"),
    c("PG", DEF, "Household & Personal Products"),
    c("KO", DEF, "Beverages - Non-Alcoholic"),
    c("PEP", DEF, "Beverages - Non-Alcoholic"),
    c("PM", DEF, "Tobacco"),
    c("MO", DEF, "Tobacco"),
    c("CL", DEF, "Household & Personal Products"),
    c("TGT", DEF, "Discount Stores"),
    c("KMB", DEF, "Household & Personal Products"),
    c("DG", DEF, "Discount Stores"),
    c("BRK-B", FIN, "Insurance - Diversified"),
    c("JPM", FIN, "Banks - Diversified"),
    c("V", FIN, "Credit Services"),
    c("MA", FIN, "Credit Services"),
    c("BAC", FIN, "Banks - Diversified"),
    c("WFC", FIN, "Banks - Diversified"),
    c("GS", FIN, "Capital Markets"),
    c("MS", FIN, "Capital Markets"),
    c("AXP", FIN, "Credit Services"),
    c("C", FIN, "Banks - Diversified"),
    c("SCHW", FIN, "Capital Markets"),
    c("PYPL", FIN, "Credit Services"),
    c("PNC", FIN, "Banks - Regional"),
    c("USB", FIN, "Banks - Regional"),
    c("TFC", FIN, "Banks - Regional"),
    c("LLY", HEALTH, "Drug Manufacturers - General"),
    c("UNH", HEALTH, "Healthcare Plans"),
    c("JNJ", HEALTH, "Drug Manufacturers - General"),
    c("ABBV", HEALTH, "Drug Manufacturers - General"),
    c("MRK", HEALTH, "Drug Manufacturers - General"),
    c("TMO", HEALTH, "Diagnostics & Research"),
    c("ABT", HEALTH, "Medical Devices"),
    c("ISRG", HEALTH, "Medical Instruments & Supplies"),
    c("AMGN", HEALTH, "Drug Manufacturers - General"),
    c("DHR", HEALTH, "Diagnostics & Research"),
    c("PFE", HEALTH, "Drug Manufacturers - General"),
    c("VRTX", HEALTH, "Biotechnology"),
    c("REGN", HEALTH, "Biotechnology"),
    c("GILD", HEALTH, "Drug Manufacturers - General"),
    c("BMY", HEALTH, "Drug Manufacturers - General"),
    c("CVS", HEALTH, "Healthcare Plans"),
    c("ELV", HEALTH, "Healthcare Plans"),
    c("CI", HEALTH, "Healthcare Plans"),
    c("MRNA", HEALTH, "Biotechnology"),
    c("BIIB", HEALTH, "Biotechnology"),
    c("XOM", ENERGY, "Oil & Gas Integrated"),
    c("CVX", ENERGY, "Oil & Gas Integrated"),
    c("COP", ENERGY, "Oil & Gas E&P"),
    c("EOG", ENERGY, "Oil & Gas E&P"),
    c("SLB", ENERGY, "Oil & Gas Equipment & Services"),
    c("OXY", ENERGY, "Oil & Gas E&P"),
    c("PSX", ENERGY, "Oil & Gas Refining & Marketing"),
    c("MPC", ENERGY, "Oil & Gas Refining & Marketing"),
    c("DVN", ENERGY, "Oil & Gas E&P"),
    c("HAL", ENERGY, "Oil & Gas Equipment & Services"),
    c("GE", IND, "Aerospace & Defense"),
    c("CAT", IND, "Farm & Heavy Construction Machinery"),
    c("RTX", IND, "Aerospace & Defense"),
    c("HON", IND, "Conglomerates"),
    c("UNP", IND, "Railroads"),
    c("BA", IND, "Aerospace & Defense"),
    c("DE", IND, "Farm & Heavy Construction Machinery"),
    c("LMT", IND, "Aerospace & Defense"),
    c("UPS", IND, "Integrated Freight & Logistics"),
    c("GD", IND, "Aerospace & Defense"),
    c("NOC", IND, "Aerospace & Defense"),
    c("FDX", IND, "Integrated Freight & Logistics"),
    c("MMM", IND, "Conglomerates"),
    c("NEE", UTIL, "Utilities - Regulated Electric"),
    c("SO", UTIL, "Utilities - Regulated Electric"),
    c("DUK", UTIL, "Utilities - Regulated Electric"),
    c("AEP", UTIL, "Utilities - Regulated Electric"),
    c("D", UTIL, "Utilities - Regulated Electric"),
    c("SRE", UTIL, "Utilities - Diversified"),
    c("PLD", RE, "REIT - Industrial"),
    c("AMT", RE, "REIT - Specialty"),
    c("EQIX", RE, "REIT - Specialty"),
    c("WELL", RE, "REIT - Healthcare Facilities"),
    c("SPG", RE, "REIT - Retail"),
    c("CCI", RE, "REIT - Specialty"),
    c("O", RE, "REIT - Retail"),
    c("LIN", MAT, "Specialty Chemicals"),
    c("SHW", MAT, "Specialty Chemicals"),
    c("APD", MAT, "Specialty Chemicals"),
    c("ECL", MAT, "Specialty Chemicals"),
    c("FCX", MAT, "Copper"),
    c("NEM", MAT, "Gold"),
    c("NUE", MAT, "Steel"),
];

/// Sector ETF for a sector label, matched case-insensitively on the trimmed label.
pub fn sector_etf(sector: &str) -> Option<&'static str> {
    let key = sector.trim().to_ascii_lowercase();
    SECTOR_ETFS
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, etf)| *etf)
}

/// First industry rule whose keyword occurs in the lowercase label.
pub fn industry_benchmark(industry: &str) -> Option<IndustryBenchmark> {
    let haystack = industry.trim().to_lowercase();
    if haystack.is_empty() {
        return None;
    }
    INDUSTRY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| haystack.contains(kw)))
        .map(|rule| rule.benchmark)
}

pub fn constituent(symbol: &Symbol) -> Option<&'static Constituent> {
    CONSTITUENTS
        .iter()
        .find(|entry| entry.symbol == symbol.as_str())
}

/// How a reference peer group was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerBasis {
    Industry,
    Sector,
    /// Peers named by the caller.
    Provided,
}

impl PeerBasis {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Industry => "Industry peers",
            Self::Sector => "Sector peers",
            Self::Provided => "Provided peers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerGroup {
    pub basis: PeerBasis,
    pub symbols: Vec<Symbol>,
}

/// Picks peers from the reference universe.
///
/// Same-industry constituents are preferred. When fewer than `min_peers`
/// share the industry, the group widens to the whole sector. The subject is
/// never its own peer and at most `max_peers` are returned.
pub fn reference_peers(
    subject: &Symbol,
    sector: Option<&str>,
    industry: Option<&str>,
    min_peers: usize,
    max_peers: usize,
) -> Option<PeerGroup> {
    let matching = |field: fn(&Constituent) -> &'static str, wanted: &str| -> Vec<Symbol> {
        let wanted = wanted.trim().to_ascii_lowercase();
        CONSTITUENTS
            .iter()
            .filter(|entry| entry.symbol != subject.as_str())
            .filter(|entry| field(entry).to_ascii_lowercase() == wanted)
            .filter_map(|entry| Symbol::parse(entry.symbol).ok())
            .take(max_peers)
            .collect()
    };

    if let Some(industry) = industry.filter(|label| !label.trim().is_empty()) {
        let peers = matching(|entry| entry.industry, industry);
        if !peers.is_empty() && peers.len() >= min_peers {
            return Some(PeerGroup {
                basis: PeerBasis::Industry,
                symbols: peers,
            });
        }
    }

    let sector = sector.filter(|label| !label.trim().is_empty())?;
    let peers = matching(|entry| entry.sector, canonical_sector(sector));
    (!peers.is_empty()).then_some(PeerGroup {
        basis: PeerBasis::Sector,
        symbols: peers,
    })
}

/// Maps sector synonyms onto the labels used in the reference universe.
fn canonical_sector(sector: &str) -> &str {
    match sector_etf(sector) {
        Some("XLK") => TECH,
        Some("XLC") => COMM,
        Some("XLY") => CYCL,
        Some("XLP") => DEF,
        Some("XLF") => FIN,
        Some("XLV") => HEALTH,
        Some("XLE") => ENERGY,
        Some("XLI") => IND,
        Some("XLU") => UTIL,
        Some("XLRE") => RE,
        Some("XLB") => MAT,
        _ => sector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn sector_lookup_is_case_insensitive_and_trimmed() {
        assert_eq!(sector_etf("Technology"), Some("XLK"));
        assert_eq!(sector_etf("  information technology "), Some("XLK"));
        assert_eq!(sector_etf("Financial Services"), Some("XLF"));
        assert_eq!(sector_etf("Communication"), Some("XLC"));
        assert_eq!(sector_etf("Crypto"), None);
    }

    #[test]
    fn industry_rules_apply_in_order() {
        let etf = |label| industry_benchmark(label).map(|b| b.etf);

        assert_eq!(etf("Semiconductors"), Some("SOXX"));
        assert_eq!(etf("Consumer Electronics"), Some("VGT"));
        assert_eq!(etf("Software—Infrastructure"), Some("IGV"));
        assert_eq!(etf("Internet Retail"), Some("IBUY"));
        assert_eq!(etf("Internet Content & Information"), Some("FDN"));
        assert_eq!(etf("Biotechnology"), Some("IBB"));
        assert_eq!(etf("Home Improvement Retail"), Some("XRT"));
        assert_eq!(etf("Banks - Regional"), Some("KBE"));
        assert_eq!(etf("Oil & Gas E&P"), Some("XOP"));
        assert_eq!(etf("Tobacco"), None);
        assert_eq!(
            industry_benchmark("Semiconductors").map(|b| b.label),
            Some("Semiconductors (SOXX)")
        );
    }

    #[test]
    fn specific_keywords_win_over_broad_retail_and_hardware() {
        let etf = |label| industry_benchmark(label).map(|b| b.etf);

        assert_eq!(etf("Online Retail"), Some("IBUY"));
        assert_eq!(etf("Ecommerce Platforms"), Some("IBUY"));
        assert_eq!(etf("Smartphones"), Some("VGT"));
        assert_eq!(etf("Wearable Devices"), Some("VGT"));
        assert_eq!(etf("Energy Equipment & Services"), Some("XOP"));
        assert_eq!(etf("Specialty Retail"), Some("XRT"));
    }

    #[test]
    fn reference_table_symbols_are_valid() {
        for entry in CONSTITUENTS {
            let parsed = Symbol::parse(entry.symbol).expect("reference symbols parse");
            assert_eq!(parsed.as_str(), entry.symbol);
        }
    }

    #[test]
    fn industry_peers_exclude_subject_and_respect_cap() {
        let group = reference_peers(
            &symbol("NVDA"),
            Some("Technology"),
            Some("Semiconductors"),
            3,
            4,
        )
        .expect("semiconductor peers");

        assert_eq!(group.basis, PeerBasis::Industry);
        assert_eq!(group.symbols.len(), 4);
        assert!(!group.symbols.contains(&symbol("NVDA")));
        assert_eq!(group.symbols[0], symbol("AVGO"));
    }

    #[test]
    fn thin_industry_widens_to_sector() {
        let group = reference_peers(
            &symbol("AAPL"),
            Some("Information Technology"),
            Some("Consumer Electronics"),
            3,
            10,
        )
        .expect("sector peers");

        assert_eq!(group.basis, PeerBasis::Sector);
        assert_eq!(group.basis.label(), "Sector peers");
        assert_eq!(group.symbols.len(), 10);
        assert!(!group.symbols.contains(&symbol("AAPL")));
    }

    #[test]
    fn no_labels_means_no_group() {
        assert_eq!(reference_peers(&symbol("AAPL"), None, None, 3, 10), None);
        assert_eq!(
            reference_peers(&symbol("AAPL"), Some("Crypto"), None, 3, 10),
            None
        );
    }
}
