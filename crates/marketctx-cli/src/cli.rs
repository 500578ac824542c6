//! CLI argument definitions for marketctx.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `context` | Indicators, fundamentals and benchmarks for one or more tickers |
//! | `series` | Normalized daily close series with its source tag |
//! | `fundamentals` | Normalized fundamentals snapshot |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-level` | `RUST_LOG`, else `warn` | Log filter for stderr |
//!
//! # Examples
//!
//! ```bash
//! marketctx context NVDA AMD --pretty
//! marketctx context PLTR --sector Technology --industry "Software - Infrastructure"
//! marketctx context XYZ --peer AAA --peer BBB --peer CCC
//! marketctx series AAPL --lookback-days 30
//! marketctx fundamentals MSFT
//! ```

use clap::{Args, Parser, Subcommand};

/// Market context for equity tickers: indicators, fundamentals and benchmarks.
#[derive(Debug, Parser)]
#[command(
    name = "marketctx",
    author,
    version,
    about = "Market context aggregation CLI",
    long_about = "marketctx fetches daily price history and fundamentals for equity tickers, \
computes technical indicators and compares each ticker against the S&P 500, its sector ETF, \
an industry ETF and a peer group.\n\
\n\
Yahoo Finance is the primary source. Set ALPHAVANTAGE_API_KEY to enable Alpha Vantage as a \
fallback when Yahoo is rate limited or unavailable."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log filter directive (e.g. `debug`, `marketctx_core=trace`).
    ///
    /// Overrides RUST_LOG. Logs are written to stderr.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the market context for one or more tickers.
    ///
    /// The first ticker that resolves becomes the primary. Sector, industry
    /// and peer hints apply to the first ticker given.
    ///
    /// # Examples
    ///
    ///   marketctx context NVDA
    ///   marketctx context NVDA AMD INTC --pretty
    Context(ContextArgs),

    /// Fetch the normalized daily series for one ticker.
    ///
    /// # Examples
    ///
    ///   marketctx series AAPL
    ///   marketctx series BRK.B --lookback-days 90
    Series(SeriesArgs),

    /// Fetch normalized fundamentals for one ticker.
    ///
    /// # Examples
    ///
    ///   marketctx fundamentals MSFT
    Fundamentals(FundamentalsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ContextArgs {
    /// Tickers to analyze, in priority order.
    #[arg(required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    /// Sector label for the first ticker (e.g. "Technology").
    #[arg(long)]
    pub sector: Option<String>,

    /// Industry label for the first ticker (e.g. "Semiconductors").
    #[arg(long)]
    pub industry: Option<String>,

    /// Peer ticker for the first ticker; repeat for several.
    #[arg(long = "peer")]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SeriesArgs {
    pub ticker: String,

    /// Calendar days of history to request.
    #[arg(long)]
    pub lookback_days: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct FundamentalsArgs {
    pub ticker: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_collects_repeated_peers() {
        let cli = Cli::try_parse_from([
            "marketctx",
            "context",
            "NVDA",
            "AMD",
            "--peer",
            "INTC",
            "--peer",
            "QCOM",
            "--pretty",
        ])
        .expect("valid arguments");

        assert!(cli.pretty);
        match cli.command {
            Command::Context(args) => {
                assert_eq!(args.tickers, vec!["NVDA", "AMD"]);
                assert_eq!(args.peers, vec!["INTC", "QCOM"]);
                assert_eq!(args.sector, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn context_requires_a_ticker() {
        assert!(Cli::try_parse_from(["marketctx", "context"]).is_err());
    }

    #[test]
    fn series_accepts_lookback() {
        let cli = Cli::try_parse_from(["marketctx", "series", "AAPL", "--lookback-days", "30"])
            .expect("valid arguments");

        match cli.command {
            Command::Series(args) => {
                assert_eq!(args.ticker, "AAPL");
                assert_eq!(args.lookback_days, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
