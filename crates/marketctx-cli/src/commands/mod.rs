mod context;
mod fundamentals;
mod series;

use marketctx_core::{MarketConfig, ProviderId, SourceError, Symbol};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Envelope, EnvelopeError};

pub struct CommandResult {
    pub data: Value,
    pub primary: Option<Symbol>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
    /// Set when the command ran but produced no market data.
    pub no_data: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            primary: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain: Vec::new(),
            no_data: false,
        }
    }

    pub fn with_primary(mut self, primary: Option<Symbol>) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_provider_errors(mut self, errors: Vec<(ProviderId, SourceError)>) -> Self {
        self.errors.extend(errors.into_iter().map(|(provider, error)| EnvelopeError {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: error.retryable(),
            source: Some(provider.to_string()),
        }));
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_source_chain(mut self, source_chain: Vec<ProviderId>) -> Self {
        self.source_chain = source_chain;
        self
    }

    pub fn with_no_data(mut self, no_data: bool) -> Self {
        self.no_data = no_data;
        self
    }
}

/// Runs the selected command and wraps its result in an envelope.
///
/// The returned flag is true when the command produced no market data.
pub async fn run(cli: &Cli) -> Result<(Envelope, bool), CliError> {
    let config = MarketConfig::from_env()?;
    if config.alphavantage_api_key.is_none() {
        tracing::debug!("no Alpha Vantage key configured; fallback disabled");
    }
    let engine = config.build_engine();

    let command_result = match &cli.command {
        Command::Context(args) => context::run(args, &engine).await?,
        Command::Series(args) => series::run(args, &engine).await?,
        Command::Fundamentals(args) => fundamentals::run(args, &engine).await?,
    };

    let CommandResult {
        data,
        primary,
        warnings,
        errors,
        latency_ms,
        source_chain,
        no_data,
    } = command_result;

    let mut metadata = Metadata::new(latency_ms, primary).with_source_chain(source_chain);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let no_data = no_data || !errors.is_empty();
    Ok((
        Envelope {
            meta: metadata,
            data,
            errors,
        },
        no_data,
    ))
}
