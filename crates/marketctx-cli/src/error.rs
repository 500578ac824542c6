use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] marketctx_core::ValidationError),

    #[error(transparent)]
    Config(#[from] marketctx_core::ConfigError),

    #[error("invalid log filter '{directive}': {reason}")]
    LogFilter { directive: String, reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::LogFilter { .. } => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let validation = CliError::from(marketctx_core::ValidationError::EmptySymbol);
        assert_eq!(validation.exit_code(), 2);

        let io = CliError::from(std::io::Error::other("closed pipe"));
        assert_eq!(io.exit_code(), 10);

        let serialization = serde_json::from_str::<u8>("x").expect_err("invalid json");
        assert_eq!(CliError::from(serialization).exit_code(), 4);
    }
}
