use padconv_config::ConfigError;
use padconv_io::{CacheError, DecodeError, WriteError};
use padconv_recon::ReconError;

use crate::exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_SCHEMA, EXIT_USAGE, EXIT_WRITE};

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Schema(_) => Self::new(EXIT_SCHEMA, e.to_string()),
            ConfigError::Io { .. } => Self::new(EXIT_CONFIG, e.to_string())
                .with_hint("pass --config or set PADCONV_CONFIG"),
            _ => Self::new(EXIT_CONFIG, e.to_string()),
        }
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Schema(_) => Self::new(EXIT_SCHEMA, e.to_string()),
            _ => Self::general(e.to_string()),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(e: ReconError) -> Self {
        match e {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => Self::new(EXIT_CONFIG, e.to_string()),
            ReconError::MissingColumn { .. } => Self::new(EXIT_SCHEMA, e.to_string())
                .with_hint("check the [recon] column names against the schema"),
            ReconError::WrongKind { .. } => Self::general(e.to_string()),
        }
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::Io(_) | CacheError::Serialize(_) => Self::new(EXIT_WRITE, e.to_string()),
            _ => Self::general(e.to_string()),
        }
    }
}

impl From<WriteError> for CliError {
    fn from(e: WriteError) -> Self {
        Self::new(EXIT_WRITE, e.to_string())
    }
}
