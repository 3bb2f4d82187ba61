use std::fmt;

use padconv_core::SchemaError;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Io { path: String, message: String },
    /// TOML parse / deserialization error.
    Parse { source: String, message: String },
    /// Settings parsed but are not usable.
    Invalid(String),
    /// A schema file parsed but failed validation.
    Schema(SchemaError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { source, message } => write!(f, "{source}: parse error: {message}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
            Self::Schema(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SchemaError> for ConfigError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
