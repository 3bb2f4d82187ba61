use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, same kind twice, etc.).
    ConfigValidation(String),
    /// Record set handed to the engine is not the kind it expects.
    WrongKind { expected: String, found: String },
    /// Missing required column in input data.
    MissingColumn { kind: String, column: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::WrongKind { expected, found } => {
                write!(f, "expected a {expected} record set, got {found}")
            }
            Self::MissingColumn { kind, column } => {
                write!(f, "{kind}: missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for ReconError {}
