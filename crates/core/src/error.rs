use std::fmt;

/// Invalid schema descriptor. Raised before any file is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Schema has no kind name.
    EmptyKind,
    /// Schema declares no columns.
    NoColumns { kind: String },
    /// `start` is zero or greater than `end`.
    InvalidRange { kind: String, column: String, start: usize, end: usize },
    /// A column (or its sign) reaches past the declared line length.
    OutOfBounds { kind: String, column: String, position: usize, line_length: usize },
    /// Signed decimal without a sign position.
    MissingSign { kind: String, column: String },
    /// Two columns share a name.
    DuplicateColumn { kind: String, column: String },
    /// Column name collides with a stamped header or entity column.
    ReservedName { kind: String, column: String },
    /// Derived column references a missing or non-decimal column.
    BadDerivedTerm { kind: String, column: String, term: String },
    /// TOML parse / deserialization error.
    Parse { source: String, message: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKind => write!(f, "schema without kind name"),
            Self::NoColumns { kind } => write!(f, "schema '{kind}': no columns"),
            Self::InvalidRange { kind, column, start, end } => {
                write!(f, "schema '{kind}', column '{column}': invalid range {start}..={end}")
            }
            Self::OutOfBounds { kind, column, position, line_length } => write!(
                f,
                "schema '{kind}', column '{column}': position {position} outside line length {line_length}"
            ),
            Self::MissingSign { kind, column } => {
                write!(f, "schema '{kind}', column '{column}': signed_decimal requires sign_at")
            }
            Self::DuplicateColumn { kind, column } => {
                write!(f, "schema '{kind}': duplicate column '{column}'")
            }
            Self::ReservedName { kind, column } => {
                write!(f, "schema '{kind}': column name '{column}' is reserved")
            }
            Self::BadDerivedTerm { kind, column, term } => write!(
                f,
                "schema '{kind}', derived column '{column}': '{term}' is not a decimal column"
            ),
            Self::Parse { source, message } => write!(f, "cannot parse schema {source}: {message}"),
        }
    }
}

impl std::error::Error for SchemaError {}
