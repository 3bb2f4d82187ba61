use std::fmt;

use padconv_core::{ColumnKind, SchemaError};

/// Malformed header line. The whole file is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// File has no first line.
    Missing,
    /// Header shorter than tax id + three dates.
    TooShort { len: usize },
    /// A header date is not a valid `DDMMYYYY` calendar date.
    BadDate { field: &'static str, value: String },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing header line"),
            Self::TooShort { len } => {
                write!(f, "header line has {len} characters, expected at least 38")
            }
            Self::BadDate { field, value } => {
                write!(f, "header field '{field}': cannot parse date '{value}'")
            }
        }
    }
}

impl std::error::Error for HeaderError {}

/// Failure decoding one source file. Other sources keep going.
#[derive(Debug)]
pub enum DecodeError {
    Schema(SchemaError),
    Header { source: String, error: HeaderError },
    /// Strict field could not be parsed.
    Field {
        source: String,
        line: usize,
        column: String,
        kind: ColumnKind,
        value: String,
    },
    Io { source: String, message: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "{e}"),
            Self::Header { source, error } => write!(f, "{source}: {error}"),
            Self::Field { source, line, column, kind, value } => write!(
                f,
                "{source}, line {line}, column '{column}': cannot parse {kind} '{value}'"
            ),
            Self::Io { source, message } => write!(f, "{source}: IO error: {message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<SchemaError> for DecodeError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

/// Ledger cache failure.
#[derive(Debug)]
pub enum CacheError {
    /// Stage outputs are write-once.
    AlreadyWritten(String),
    /// A later stage asked for a kind nobody produced.
    Missing(String),
    Io(String),
    Serialize(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyWritten(key) => write!(f, "cache key '{key}' already written"),
            Self::Missing(key) => write!(f, "cache key '{key}' not found"),
            Self::Io(msg) => write!(f, "cache IO error: {msg}"),
            Self::Serialize(msg) => write!(f, "cache serialization error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Writer failure.
#[derive(Debug)]
pub enum WriteError {
    Io { path: String, message: String },
    Csv(String),
    Json(String),
    Xlsx(String),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::Xlsx(msg) => write!(f, "XLSX error: {msg}"),
        }
    }
}

impl std::error::Error for WriteError {}
