// File I/O: fixed-width decoding, entity tagging, ledger cache, table writers

pub mod cache;
pub mod classify;
pub mod csv;
pub mod decode;
pub mod error;
pub mod header;
pub mod json;
pub mod stage;
pub mod text;
pub mod writer;
pub mod xlsx;

pub use cache::LedgerCache;
pub use classify::{classify, EntityRules};
pub use decode::{decode_file, decode_sources, decode_text, DecodeOutcome, SourceFailure};
pub use error::{CacheError, DecodeError, HeaderError, WriteError};
pub use header::parse_header;
pub use stage::StagedDir;
pub use text::SourceEncoding;
pub use writer::{TableWriter, WriterKind};
