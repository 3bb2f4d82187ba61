//! `padconv-core`: shared value types.
//!
//! Schema descriptors, file headers, decoded records and the typed tables
//! handed to writers. No IO.

pub mod error;
pub mod record;
pub mod schema;

pub use error::SchemaError;
pub use record::{format_cents, Entity, Header, Record, RecordSet, Table, TableColumn, Value, ValueKind};
pub use schema::{ColumnKind, ColumnSpec, CustomDecode, DerivedColumn, Schema};
