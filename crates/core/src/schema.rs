//! Schema descriptors for fixed-width record kinds.
//!
//! A [`Schema`] is pure configuration: it is loaded from TOML by the registry
//! and consumed by the decoder, never embedded in it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::record::{stamp_columns, TableColumn, ValueKind};

/// Columns stamped onto every decoded row. Schema columns may not reuse them.
pub const HEADER_COLUMNS: [&str; 5] = [
    "tax_id",
    "period_start",
    "period_end",
    "generated_on",
    "entity_name",
];

/// Column holding the entity classifier tag.
pub const ENTITY_COLUMN: &str = "entity";

// ---------------------------------------------------------------------------
// Column spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Text,
    /// Two implied decimal digits, no sign.
    Decimal,
    /// Two implied decimal digits plus a one-character sign at `sign_at`.
    SignedDecimal,
    /// `DDMMYYYY`.
    Date,
}

impl ColumnKind {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Integer => ValueKind::Integer,
            Self::Text => ValueKind::Text,
            Self::Decimal | Self::SignedDecimal => ValueKind::Decimal,
            Self::Date => ValueKind::Date,
        }
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, Self::Decimal | Self::SignedDecimal)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::Decimal => write!(f, "decimal"),
            Self::SignedDecimal => write!(f, "signed_decimal"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Built-in text decoders applied to a text column after slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomDecode {
    /// Keep surrounding whitespace out (text columns are trimmed anyway; this
    /// only matters together with other decoders).
    Trim,
    /// Account and revenue codes are zero-padded on the left.
    StripLeadingZeros,
}

impl CustomDecode {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Self::Trim => raw.trim().to_string(),
            Self::StripLeadingZeros => raw.trim().trim_start_matches('0').to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// 1-based, inclusive.
    pub start: usize,
    /// 1-based, inclusive.
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Strict columns abort the file on a parse failure; lenient ones yield null.
    #[serde(default)]
    pub strict: bool,
    /// Position of the sign character (signed decimals only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_at: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<CustomDecode>,
}

impl ColumnSpec {
    pub fn new(name: &str, start: usize, end: usize, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
            kind,
            strict: false,
            sign_at: None,
            decode: None,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn signed_at(mut self, position: usize) -> Self {
        self.sign_at = Some(position);
        self
    }

    pub fn with_decode(mut self, decode: CustomDecode) -> Self {
        self.decode = Some(decode);
        self
    }

    /// Zero-based half-open character range, ready for slicing.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.saturating_sub(1)..self.end
    }

    pub fn width(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }
}

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// A decimal column computed after decoding: `Σ plus − Σ minus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub name: String,
    #[serde(default)]
    pub plus: Vec<String>,
    #[serde(default)]
    pub minus: Vec<String>,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Canonical kind name; the source file is `<kind>.txt`.
    pub kind: String,
    /// Source file stem when it differs from `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line_length: usize,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub derived: Vec<DerivedColumn>,
}

impl Schema {
    pub fn new(kind: &str, line_length: usize, columns: Vec<ColumnSpec>) -> Self {
        Self {
            kind: kind.to_string(),
            file: None,
            line_length,
            columns,
            derived: Vec::new(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.file.as_deref().unwrap_or(&self.kind))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check offsets, names and derived references. Must pass before decoding.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.kind.trim().is_empty() {
            return Err(SchemaError::EmptyKind);
        }
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns { kind: self.kind.clone() });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for col in &self.columns {
            if col.start == 0 || col.start > col.end {
                return Err(SchemaError::InvalidRange {
                    kind: self.kind.clone(),
                    column: col.name.clone(),
                    start: col.start,
                    end: col.end,
                });
            }
            if col.end > self.line_length {
                return Err(SchemaError::OutOfBounds {
                    kind: self.kind.clone(),
                    column: col.name.clone(),
                    position: col.end,
                    line_length: self.line_length,
                });
            }
            match (col.kind, col.sign_at) {
                (ColumnKind::SignedDecimal, None) => {
                    return Err(SchemaError::MissingSign {
                        kind: self.kind.clone(),
                        column: col.name.clone(),
                    });
                }
                (ColumnKind::SignedDecimal, Some(pos)) if pos == 0 || pos > self.line_length => {
                    return Err(SchemaError::OutOfBounds {
                        kind: self.kind.clone(),
                        column: col.name.clone(),
                        position: pos,
                        line_length: self.line_length,
                    });
                }
                _ => {}
            }
            self.check_name(&col.name, &mut seen)?;
        }

        for derived in &self.derived {
            for term in derived.plus.iter().chain(&derived.minus) {
                let ok = self.column(term).map(|c| c.kind.is_decimal()).unwrap_or(false)
                    || self.derived.iter().take_while(|d| d.name != derived.name).any(|d| &d.name == term);
                if !ok {
                    return Err(SchemaError::BadDerivedTerm {
                        kind: self.kind.clone(),
                        column: derived.name.clone(),
                        term: term.clone(),
                    });
                }
            }
            self.check_name(&derived.name, &mut seen)?;
        }

        Ok(())
    }

    fn check_name<'a>(&self, name: &'a str, seen: &mut HashSet<&'a str>) -> Result<(), SchemaError> {
        if HEADER_COLUMNS.contains(&name) || name == ENTITY_COLUMN {
            return Err(SchemaError::ReservedName {
                kind: self.kind.clone(),
                column: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateColumn {
                kind: self.kind.clone(),
                column: name.to_string(),
            });
        }
        Ok(())
    }

    /// Columns carried by each decoded record: schema columns, then derived.
    pub fn value_columns(&self) -> Vec<TableColumn> {
        let mut out: Vec<TableColumn> = self
            .columns
            .iter()
            .map(|c| TableColumn::new(&c.name, c.kind.value_kind()))
            .collect();
        out.extend(self.derived.iter().map(|d| TableColumn::new(&d.name, ValueKind::Decimal)));
        out
    }

    /// Columns of the published table: value columns, header stamps, entity tag.
    pub fn output_columns(&self) -> Vec<TableColumn> {
        let mut out = self.value_columns();
        out.extend(stamp_columns());
        out
    }
}
