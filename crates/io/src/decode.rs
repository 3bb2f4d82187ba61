//! Record decoder: raw fixed-width lines to typed rows.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use padconv_core::{ColumnKind, ColumnSpec, Entity, Header, Record, RecordSet, Schema, Value};

use crate::error::{DecodeError, HeaderError};
use crate::header::{parse_ddmmyyyy, parse_header};
use crate::text::{read_source, SourceEncoding};

/// One source file that could not be decoded.
#[derive(Debug)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub error: DecodeError,
}

/// Rows decoded from every readable source plus the files that were rejected.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub records: RecordSet,
    pub files_read: usize,
    pub failures: Vec<SourceFailure>,
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Two implied decimal digits: `"0000000123456"` → 123456 cents. Blank → 0.
///
/// The magnitude is digits only; signs live in their own column.
pub fn decode_fixed_point(raw: &str) -> Option<i64> {
    let digits = raw.trim();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

/// Sign character followed by a fixed-point magnitude. Only `-` negates.
pub fn decode_signed(sign: char, magnitude: &str) -> Option<i64> {
    decode_fixed_point(magnitude).map(|m| if sign == '-' { -m } else { m })
}

/// Slice characters `range` out of a line, padding short lines with nothing.
fn slice(chars: &[char], range: std::ops::Range<usize>) -> String {
    let end = range.end.min(chars.len());
    let start = range.start.min(end);
    chars[start..end].iter().collect()
}

/// Decode one field. `Err` carries the raw text of a strict field that failed.
fn decode_field(col: &ColumnSpec, chars: &[char]) -> Result<Value, String> {
    let raw = slice(chars, col.range());
    let lenient_or_err = |raw: String| if col.strict { Err(raw) } else { Ok(Value::Null) };

    match col.kind {
        ColumnKind::Text => Ok(Value::Text(match col.decode {
            Some(decode) => decode.apply(&raw),
            None => raw.trim().to_string(),
        })),
        ColumnKind::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return lenient_or_err(raw);
            }
            match trimmed.parse::<i64>() {
                Ok(n) => Ok(Value::Integer(n)),
                Err(_) => lenient_or_err(raw),
            }
        }
        ColumnKind::Decimal => match decode_fixed_point(&raw) {
            Some(cents) => Ok(Value::Cents(cents)),
            None => lenient_or_err(raw),
        },
        ColumnKind::SignedDecimal => {
            let sign = col
                .sign_at
                .and_then(|pos| pos.checked_sub(1))
                .and_then(|i| chars.get(i).copied())
                .unwrap_or(' ');
            match decode_signed(sign, &raw) {
                Some(cents) => Ok(Value::Cents(cents)),
                None => lenient_or_err(format!("{sign}{raw}")),
            }
        }
        ColumnKind::Date => match parse_ddmmyyyy(raw.trim()) {
            Some(date) => Ok(Value::Date(date)),
            None => lenient_or_err(raw),
        },
    }
}

/// Decode a single data line into schema columns followed by derived columns.
///
/// `schema` must already be validated.
pub(crate) fn decode_line(schema: &Schema, line: &str) -> Result<Vec<Value>, (String, ColumnKind, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut values = Vec::with_capacity(schema.columns.len() + schema.derived.len());

    for col in &schema.columns {
        let value = decode_field(col, &chars).map_err(|raw| (col.name.clone(), col.kind, raw))?;
        values.push(value);
    }

    for derived in &schema.derived {
        let cents_of = |name: &str, values: &[Value]| -> i64 {
            schema
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .chain(schema.derived.iter().map(|d| d.name.as_str()))
                .position(|n| n == name)
                .and_then(|i| values.get(i))
                .and_then(Value::as_cents)
                .unwrap_or(0)
        };
        let plus: i64 = derived.plus.iter().map(|n| cents_of(n, &values)).sum();
        let minus: i64 = derived.minus.iter().map(|n| cents_of(n, &values)).sum();
        values.push(Value::Cents(plus - minus));
    }

    Ok(values)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Decode the full text of one source file: header, data lines, footer.
///
/// Rows come back tagged `Entity::Unknown`; classification is a later pass.
pub fn decode_text(schema: &Schema, text: &str, source: &str) -> Result<RecordSet, DecodeError> {
    schema.validate()?;
    decode_validated(schema, text, source)
}

fn decode_validated(schema: &Schema, text: &str, source: &str) -> Result<RecordSet, DecodeError> {
    let lines: Vec<&str> = text.trim_start_matches('\u{FEFF}').lines().collect();

    let header_line = lines.first().ok_or_else(|| DecodeError::Header {
        source: source.to_string(),
        error: HeaderError::Missing,
    })?;
    let header: Arc<Header> = Arc::new(parse_header(header_line).map_err(|error| DecodeError::Header {
        source: source.to_string(),
        error,
    })?);

    // First line is the header, last line the footer.
    let body: &[&str] = if lines.len() > 2 { &lines[1..lines.len() - 1] } else { &[] };

    let mut set = RecordSet::new(&schema.kind, schema.value_columns());
    for (offset, line) in body.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values = decode_line(schema, line).map_err(|(column, kind, value)| DecodeError::Field {
            source: source.to_string(),
            line: offset + 2,
            column,
            kind,
            value,
        })?;
        set.push(Record {
            header: Arc::clone(&header),
            values,
            entity: Entity::Unknown,
        });
    }

    Ok(set)
}

pub fn decode_file(schema: &Schema, path: &Path, encoding: SourceEncoding) -> Result<RecordSet, DecodeError> {
    schema.validate()?;
    read_validated(schema, path, encoding)
}

fn read_validated(schema: &Schema, path: &Path, encoding: SourceEncoding) -> Result<RecordSet, DecodeError> {
    let source = path.display().to_string();
    let text = read_source(path, encoding).map_err(|e| DecodeError::Io {
        source: source.clone(),
        message: e.to_string(),
    })?;
    decode_validated(schema, &text, &source)
}

/// Decode `<kind>.txt` from every source directory, in order.
///
/// Missing files are skipped (branches may not have every kind). A file that
/// fails to decode is reported in `failures` and contributes no rows; the
/// other sources continue. An invalid schema fails before anything is read.
pub fn decode_sources(
    schema: &Schema,
    sources: &[PathBuf],
    encoding: SourceEncoding,
) -> Result<DecodeOutcome, DecodeError> {
    schema.validate()?;

    let mut records = RecordSet::new(&schema.kind, schema.value_columns());
    let mut files_read = 0;
    let mut failures = Vec::new();

    for dir in sources {
        let path = dir.join(schema.file_name());
        if !path.is_file() {
            log::debug!("{}: not present, skipping", path.display());
            continue;
        }
        log::debug!("reading {} from {}", schema.kind, path.display());
        match read_validated(schema, &path, encoding) {
            Ok(set) => {
                log::debug!("{}: {} rows", path.display(), set.len());
                files_read += 1;
                records.append(set);
            }
            Err(error) => {
                log::warn!("{error}; file skipped");
                failures.push(SourceFailure { path, error });
            }
        }
    }

    Ok(DecodeOutcome {
        records,
        files_read,
        failures,
    })
}
