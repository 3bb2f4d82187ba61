use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Text,
    Decimal,
    Date,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::Decimal => write!(f, "decimal"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// A decoded cell. Decimals are carried as integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Cents(i64),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_cents(&self) -> Option<i64> {
        match self {
            Value::Cents(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Cents(c) => write!(f, "{}", format_cents(*c)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Render cents with two decimals and a dot separator: `-1234.05`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Header + entity
// ---------------------------------------------------------------------------

/// Leading line of every source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub tax_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_on: NaiveDate,
    pub entity_name: String,
}

/// Organizational body a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Legislative,
    PensionFund,
    Executive,
    Unknown,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legislative => "legislative",
            Self::PensionFund => "pension_fund",
            Self::Executive => "executive",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One decoded data line. Values follow the owning set's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: Arc<Header>,
    pub values: Vec<Value>,
    pub entity: Entity,
}

/// Decoded rows of one record kind across every source, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub kind: String,
    pub columns: Vec<TableColumn>,
    rows: Vec<Record>,
}

impl RecordSet {
    pub fn new(kind: &str, columns: Vec<TableColumn>) -> Self {
        Self {
            kind: kind.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        debug_assert_eq!(record.values.len(), self.columns.len());
        self.rows.push(record);
    }

    /// Append another set of the same kind, keeping its row order after ours.
    pub fn append(&mut self, other: RecordSet) {
        debug_assert_eq!(self.columns, other.columns);
        self.rows.extend(other.rows);
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Record] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look a value up by column name. `None` when the column does not exist.
    pub fn value<'a>(&self, record: &'a Record, name: &str) -> Option<&'a Value> {
        self.column_index(name).and_then(|i| record.values.get(i))
    }

    /// Flatten into a table, stamping header fields and the entity tag.
    pub fn to_table(&self) -> Table {
        let mut columns = self.columns.clone();
        columns.extend(stamp_columns());

        let mut table = Table::new(&self.kind, columns);
        for record in &self.rows {
            let mut row = record.values.clone();
            row.push(Value::Text(record.header.tax_id.clone()));
            row.push(Value::Date(record.header.period_start));
            row.push(Value::Date(record.header.period_end));
            row.push(Value::Date(record.header.generated_on));
            row.push(Value::Text(record.header.entity_name.clone()));
            row.push(Value::Text(record.entity.as_str().to_string()));
            table.rows.push(row);
        }
        table
    }
}

/// Header stamps followed by the entity tag, appended to every record table.
pub fn stamp_columns() -> Vec<TableColumn> {
    vec![
        TableColumn::new("tax_id", ValueKind::Text),
        TableColumn::new("period_start", ValueKind::Date),
        TableColumn::new("period_end", ValueKind::Date),
        TableColumn::new("generated_on", ValueKind::Date),
        TableColumn::new("entity_name", ValueKind::Text),
        TableColumn::new(crate::schema::ENTITY_COLUMN, ValueKind::Text),
    ]
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub kind: ValueKind,
}

impl TableColumn {
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Named typed table handed to writers and the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<TableColumn>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Arc<Header> {
        Arc::new(Header {
            tax_id: "87612826000190".into(),
            period_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            generated_on: NaiveDate::from_ymd_opt(2023, 7, 5).unwrap(),
            entity_name: "PREFEITURA MUNICIPAL".into(),
        })
    }

    #[test]
    fn cents_formatting() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(100000), "1000.00");
        assert_eq!(format_cents(-50), "-0.50");
        assert_eq!(format_cents(-123456), "-1234.56");
    }

    #[test]
    fn to_table_stamps_header_and_entity() {
        let mut set = RecordSet::new(
            "ORGAO",
            vec![
                TableColumn::new("org_code", ValueKind::Integer),
                TableColumn::new("name", ValueKind::Text),
            ],
        );
        set.push(Record {
            header: header(),
            values: vec![Value::Integer(12), Value::Text("FUNDO".into())],
            entity: Entity::PensionFund,
        });

        let table = set.to_table();
        assert_eq!(table.name, "ORGAO");
        assert_eq!(table.columns.len(), 8);
        assert_eq!(table.rows[0][2], Value::Text("87612826000190".into()));
        assert_eq!(table.rows[0][7], Value::Text("pension_fund".into()));
        assert_eq!(table.column_index("generated_on"), Some(5));
    }

    #[test]
    fn value_lookup_by_name() {
        let mut set = RecordSet::new("X", vec![TableColumn::new("org_code", ValueKind::Integer)]);
        set.push(Record {
            header: header(),
            values: vec![Value::Integer(3)],
            entity: Entity::Unknown,
        });
        let rec = &set.rows()[0];
        assert_eq!(set.value(rec, "org_code"), Some(&Value::Integer(3)));
        assert_eq!(set.value(rec, "missing"), None);
    }
}
