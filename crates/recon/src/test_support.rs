//! Record set builders shared by the unit tests.

use std::sync::Arc;

use chrono::NaiveDate;
use padconv_core::{Entity, Header, Record, RecordSet, TableColumn, Value, ValueKind};

#[derive(Debug, Clone, Copy)]
pub struct Row {
    pub year: i64,
    pub entity_code: i64,
    pub seq: i64,
    pub date: Option<&'static str>,
    pub cents: i64,
    pub org: i64,
    pub entity: Entity,
}

impl Row {
    pub fn commitment(year: i64, entity_code: i64, seq: i64, date: Option<&'static str>, cents: i64) -> Self {
        row(year, entity_code, seq, date, cents)
    }

    pub fn org(mut self, org: i64) -> Self {
        self.org = org;
        self.entity = if org == 12 { Entity::PensionFund } else { Entity::Executive };
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entity = entity;
        self
    }
}

pub fn row(year: i64, entity_code: i64, seq: i64, date: Option<&'static str>, cents: i64) -> Row {
    Row {
        year,
        entity_code,
        seq,
        date,
        cents,
        org: 1,
        entity: Entity::Executive,
    }
}

fn header() -> Arc<Header> {
    let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    Arc::new(Header {
        tax_id: "87612826000190".into(),
        period_start: d,
        period_end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        generated_on: d,
        entity_name: "PREFEITURA".into(),
    })
}

fn date(raw: Option<&str>) -> Value {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%d%m%Y").ok())
        .map(Value::Date)
        .unwrap_or(Value::Null)
}

pub fn commitments(rows: &[Row]) -> RecordSet {
    let mut set = RecordSet::new(
        "EMPENHO",
        vec![
            TableColumn::new("org_code", ValueKind::Integer),
            TableColumn::new("commitment_number", ValueKind::Text),
            TableColumn::new("commitment_year", ValueKind::Integer),
            TableColumn::new("commitment_entity_code", ValueKind::Integer),
            TableColumn::new("commitment_seq", ValueKind::Integer),
            TableColumn::new("commitment_date", ValueKind::Date),
            TableColumn::new("amount", ValueKind::Decimal),
        ],
    );
    let header = header();
    for r in rows {
        set.push(Record {
            header: Arc::clone(&header),
            values: vec![
                Value::Integer(r.org),
                Value::Text(format!("{:05}{:02}{:06}", r.year, r.entity_code, r.seq)),
                Value::Integer(r.year),
                Value::Integer(r.entity_code),
                Value::Integer(r.seq),
                date(r.date),
                Value::Cents(r.cents),
            ],
            entity: r.entity,
        });
    }
    set
}

fn movements(kind: &str, date_column: &str, rows: &[Row]) -> RecordSet {
    let mut set = RecordSet::new(
        kind,
        vec![
            TableColumn::new("commitment_year", ValueKind::Integer),
            TableColumn::new("commitment_entity_code", ValueKind::Integer),
            TableColumn::new("commitment_seq", ValueKind::Integer),
            TableColumn::new(date_column, ValueKind::Date),
            TableColumn::new("amount", ValueKind::Decimal),
        ],
    );
    let header = header();
    for r in rows {
        set.push(Record {
            header: Arc::clone(&header),
            values: vec![
                Value::Integer(r.year),
                Value::Integer(r.entity_code),
                Value::Integer(r.seq),
                date(r.date),
                Value::Cents(r.cents),
            ],
            entity: r.entity,
        });
    }
    set
}

pub fn liquidations(rows: &[Row]) -> RecordSet {
    movements("LIQUIDAC", "liquidation_date", rows)
}

pub fn payments(rows: &[Row]) -> RecordSet {
    movements("PAGAMENT", "payment_date", rows)
}
