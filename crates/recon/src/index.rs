//! Pre-grouping of commitment entries and movements by commitment key.
//!
//! Each record set is scanned exactly once, so the engine runs in
//! O(obligations + movements) instead of rescanning movements per obligation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use padconv_core::{Record, RecordSet, TableColumn, Value};

use crate::config::{ReconConfig, SourceConfig};
use crate::error::ReconError;
use crate::model::{CommitmentKey, DataQualityWarning, Movement, Obligation};

/// Column positions the engine reads from one record set.
#[derive(Debug, Clone, Copy)]
struct Columns {
    fiscal_year: usize,
    entity_code: usize,
    sequence: usize,
    amount: usize,
    date: usize,
}

impl Columns {
    fn resolve(set: &RecordSet, source: &SourceConfig, config: &ReconConfig) -> Result<Self, ReconError> {
        if set.kind != source.kind {
            return Err(ReconError::WrongKind {
                expected: source.kind.clone(),
                found: set.kind.clone(),
            });
        }
        let find = |column: &str| {
            set.column_index(column).ok_or_else(|| ReconError::MissingColumn {
                kind: set.kind.clone(),
                column: column.to_string(),
            })
        };
        Ok(Self {
            fiscal_year: find(&config.key.fiscal_year)?,
            entity_code: find(&config.key.entity_code)?,
            sequence: find(&config.key.sequence)?,
            amount: find(&config.amount)?,
            date: find(&source.date)?,
        })
    }

    fn key(&self, record: &Record) -> Option<CommitmentKey> {
        let int = |i: usize| record.values.get(i).and_then(Value::as_int);
        Some(CommitmentKey::new(
            int(self.fiscal_year)?,
            int(self.entity_code)?,
            int(self.sequence)?,
        ))
    }

    fn date(&self, record: &Record) -> Option<NaiveDate> {
        record.values.get(self.date).and_then(Value::as_date)
    }

    fn cents(&self, record: &Record) -> i64 {
        record.values.get(self.amount).and_then(Value::as_cents).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Commitments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CommitmentIndex {
    pub obligations: BTreeMap<CommitmentKey, Obligation>,
    pub attribute_columns: Vec<TableColumn>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Group commitment entries (including negative cancellation entries) by key.
///
/// Entity and attributes come from the first entry in source order. Entries
/// without a date are left out and reported once per obligation.
pub fn index_commitments(set: &RecordSet, config: &ReconConfig) -> Result<CommitmentIndex, ReconError> {
    let cols = Columns::resolve(set, &config.commitments, config)?;

    // Key, date and entity are emitted separately
    let reserved = [
        config.key.fiscal_year.as_str(),
        config.key.entity_code.as_str(),
        config.key.sequence.as_str(),
        config.commitments.date.as_str(),
        padconv_core::schema::ENTITY_COLUMN,
    ];
    let attr_positions: Vec<usize> = config
        .attributes
        .iter()
        .filter(|name| !reserved.contains(&name.as_str()))
        .filter_map(|name| set.column_index(name))
        .collect();
    let attribute_columns: Vec<TableColumn> = attr_positions.iter().map(|&i| set.columns[i].clone()).collect();

    let mut obligations: BTreeMap<CommitmentKey, Obligation> = BTreeMap::new();
    let mut undated: BTreeMap<CommitmentKey, usize> = BTreeMap::new();
    let mut unkeyed = 0;

    for record in set.rows() {
        let Some(key) = cols.key(record) else {
            unkeyed += 1;
            continue;
        };

        let obligation = obligations.entry(key).or_insert_with(|| Obligation {
            key,
            entity: record.entity,
            commitment_date: None,
            attributes: attr_positions
                .iter()
                .map(|&i| record.values.get(i).cloned().unwrap_or(Value::Null))
                .collect(),
            entries: Vec::new(),
        });

        match cols.date(record) {
            Some(date) => {
                obligation.commitment_date = Some(match obligation.commitment_date {
                    Some(existing) => existing.min(date),
                    None => date,
                });
                obligation.entries.push(Movement {
                    date,
                    cents: cols.cents(record),
                });
            }
            None => *undated.entry(key).or_insert(0) += 1,
        }
    }

    let mut warnings = Vec::new();
    if unkeyed > 0 {
        warnings.push(DataQualityWarning::MissingKey {
            kind: set.kind.clone(),
            rows: unkeyed,
        });
    }
    warnings.extend(
        undated
            .into_iter()
            .map(|(key, entries)| DataQualityWarning::MissingCommitmentDate { key, entries }),
    );

    Ok(CommitmentIndex {
        obligations,
        attribute_columns,
        warnings,
    })
}

// ---------------------------------------------------------------------------
// Liquidations / payments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MovementIndex {
    pub kind: String,
    pub by_key: BTreeMap<CommitmentKey, Vec<Movement>>,
    pub warnings: Vec<DataQualityWarning>,
}

impl MovementIndex {
    pub fn get(&self, key: &CommitmentKey) -> &[Movement] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn index_movements(
    set: &RecordSet,
    source: &SourceConfig,
    config: &ReconConfig,
) -> Result<MovementIndex, ReconError> {
    let cols = Columns::resolve(set, source, config)?;

    let mut by_key: BTreeMap<CommitmentKey, Vec<Movement>> = BTreeMap::new();
    let mut undated: BTreeMap<CommitmentKey, usize> = BTreeMap::new();
    let mut unkeyed = 0;

    for record in set.rows() {
        let Some(key) = cols.key(record) else {
            unkeyed += 1;
            continue;
        };
        match cols.date(record) {
            Some(date) => by_key.entry(key).or_default().push(Movement {
                date,
                cents: cols.cents(record),
            }),
            None => *undated.entry(key).or_insert(0) += 1,
        }
    }

    let mut warnings = Vec::new();
    if unkeyed > 0 {
        warnings.push(DataQualityWarning::MissingKey {
            kind: set.kind.clone(),
            rows: unkeyed,
        });
    }
    warnings.extend(undated.into_iter().map(|(key, rows)| DataQualityWarning::MissingMovementDate {
        kind: set.kind.clone(),
        key,
        rows,
    }));

    Ok(MovementIndex {
        kind: set.kind.clone(),
        by_key,
        warnings,
    })
}
