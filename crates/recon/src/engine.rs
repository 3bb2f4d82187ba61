use chrono::NaiveDate;
use padconv_core::{Entity, RecordSet, Table, TableColumn, Value, ValueKind};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::index::{index_commitments, index_movements, MovementIndex};
use crate::model::{Balances, CommitmentKey, DataQualityWarning, MovementRow, MovementTotals, ReconResult, RestosRow};
use crate::movement::annual_totals;
use crate::restos::{carry_forward, cutoff};

pub const RESTOS_TABLE: &str = "RESTOS_PAGAR";
pub const MOVEMENT_TABLE: &str = "MOVIMENTO_ANUAL";

/// Classified commitment, liquidation and payment sets for one run.
pub struct ReconInput<'a> {
    pub commitments: &'a RecordSet,
    pub liquidations: &'a RecordSet,
    pub payments: &'a RecordSet,
}

/// Build the carry-forward ledger and the annual movement report for `year`.
///
/// Obligations from fiscal years before `year` enter the ledger; obligations of
/// `year` itself enter the movement report. Rows come out in key order, so the
/// same input always yields the same output.
pub fn run(config: &ReconConfig, input: &ReconInput, year: i32) -> Result<ReconResult, ReconError> {
    let cutoff = cutoff(year).ok_or_else(|| ReconError::ConfigValidation(format!("invalid year {year}")))?;

    let commitments = index_commitments(input.commitments, config)?;
    let liquidations = index_movements(input.liquidations, &config.liquidations, config)?;
    let payments = index_movements(input.payments, &config.payments, config)?;

    let mut warnings: Vec<DataQualityWarning> = Vec::new();
    warnings.extend(commitments.warnings.iter().cloned());
    warnings.extend(liquidations.warnings.iter().cloned());
    warnings.extend(payments.warnings.iter().cloned());
    for index in [&liquidations, &payments] {
        warnings.extend(orphans(index, |key| commitments.obligations.contains_key(key)));
    }

    let mut restos = Vec::new();
    let mut movements = Vec::new();
    let year_key = i64::from(year);

    for (key, obligation) in &commitments.obligations {
        // Only undated entries: already reported, nothing to attribute
        if obligation.entries.is_empty() {
            continue;
        }
        let liq = liquidations.get(key);
        let pay = payments.get(key);

        if key.fiscal_year < year_key {
            let balances = carry_forward(key.fiscal_year, year, &obligation.entries, liq, pay);
            restos.push(RestosRow {
                key: *key,
                entity: obligation.entity,
                commitment_date: obligation.commitment_date,
                attributes: obligation.attributes.clone(),
                balances,
            });
        } else if key.fiscal_year == year_key {
            movements.push(MovementRow {
                key: *key,
                entity: obligation.entity,
                commitment_date: obligation.commitment_date,
                attributes: obligation.attributes.clone(),
                totals: annual_totals(&obligation.entries, liq, pay),
            });
        } else {
            continue;
        }

        if obligation.entity == Entity::Unknown {
            warnings.push(DataQualityWarning::UnknownEntity { key: *key });
        }
    }

    for w in &warnings {
        log::warn!("{w}");
    }

    let summary = compute_summary(year, &restos, &movements, &warnings);
    log::info!(
        "reconciled {}: {} carried obligation(s), {} in year, {} warning(s)",
        year,
        summary.obligations_carried,
        summary.obligations_in_year,
        summary.warnings
    );

    Ok(ReconResult {
        year,
        cutoff,
        attribute_columns: commitments.attribute_columns,
        restos,
        movements,
        warnings,
        summary,
    })
}

/// One warning per movement key with no commitment behind it.
fn orphans<'a>(
    index: &'a MovementIndex,
    known: impl Fn(&CommitmentKey) -> bool + 'a,
) -> impl Iterator<Item = DataQualityWarning> + 'a {
    index
        .by_key
        .iter()
        .filter(move |(key, _)| !known(*key))
        .map(move |(key, rows)| DataQualityWarning::OrphanMovement {
            kind: index.kind.clone(),
            key: *key,
            rows: rows.len(),
        })
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn leading_columns(attributes: &[TableColumn]) -> Vec<TableColumn> {
    let mut columns = vec![
        TableColumn::new("commitment_year", ValueKind::Integer),
        TableColumn::new("commitment_entity_code", ValueKind::Integer),
        TableColumn::new("commitment_seq", ValueKind::Integer),
        TableColumn::new("entity", ValueKind::Text),
        TableColumn::new("commitment_date", ValueKind::Date),
    ];
    columns.extend(attributes.iter().cloned());
    columns
}

fn leading_values(
    key: &CommitmentKey,
    entity: Entity,
    date: Option<NaiveDate>,
    attributes: &[Value],
) -> Vec<Value> {
    let mut row = vec![
        Value::Integer(key.fiscal_year),
        Value::Integer(key.entity_code),
        Value::Integer(key.sequence),
        Value::Text(entity.as_str().to_string()),
        date.map(Value::Date).unwrap_or(Value::Null),
    ];
    row.extend(attributes.iter().cloned());
    row
}

impl ReconResult {
    /// `RESTOS_PAGAR`: one row per carried obligation.
    pub fn restos_table(&self) -> Table {
        let mut columns = leading_columns(&self.attribute_columns);
        columns.extend(
            Balances::default()
                .columns()
                .iter()
                .map(|(name, _)| TableColumn::new(name, ValueKind::Decimal)),
        );

        let mut table = Table::new(RESTOS_TABLE, columns);
        for r in &self.restos {
            let mut row = leading_values(&r.key, r.entity, r.commitment_date, &r.attributes);
            row.extend(r.balances.columns().iter().map(|(_, v)| Value::Cents(*v)));
            table.rows.push(row);
        }
        table
    }

    /// `MOVIMENTO_ANUAL`: one row per obligation of the target year.
    pub fn movement_table(&self) -> Table {
        let mut columns = leading_columns(&self.attribute_columns);
        columns.extend(
            MovementTotals::default()
                .columns()
                .iter()
                .map(|(name, _)| TableColumn::new(name, ValueKind::Decimal)),
        );

        let mut table = Table::new(MOVEMENT_TABLE, columns);
        for r in &self.movements {
            let mut row = leading_values(&r.key, r.entity, r.commitment_date, &r.attributes);
            row.extend(r.totals.columns().iter().map(|(_, v)| Value::Cents(*v)));
            table.rows.push(row);
        }
        table
    }

    pub fn tables(&self) -> Vec<Table> {
        vec![self.restos_table(), self.movement_table()]
    }
}
