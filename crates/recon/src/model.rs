use std::collections::BTreeMap;

use chrono::NaiveDate;
use padconv_core::{Entity, TableColumn, Value};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Keys + movements
// ---------------------------------------------------------------------------

/// Natural key of an obligation. Ordering drives output row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommitmentKey {
    pub fiscal_year: i64,
    pub entity_code: i64,
    pub sequence: i64,
}

impl CommitmentKey {
    pub fn new(fiscal_year: i64, entity_code: i64, sequence: i64) -> Self {
        Self {
            fiscal_year,
            entity_code,
            sequence,
        }
    }
}

impl std::fmt::Display for CommitmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}/{:06}", self.fiscal_year, self.entity_code, self.sequence)
    }
}

/// One dated, signed amount: a commitment entry, liquidation or payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub date: NaiveDate,
    pub cents: i64,
}

/// Every commitment entry sharing a key, plus the attributes of its first entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Obligation {
    pub key: CommitmentKey,
    pub entity: Entity,
    /// Earliest dated entry; `None` when no entry carries a date.
    pub commitment_date: Option<NaiveDate>,
    /// Aligned with `ReconResult::attribute_columns`.
    pub attributes: Vec<Value>,
    pub entries: Vec<Movement>,
}

// ---------------------------------------------------------------------------
// Carry-forward ledger (RESTOS_PAGAR)
// ---------------------------------------------------------------------------

/// Balances of one prior-year obligation at the cutoff and through the period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub open_unliquidated: i64,
    pub open_unliquidated_prior_year: i64,
    pub open_unliquidated_older: i64,
    pub cancelled_unliquidated: i64,
    pub liquidated_in_period: i64,
    pub to_liquidate: i64,
    pub paid_unliquidated_in_period: i64,
    pub liquidated_awaiting_payment: i64,
    pub close_unliquidated: i64,
    pub open_liquidated: i64,
    pub open_liquidated_prior_year: i64,
    pub open_liquidated_older: i64,
    pub cancelled_liquidated: i64,
    pub cancelled_from_liquidated: i64,
    pub paid_liquidated_in_period: i64,
    pub close_liquidated: i64,
}

impl Balances {
    /// Name/value pairs in output column order.
    pub fn columns(&self) -> [(&'static str, i64); 16] {
        [
            ("open_unliquidated", self.open_unliquidated),
            ("open_unliquidated_prior_year", self.open_unliquidated_prior_year),
            ("open_unliquidated_older", self.open_unliquidated_older),
            ("cancelled_unliquidated", self.cancelled_unliquidated),
            ("liquidated_in_period", self.liquidated_in_period),
            ("to_liquidate", self.to_liquidate),
            ("paid_unliquidated_in_period", self.paid_unliquidated_in_period),
            ("liquidated_awaiting_payment", self.liquidated_awaiting_payment),
            ("close_unliquidated", self.close_unliquidated),
            ("open_liquidated", self.open_liquidated),
            ("open_liquidated_prior_year", self.open_liquidated_prior_year),
            ("open_liquidated_older", self.open_liquidated_older),
            ("cancelled_liquidated", self.cancelled_liquidated),
            ("cancelled_from_liquidated", self.cancelled_from_liquidated),
            ("paid_liquidated_in_period", self.paid_liquidated_in_period),
            ("close_liquidated", self.close_liquidated),
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.columns().iter().all(|(_, v)| *v == 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestosRow {
    pub key: CommitmentKey,
    pub entity: Entity,
    pub commitment_date: Option<NaiveDate>,
    pub attributes: Vec<Value>,
    pub balances: Balances,
}

// ---------------------------------------------------------------------------
// Annual movement (MOVIMENTO_ANUAL)
// ---------------------------------------------------------------------------

/// Sign-partitioned sums of one movement stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Flow {
    /// Σ positive amounts.
    pub gross: i64,
    /// −Σ negative amounts (reported positive).
    pub reversed: i64,
}

impl Flow {
    pub fn of(movements: &[Movement]) -> Self {
        movements.iter().fold(Flow::default(), |mut acc, m| {
            if m.cents >= 0 {
                acc.gross += m.cents;
            } else {
                acc.reversed -= m.cents;
            }
            acc
        })
    }

    pub fn net(&self) -> i64 {
        self.gross - self.reversed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovementTotals {
    pub committed: Flow,
    pub liquidated: Flow,
    pub paid: Flow,
}

impl MovementTotals {
    pub fn to_liquidate(&self) -> i64 {
        self.committed.net() - self.liquidated.net()
    }

    pub fn to_pay(&self) -> i64 {
        self.committed.net() - self.paid.net()
    }

    pub fn liquidated_awaiting_payment(&self) -> i64 {
        self.liquidated.net() - self.paid.net()
    }

    pub fn columns(&self) -> [(&'static str, i64); 12] {
        [
            ("committed_gross", self.committed.gross),
            ("committed_reversed", self.committed.reversed),
            ("committed_net", self.committed.net()),
            ("liquidated_gross", self.liquidated.gross),
            ("liquidated_reversed", self.liquidated.reversed),
            ("liquidated_net", self.liquidated.net()),
            ("paid_gross", self.paid.gross),
            ("paid_reversed", self.paid.reversed),
            ("paid_net", self.paid.net()),
            ("to_liquidate", self.to_liquidate()),
            ("to_pay", self.to_pay()),
            ("liquidated_awaiting_payment", self.liquidated_awaiting_payment()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovementRow {
    pub key: CommitmentKey,
    pub entity: Entity,
    pub commitment_date: Option<NaiveDate>,
    pub attributes: Vec<Value>,
    pub totals: MovementTotals,
}

// ---------------------------------------------------------------------------
// Data quality
// ---------------------------------------------------------------------------

/// Something the engine worked around. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Commitment entries without a valid date; excluded from every bucket.
    MissingCommitmentDate { key: CommitmentKey, entries: usize },
    /// Liquidation/payment rows without a valid date; excluded.
    MissingMovementDate { kind: String, key: CommitmentKey, rows: usize },
    /// Movements referencing a key with no commitment.
    OrphanMovement { kind: String, key: CommitmentKey, rows: usize },
    /// Obligation the classifier could not attribute.
    UnknownEntity { key: CommitmentKey },
    /// Rows whose key columns are blank; they cannot be linked to anything.
    MissingKey { kind: String, rows: usize },
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCommitmentDate { key, entries } => {
                write!(f, "commitment {key}: {entries} entry(ies) without a valid date were ignored")
            }
            Self::MissingMovementDate { kind, key, rows } => {
                write!(f, "{kind} {key}: {rows} row(s) without a valid date were ignored")
            }
            Self::OrphanMovement { kind, key, rows } => {
                write!(f, "{kind} {key}: {rows} row(s) reference an unknown commitment")
            }
            Self::UnknownEntity { key } => write!(f, "commitment {key}: entity could not be determined"),
            Self::MissingKey { kind, rows } => write!(f, "{kind}: {rows} row(s) without a commitment key"),
        }
    }
}

impl DataQualityWarning {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCommitmentDate { .. } => "missing_commitment_date",
            Self::MissingMovementDate { .. } => "missing_movement_date",
            Self::OrphanMovement { .. } => "orphan_movement",
            Self::UnknownEntity { .. } => "unknown_entity",
            Self::MissingKey { .. } => "missing_key",
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub year: i32,
    pub obligations_carried: usize,
    pub obligations_in_year: usize,
    pub warnings: usize,
    pub warning_counts: BTreeMap<String, usize>,
    pub total_close_unliquidated: i64,
    pub total_close_liquidated: i64,
    /// Ledger + movement rows per entity tag.
    pub entity_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub year: i32,
    pub cutoff: NaiveDate,
    /// Commitment columns carried on every row, in order.
    pub attribute_columns: Vec<TableColumn>,
    pub restos: Vec<RestosRow>,
    pub movements: Vec<MovementRow>,
    pub warnings: Vec<DataQualityWarning>,
    pub summary: ReconSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn key_order_is_year_entity_sequence() {
        let mut keys = vec![
            CommitmentKey::new(2023, 1, 5),
            CommitmentKey::new(2022, 2, 1),
            CommitmentKey::new(2022, 1, 9),
        ];
        keys.sort();
        assert_eq!(keys[0], CommitmentKey::new(2022, 1, 9));
        assert_eq!(keys[2].to_string(), "2023/01/000005");
    }

    #[test]
    fn flow_partitions_by_sign() {
        let flow = Flow::of(&[
            Movement { date: d(2023, 1, 2), cents: 1000 },
            Movement { date: d(2023, 2, 2), cents: -300 },
            Movement { date: d(2023, 3, 2), cents: 500 },
        ]);
        assert_eq!(flow.gross, 1500);
        assert_eq!(flow.reversed, 300);
        assert_eq!(flow.net(), 1200);
    }

    #[test]
    fn movement_derivations() {
        let totals = MovementTotals {
            committed: Flow { gross: 10000, reversed: 1000 },
            liquidated: Flow { gross: 6000, reversed: 0 },
            paid: Flow { gross: 4000, reversed: 500 },
        };
        assert_eq!(totals.to_liquidate(), 3000);
        assert_eq!(totals.to_pay(), 5500);
        assert_eq!(totals.liquidated_awaiting_payment(), 2500);
    }

    #[test]
    fn warning_serializes_with_tag() {
        let w = DataQualityWarning::UnknownEntity { key: CommitmentKey::new(2022, 1, 3) };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "unknown_entity");
        assert_eq!(json["key"]["sequence"], 3);
    }
}
