use std::collections::BTreeMap;

use crate::model::{DataQualityWarning, MovementRow, ReconSummary, RestosRow};

/// Compute summary statistics from the ledger, movement rows and warnings.
pub fn compute_summary(
    year: i32,
    restos: &[RestosRow],
    movements: &[MovementRow],
    warnings: &[DataQualityWarning],
) -> ReconSummary {
    let mut entity_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut warning_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_close_unliquidated = 0;
    let mut total_close_liquidated = 0;

    for r in restos {
        *entity_counts.entry(r.entity.to_string()).or_insert(0) += 1;
        total_close_unliquidated += r.balances.close_unliquidated;
        total_close_liquidated += r.balances.close_liquidated;
    }
    for r in movements {
        *entity_counts.entry(r.entity.to_string()).or_insert(0) += 1;
    }
    for w in warnings {
        *warning_counts.entry(w.code().to_string()).or_insert(0) += 1;
    }

    ReconSummary {
        year,
        obligations_carried: restos.len(),
        obligations_in_year: movements.len(),
        warnings: warnings.len(),
        warning_counts,
        total_close_unliquidated,
        total_close_liquidated,
        entity_counts,
    }
}
