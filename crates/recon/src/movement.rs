//! Annual movement report for obligations of the target year itself.

use crate::model::{Flow, Movement, MovementTotals};

/// Sign-partitioned totals over every movement of the obligation. No cutoff.
pub fn annual_totals(commitments: &[Movement], liquidations: &[Movement], payments: &[Movement]) -> MovementTotals {
    MovementTotals {
        committed: Flow::of(commitments),
        liquidated: Flow::of(liquidations),
        paid: Flow::of(payments),
    }
}
