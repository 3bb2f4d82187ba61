//! Carry-forward ledger: balances of prior-year obligations at the cutoff.
//!
//! Two parallel tracks per obligation. The unliquidated track follows
//! commitments not yet liquidated, the liquidated track follows liquidations
//! not yet paid. Amounts dated before the cutoff open the track, amounts on or
//! after it move it through the period.

use chrono::NaiveDate;

use crate::model::{Balances, Movement};

/// January 1 of the target year.
pub fn cutoff(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

fn before(movements: &[Movement], cutoff: NaiveDate) -> i64 {
    movements.iter().filter(|m| m.date < cutoff).map(|m| m.cents).sum()
}

fn in_period(movements: &[Movement], cutoff: NaiveDate) -> i64 {
    movements.iter().filter(|m| m.date >= cutoff).map(|m| m.cents).sum()
}

/// Negative amounts on or after the cutoff, reported positive.
fn cancelled_in_period(movements: &[Movement], cutoff: NaiveDate) -> i64 {
    -movements
        .iter()
        .filter(|m| m.date >= cutoff && m.cents < 0)
        .map(|m| m.cents)
        .sum::<i64>()
}

/// Balances of one obligation from fiscal year `fiscal_year` (< `year`).
pub fn carry_forward(
    fiscal_year: i64,
    year: i32,
    commitments: &[Movement],
    liquidations: &[Movement],
    payments: &[Movement],
) -> Balances {
    let Some(cutoff) = cutoff(year) else {
        return Balances::default();
    };

    let mut b = Balances::default();

    b.open_unliquidated = before(commitments, cutoff) - before(liquidations, cutoff);
    b.cancelled_unliquidated = cancelled_in_period(commitments, cutoff);
    b.liquidated_in_period = in_period(liquidations, cutoff);
    b.to_liquidate = b.open_unliquidated - b.cancelled_unliquidated - b.liquidated_in_period;
    if b.open_unliquidated > 0 {
        b.paid_unliquidated_in_period = in_period(payments, cutoff);
    }
    b.liquidated_awaiting_payment = b.liquidated_in_period - b.paid_unliquidated_in_period;
    b.close_unliquidated = b.open_unliquidated - b.cancelled_unliquidated - b.paid_unliquidated_in_period;

    b.open_liquidated = before(liquidations, cutoff) - before(payments, cutoff);
    b.cancelled_liquidated = cancelled_in_period(liquidations, cutoff);
    if b.open_liquidated > 0 {
        b.paid_liquidated_in_period = in_period(payments, cutoff);
    }
    b.close_liquidated = b.open_liquidated - b.cancelled_liquidated - b.paid_liquidated_in_period;

    rebalance(&mut b);

    if fiscal_year == i64::from(year) - 1 {
        b.open_unliquidated_prior_year = b.open_unliquidated;
        b.open_liquidated_prior_year = b.open_liquidated;
    } else {
        b.open_unliquidated_older = b.open_unliquidated;
        b.open_liquidated_older = b.open_liquidated;
    }

    b
}

/// A liquidated-side cancellation may not exceed the unliquidated closing
/// balance; the excess moves to `cancelled_from_liquidated` and back onto
/// `close_liquidated`. `close_unliquidated` is left as is.
pub fn rebalance(b: &mut Balances) {
    if b.cancelled_liquidated > b.close_unliquidated {
        let diff = b.cancelled_liquidated - b.close_unliquidated;
        b.cancelled_liquidated -= diff;
        b.cancelled_from_liquidated = diff;
        b.close_liquidated += diff;
    }
}
