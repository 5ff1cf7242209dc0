//! Balance reconciliation helpers for parsers whose source lacks balance
//! information.

use num_traits::Zero;
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::statement::Statement;

/// Relative tolerance used by [`check_balance`]
pub const BALANCE_REL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Start balance plus every line amount; `None` on overflow
fn closing_balance(stmt: &Statement, start_balance: Decimal) -> Option<Decimal> {
    stmt.lines
        .iter()
        .filter_map(|l| l.amount)
        .try_fold(start_balance, |acc, amount| acc.checked_add(amount))
}

/// `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)` with `abs_tol = 0`
fn is_close(a: Decimal, b: Decimal) -> bool {
    let Some(diff) = a.checked_sub(b) else {
        return false;
    };
    let scale = a.abs().max(b.abs());
    let tolerance = BALANCE_REL_TOLERANCE
        .checked_mul(scale)
        .unwrap_or(Decimal::MAX);
    diff.abs() <= tolerance.max(Decimal::zero())
}

/// Recalculate start/end dates and balances from the statement lines.
///
/// A missing start balance is taken as zero.
pub fn recalculate_balance(stmt: &mut Statement) -> Result<(), ValidationError> {
    let start_date = stmt.lines.iter().filter_map(|l| l.date).min();
    let end_date = stmt.lines.iter().filter_map(|l| l.date).max();
    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        return Err(ValidationError::EmptyStatement);
    };

    let start_balance = stmt.start_balance.unwrap_or_else(Decimal::zero);
    let end_balance =
        closing_balance(stmt, start_balance).ok_or(ValidationError::BalanceOverflow)?;
    stmt.start_balance = Some(start_balance);
    stmt.end_balance = Some(end_balance);
    stmt.start_date = Some(start_date);
    stmt.end_date = Some(end_date);

    log::debug!(
        "recalculated balance: {start_balance} -> {:?} ({start_date}..{end_date})",
        stmt.end_balance
    );
    Ok(())
}

/// Whether start balance plus all line amounts matches the end balance.
pub fn check_balance(stmt: &Statement) -> bool {
    let Some(end_balance) = stmt.end_balance else {
        return false;
    };
    let start_balance = stmt.start_balance.unwrap_or_else(Decimal::zero);
    closing_balance(stmt, start_balance).is_some_and(|total| is_close(total, end_balance))
}
