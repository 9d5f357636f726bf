/// Monetary amounts are i64 minor units (cents). Rate application rounds
/// half away from zero so totals stay exact to the minor unit.

/// Share of the final total collected up front for advance bookings.
/// Fixed business rule, not configuration.
pub const ADVANCE_SHARE_PERCENT: i64 = 60;

/// Apply a fractional rate (e.g. 0.18 for 18% tax) to an amount in cents.
pub fn apply_rate(amount_cents: i64, rate: f64) -> i64 {
    (amount_cents as f64 * rate).round() as i64
}

/// Split a final total into (advance payment, remaining balance) for an
/// advance booking: 60% now, 40% on delivery. The balance is computed by
/// subtraction so the two parts always sum back to the total.
pub fn split_advance(final_total_cents: i64) -> (i64, i64) {
    let advance = (final_total_cents as f64 * (ADVANCE_SHARE_PERCENT as f64 / 100.0)).round() as i64;
    (advance, final_total_cents - advance)
}
