use chrono::NaiveDate;

use crate::schema::CurrencyPolicy;

/// In-text markers that flag a receipt as printed in the legacy currency.
pub const LEGACY_MARKERS: [&str; 3] = ["BGN", "# лв", "лв  #"];

pub fn has_legacy_marker(text: &str) -> bool {
    LEGACY_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Multiplicative factor every raw price in the block is divided by to reach
/// the reporting currency.
///
/// Receipts dated before the cutover are always converted at the peg rate;
/// their currency markers are unreliable. On or after the cutover (or with no
/// resolvable date) the markers are the sole signal.
pub fn conversion_factor(policy: &CurrencyPolicy, date: Option<NaiveDate>, text: &str) -> f64 {
    match date {
        Some(date) if date < policy.cutover => policy.peg_rate,
        _ => {
            if has_legacy_marker(text) {
                policy.peg_rate
            } else {
                1.0
            }
        }
    }
}
