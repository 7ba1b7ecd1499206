//! Change and conversion arithmetic

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub value: f64,
    pub percent: f64,
}

/// Absolute and percent change from `previous` to `current`.
///
/// A zero or non-finite `previous` yields a zero change instead of dividing
/// by zero.
pub fn calculate_change(current: f64, previous: f64) -> Change {
    if previous == 0.0 || !previous.is_finite() {
        return Change {
            value: 0.0,
            percent: 0.0,
        };
    }
    let value = current - previous;
    Change {
        value,
        percent: (value / previous) * 100.0,
    }
}

/// Converts `value` into units of `rate`. Callers guarantee `rate > 0`.
pub fn convert(value: f64, rate: f64) -> f64 {
    debug_assert!(rate > 0.0, "conversion rate must be positive");
    value / rate
}
