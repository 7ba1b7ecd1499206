//! Placeholder history for when no live series is available.
//!
//! The walk only has to look plausible on a chart. It is not a price model.

use super::quote::HistoryPoint;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use rand::Rng;

const DAILY_VOLATILITY: f64 = 0.015;
const DRIFT_BIAS: f64 = 0.48;

/// Generates up to `days` daily points ending at `now` with `current_value`.
///
/// Walks backwards one calendar day at a time, skipping weekends, so the
/// result is shorter than `days` whenever the window spans a Saturday or
/// Sunday.
pub fn generate_history<R: Rng>(
    current_value: f64,
    days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let mut points = Vec::with_capacity(days as usize);
    let mut value = current_value;

    for offset in 0..days {
        let timestamp = now - Duration::days(i64::from(offset));
        if matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        points.push(HistoryPoint { timestamp, value });

        let step: f64 = rng.random::<f64>() - DRIFT_BIAS;
        value -= step * DAILY_VOLATILITY * value;
    }

    points.reverse();
    points
}
