//! Display-ready values derived from a refresh.
//!
//! These are plain data transformations; rendering lives in the CLI.

use super::calc::{Change, calculate_change, convert};
use super::instrument::Instrument;
use super::locale::{Currency, format_currency, format_number};
use super::quote::{HistoryPoint, RefreshResult};
use super::refresh::RefreshOutcome;
use chrono::{Datelike, Local};

pub const ERROR_PLACEHOLDER: &str = "Error";

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDisplay {
    pub change: Change,
    pub positive: bool,
    pub arrow: &'static str,
    pub value: String,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversions {
    pub clp_value: f64,
    pub usd_value: f64,
    pub uf_value: f64,
    pub clp: String,
    pub usd: String,
    pub usd_rate: String,
    pub uf: String,
    pub uf_rate: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub estimated: bool,
    /// Tooltip for the most recent point.
    pub latest: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub name: String,
    pub description: String,
    pub main_value: String,
    pub change: ChangeDisplay,
    pub conversions: Conversions,
    pub updated_at: String,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

pub fn snapshot(result: &RefreshResult) -> DisplaySnapshot {
    let instrument = &result.instrument;
    DisplaySnapshot {
        name: instrument.name.clone(),
        description: instrument.description.clone(),
        main_value: format_main_value(instrument, result.quote.current),
        change: change_display(result.quote.current, result.quote.previous),
        conversions: conversions(result),
        updated_at: format!(
            "Last update: {}",
            result
                .fetched_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        chart: chart_series(instrument, &result.history, result.is_simulated()),
    }
}

/// Index values are shown in points, stocks in CLP.
pub fn format_main_value(instrument: &Instrument, value: f64) -> String {
    if instrument.is_index() {
        format_number(value, 2)
    } else {
        format_currency(value, Currency::Clp)
    }
}

pub fn change_display(current: f64, previous: f64) -> ChangeDisplay {
    let change = calculate_change(current, previous);
    let positive = change.value >= 0.0;
    let percent = format_number(change.percent, 2);
    ChangeDisplay {
        change,
        positive,
        arrow: if positive { "▲" } else { "▼" },
        value: format_number(change.value.abs(), 2),
        percent: if positive {
            format!("+{percent}%")
        } else {
            format!("{percent}%")
        },
    }
}

pub fn conversions(result: &RefreshResult) -> Conversions {
    let value = result.quote.current;
    let rates = result.rates;
    let usd_value = convert(value, rates.usd());
    let uf_value = convert(value, rates.uf());
    Conversions {
        clp_value: value,
        usd_value,
        uf_value,
        clp: format_currency(value, Currency::Clp),
        usd: format_currency(usd_value, Currency::Usd),
        usd_rate: format_currency(rates.usd(), Currency::Clp),
        uf: format!("{uf_value:.6} UF"),
        uf_rate: format_currency(rates.uf(), Currency::Clp),
    }
}

pub fn chart_series(instrument: &Instrument, history: &[HistoryPoint], estimated: bool) -> ChartSeries {
    ChartSeries {
        title: format!("{} evolution", instrument.name),
        label: format!("{} (CLP)", instrument.name),
        labels: history
            .iter()
            .map(|p| {
                let date = p.timestamp.with_timezone(&Local);
                format!("{:02} {}", date.day(), MONTHS_ES[date.month0() as usize])
            })
            .collect(),
        values: history.iter().map(|p| p.value).collect(),
        estimated,
        latest: history
            .last()
            .map(|p| tooltip(instrument, p.value, estimated)),
    }
}

/// Tooltip text for a single chart point.
pub fn tooltip(instrument: &Instrument, value: f64, estimated: bool) -> String {
    let suffix = if estimated { " (estimated)" } else { "" };
    format!(
        "{}: {}{}",
        instrument.name,
        format_currency(value, Currency::Clp),
        suffix
    )
}

/// Transient message for the outcome of a cycle. Skipped cycles are silent.
pub fn notification(outcome: &RefreshOutcome) -> Option<Notification> {
    match outcome {
        RefreshOutcome::Updated(result) if result.is_simulated() => Some(Notification {
            level: NotificationLevel::Success,
            message: "Data updated (estimated chart)".to_string(),
        }),
        RefreshOutcome::Updated(_) => Some(Notification {
            level: NotificationLevel::Success,
            message: "Data updated successfully".to_string(),
        }),
        RefreshOutcome::Failed { .. } => Some(Notification {
            level: NotificationLevel::Error,
            message: "Failed to update data. Please try again.".to_string(),
        }),
        RefreshOutcome::Skipped => None,
    }
}
