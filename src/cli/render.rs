use super::ui;
use crate::core::display::{
    self, ChartSeries, DisplaySnapshot, ERROR_PLACEHOLDER, NotificationLevel,
};
use crate::core::locale::format_number;
use crate::core::refresh::RefreshOutcome;
use comfy_table::Cell;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One block character per value, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= 0.0 || !span.is_finite() {
                return SPARK_LEVELS[SPARK_LEVELS.len() / 2];
            }
            let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

pub fn chart_lines(chart: &ChartSeries) -> Vec<String> {
    let mut title = chart.title.clone();
    if chart.estimated {
        title.push_str(" (estimated)");
    }

    let mut lines = vec![title];
    if chart.values.is_empty() {
        lines.push("No data".to_string());
        return lines;
    }

    lines.push(sparkline(&chart.values));
    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        lines.push(format!("{first} → {last}"));
    }
    let min = chart.values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = chart.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    lines.push(format!(
        "{}: min {} · max {} · {} points",
        chart.label,
        format_number(min, 2),
        format_number(max, 2),
        chart.values.len()
    ));
    if let Some(latest) = &chart.latest {
        lines.push(format!("Latest: {latest}"));
    }
    lines
}

pub fn print_snapshot(snapshot: &DisplaySnapshot) {
    println!(
        "\n{} {}",
        ui::style_text(&snapshot.name, ui::StyleType::Title),
        ui::style_text(&snapshot.description, ui::StyleType::Subtle)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

    let change = &snapshot.change;
    table.add_row(vec![Cell::new("Value"), ui::value_cell(&snapshot.main_value)]);
    table.add_row(vec![
        Cell::new("Change"),
        ui::change_cell(
            &format!("{} {} ({})", change.arrow, change.value, change.percent),
            change.positive,
        ),
    ]);

    let conv = &snapshot.conversions;
    table.add_row(vec![Cell::new("CLP"), ui::value_cell(&conv.clp)]);
    table.add_row(vec![
        Cell::new(format!("USD (1 USD = {})", conv.usd_rate)),
        ui::value_cell(&conv.usd),
    ]);
    table.add_row(vec![
        Cell::new(format!("UF (1 UF = {})", conv.uf_rate)),
        ui::value_cell(&conv.uf),
    ]);
    println!("{table}");

    let style = if snapshot.chart.estimated {
        ui::StyleType::Estimated
    } else {
        ui::StyleType::Success
    };
    for line in chart_lines(&snapshot.chart) {
        println!("{}", ui::style_text(&line, style));
    }
    println!("{}", ui::style_text(&snapshot.updated_at, ui::StyleType::Subtle));
}

/// Shown when a refresh fails and there are no earlier values to keep.
pub fn print_error_placeholder() {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    for metric in ["Value", "CLP", "USD", "UF"] {
        table.add_row(vec![Cell::new(metric), ui::error_cell(ERROR_PLACEHOLDER)]);
    }
    println!("{table}");
}

pub fn print_outcome(outcome: &RefreshOutcome) {
    if let Some(notification) = display::notification(outcome) {
        let style = match notification.level {
            NotificationLevel::Success => ui::StyleType::Success,
            NotificationLevel::Error => ui::StyleType::Error,
        };
        println!("\n{}", ui::style_text(&notification.message, style));
    }

    match outcome {
        RefreshOutcome::Updated(result) => print_snapshot(&display::snapshot(result)),
        RefreshOutcome::Failed { error, previous } => {
            println!("{}", ui::style_text(&error.to_string(), ui::StyleType::Subtle));
            match previous {
                Some(result) => print_snapshot(&display::snapshot(result)),
                None => print_error_placeholder(),
            }
        }
        RefreshOutcome::Skipped => {}
    }
}
