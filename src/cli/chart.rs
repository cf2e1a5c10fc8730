//! Terminal rendering of the weekly rate history.

use super::ui;
use crate::core::HistoryPoint;
use comfy_table::{Cell, Color};

const BAR_WIDTH: usize = 30;

/// Bar lengths scaled between the lowest and highest rate.
///
/// The lowest sample still gets one cell so every point stays visible.
pub fn bar_lengths(points: &[HistoryPoint], width: usize) -> Vec<usize> {
    let min = points.iter().map(|p| p.rate).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.rate).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    points
        .iter()
        .map(|p| {
            if span <= f64::EPSILON {
                width
            } else {
                1 + (((p.rate - min) / span) * (width - 1) as f64).round() as usize
            }
        })
        .collect()
}

pub fn render(points: &[HistoryPoint], base: &str, target: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&format!("{base} → {target}")),
        ui::header_cell("Change"),
        ui::header_cell(""),
    ]);

    let first = points.first().map(|p| p.rate);
    for (point, len) in points.iter().zip(bar_lengths(points, BAR_WIDTH)) {
        let change = match first {
            Some(f) if f > 0.0 => ((point.rate - f) / f) * 100.0,
            _ => 0.0,
        };
        table.add_row(vec![
            Cell::new(&point.label),
            ui::number_cell(format!("{:.4}", point.rate)),
            ui::change_cell(change),
            Cell::new("█".repeat(len)).fg(Color::Blue),
        ]);
    }

    format!(
        "{}\n{}",
        ui::style_text("Rate history", ui::StyleType::Title),
        table
    )
}
