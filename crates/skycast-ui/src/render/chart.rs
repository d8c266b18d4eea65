//! Text line chart for the temperature trend.

use std::fmt::Write;

use skycast_weather::ForecastEntry;

const POINT: char = '●';
const TRACE: char = '·';
const AXIS_LABEL_WIDTH: usize = 7;

/// Plot `entries` (timestamp -> temperature) as a `width` x `height` grid.
///
/// Points are spread evenly across the width in input order and joined with
/// interpolated traces. The y axis spans the series' own min and max.
pub fn render_trend(entries: &[ForecastEntry], width: usize, height: usize, unit: &str) -> String {
    if entries.is_empty() {
        return "No forecast data available\n".to_string();
    }

    let width = width.max(2);
    let height = height.max(2);

    let (mut lo, mut hi) = entries.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), e| (lo.min(e.temperature), hi.max(e.temperature)),
    );
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let row_of = |temp: f64| -> f64 { (hi - temp) / (hi - lo) * (height - 1) as f64 };
    let col_of = |i: usize| -> usize {
        if entries.len() == 1 {
            0
        } else {
            i * (width - 1) / (entries.len() - 1)
        }
    };

    let mut grid = vec![vec![' '; width]; height];

    for (i, pair) in entries.windows(2).enumerate() {
        let (x0, x1) = (col_of(i), col_of(i + 1));
        let (y0, y1) = (row_of(pair[0].temperature), row_of(pair[1].temperature));
        let span = (x1 - x0).max(1) as f64;
        for x in x0..=x1 {
            let t = (x - x0) as f64 / span;
            let y = (y0 + (y1 - y0) * t).round() as usize;
            grid[y.min(height - 1)][x] = TRACE;
        }
    }

    for (i, entry) in entries.iter().enumerate() {
        let y = row_of(entry.temperature).round() as usize;
        grid[y.min(height - 1)][col_of(i)] = POINT;
    }

    let mut out = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let label = if row == 0 {
            format!("{:.1}", hi)
        } else if row == height - 1 {
            format!("{:.1}", lo)
        } else if row == (height - 1) / 2 {
            format!("{:.1}", hi - (hi - lo) * row as f64 / (height - 1) as f64)
        } else {
            String::new()
        };
        let line: String = cells.iter().collect();
        let _ = writeln!(out, "{:>w$} ┤{}", label, line.trim_end(), w = AXIS_LABEL_WIDTH);
    }

    let _ = writeln!(out, "{:>w$} └{}", unit, "─".repeat(width), w = AXIS_LABEL_WIDTH);

    let first = time_label(&entries[0]);
    let last = time_label(&entries[entries.len() - 1]);
    let gap = width.saturating_sub(first.chars().count() + last.chars().count());
    let _ = writeln!(
        out,
        "{:>w$}  {}{}{}",
        "",
        first,
        " ".repeat(gap),
        if entries.len() > 1 { last } else { String::new() },
        w = AXIS_LABEL_WIDTH
    );

    out
}

fn time_label(entry: &ForecastEntry) -> String {
    entry.timestamp.format("%a %H:%M").to_string()
}
