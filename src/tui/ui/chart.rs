use ratatui::{
    prelude::*,
    widgets::{Axis, Chart, Dataset, GraphType},
};

use super::{BACKGROUND, REFERENCE_COLOR};
use crate::dashboard::{panel::WaveformSpec, PanelState};

/// Line chart of a waveform panel with its reference lines.
///
/// Reference values are printed in gutters beside the plot, at the row where
/// each line starts (left) or ends (right).
pub fn render_waveform(frame: &mut Frame, area: Rect, spec: &WaveformSpec, state: &PanelState) {
    let [x_low, x_high] = state.x_bounds;
    let [y_low, y_high] = state.y_bounds;

    let left_labels: Vec<String> = if spec.reference_labels.left {
        spec.reference_lines.iter().map(|r| format_level(r.start)).collect()
    } else {
        Vec::new()
    };
    let right_labels: Vec<String> = if spec.reference_labels.right {
        spec.reference_lines.iter().map(|r| format_level(r.end)).collect()
    } else {
        Vec::new()
    };

    let [left, plot, right] = Layout::horizontal([
        Constraint::Length(gutter_width(&left_labels)),
        Constraint::Min(1),
        Constraint::Length(gutter_width(&right_labels)),
    ])
    .areas(area);

    let reference_points: Vec<[(f64, f64); 2]> = spec
        .reference_lines
        .iter()
        .map(|line| [(x_low, line.start), (x_high, line.end)])
        .collect();

    let mut datasets: Vec<Dataset> = reference_points
        .iter()
        .map(|points| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(REFERENCE_COLOR))
                .data(points)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(spec.color))
            .data(&state.line),
    );

    let chart = Chart::new(datasets)
        .style(Style::default().bg(BACKGROUND))
        .x_axis(Axis::default().bounds([x_low, x_high]))
        .y_axis(Axis::default().bounds([y_low, y_high]));
    frame.render_widget(chart, plot);

    let label_style = Style::default()
        .fg(REFERENCE_COLOR)
        .bg(BACKGROUND)
        .add_modifier(Modifier::BOLD);
    let buffer = frame.buffer_mut();
    for (line, text) in spec.reference_lines.iter().zip(&left_labels) {
        if left.is_empty() {
            break;
        }
        if let Some(row) = value_row(line.start, [y_low, y_high], left) {
            let x = left.right().saturating_sub(text.len() as u16 + 1).max(left.x);
            buffer.set_string(x, row, text, label_style);
        }
    }
    for (line, text) in spec.reference_lines.iter().zip(&right_labels) {
        if right.width < 2 {
            break;
        }
        if let Some(row) = value_row(line.end, [y_low, y_high], right) {
            buffer.set_string(right.x + 1, row, text, label_style);
        }
    }
}

fn format_level(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}

fn gutter_width(labels: &[String]) -> u16 {
    labels
        .iter()
        .map(|label| label.len() as u16 + 2)
        .max()
        .unwrap_or(0)
}

/// Terminal row showing `value`, or `None` when it is off the chart.
pub fn value_row(value: f64, bounds: [f64; 2], area: Rect) -> Option<u16> {
    let [low, high] = bounds;
    if area.height == 0 || high <= low || value < low || value > high {
        return None;
    }
    let fraction = (value - low) / (high - low);
    let offset = ((1.0 - fraction) * f64::from(area.height - 1)).round() as u16;
    Some(area.y + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_row() {
        let area = Rect::new(0, 10, 20, 11);
        assert_eq!(value_row(30.0, [-5.0, 30.0], area), Some(10));
        assert_eq!(value_row(-5.0, [-5.0, 30.0], area), Some(20));
        assert_eq!(value_row(12.5, [-5.0, 30.0], area), Some(15));
        assert_eq!(value_row(31.0, [-5.0, 30.0], area), None);
    }

    #[test]
    fn test_labels_are_whole_numbers() {
        assert_eq!(format_level(25.0), "25");
        assert_eq!(format_level(127.9), "127");
        assert_eq!(gutter_width(&["4".into(), "25".into()]), 4);
        assert_eq!(gutter_width(&[]), 0);
    }
}
