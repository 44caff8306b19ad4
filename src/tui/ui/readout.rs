use ratatui::{prelude::*, widgets::Paragraph};

use super::BACKGROUND;
use crate::dashboard::{panel::Readout, PanelState};

const PADDING: Margin = Margin {
    horizontal: 2,
    vertical: 1,
};

/// Title line followed by each item: its label (if any) above its value.
pub fn render_readout(frame: &mut Frame, area: Rect, readout: &Readout, state: &PanelState) {
    let base = Style::default().fg(readout.color).bg(BACKGROUND);
    let value_style = if readout.emphasis {
        base.add_modifier(Modifier::BOLD)
    } else {
        base
    };

    let mut lines = vec![Line::from(Span::styled(readout.title.as_str(), base)), Line::default()];
    for (item, text) in readout.items.iter().zip(&state.texts) {
        if let Some(label) = &item.label {
            lines.push(Line::from(Span::styled(label.as_str(), base)));
        }
        lines.push(Line::from(Span::styled(text.as_str(), value_style)));
    }

    let inner = area.inner(PADDING);
    frame.render_widget(Paragraph::new(lines).style(base), inner);
}

/// Elapsed replay time, centred in its panel.
pub fn render_clock(frame: &mut Frame, area: Rect, state: &PanelState) {
    let text = state.texts.first().map(String::as_str).unwrap_or_default();
    let row = Rect {
        y: area.y + area.height.saturating_sub(1) / 2,
        height: 1.min(area.height),
        ..area
    };
    let clock = Paragraph::new(Line::from(text))
        .style(
            Style::default()
                .fg(Color::Black)
                .bg(BACKGROUND)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(clock, row);
}
