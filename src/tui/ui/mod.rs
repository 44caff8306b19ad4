pub mod chart;
pub mod readout;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders},
};

use crate::dashboard::{Dashboard, PanelKind};

pub const BACKGROUND: Color = Color::White;
pub const BORDER_COLOR: Color = Color::Rgb(0xe4, 0xe7, 0xf0);
pub const REFERENCE_COLOR: Color = Color::Rgb(0xa6, 0xa6, 0xa6);

/// Draw every panel at its fixed place, in the order they were laid out.
pub fn render_dashboard(frame: &mut Frame, dashboard: &Dashboard) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

    for (spec, state) in dashboard.iter() {
        let panel_area = spec.rect.to_area(area);
        if panel_area.is_empty() {
            continue;
        }

        match &spec.kind {
            PanelKind::Block => render_block(frame, panel_area),
            PanelKind::Waveform(waveform) => {
                chart::render_waveform(frame, panel_area, waveform, state)
            }
            PanelKind::Readout(readout) => {
                readout::render_readout(frame, panel_area, readout, state)
            }
            PanelKind::Clock => readout::render_clock(frame, panel_area, state),
        }
    }
}

fn render_block(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_COLOR))
        .style(Style::default().bg(BACKGROUND));
    frame.render_widget(block, area);
}
