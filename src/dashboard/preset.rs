//! The clinical monitor layout.
//!
//! Coordinates are pixels on the 2560×1440 design canvas. Three grouping
//! blocks hold the ventilator waveforms (top), the oxygenation readouts with
//! their trends (bottom left) and pulse, leak and the replay clock (bottom
//! right).

use ratatui::style::Color;

use super::{
    layout::{PixelRect, DESIGNER_CANVAS},
    panel::{
        AxisBounds, LabelSides, PanelKind, PanelSpec, Readout, ReadoutItem, ReadoutValue,
        ReferenceLine, WaveformSpec,
    },
    scheduler::{clock_refresh, readout_refresh, waveform_refresh},
    Dashboard,
};
use crate::{
    config::Config,
    feed::{ColumnRef, FeedKind},
};

pub const PRESSURE_COLOR: Color = Color::Rgb(0xf3, 0x01, 0x70);
pub const FLOW_COLOR: Color = Color::Rgb(0x00, 0x00, 0x00);
pub const VOLUME_COLOR: Color = Color::Rgb(0x0c, 0x20, 0x74);
pub const FIO2_COLOR: Color = Color::Rgb(0x70, 0x00, 0xff);
pub const SPO2_COLOR: Color = Color::Rgb(0x00, 0xa5, 0xda);
pub const PULSE_COLOR: Color = Color::Rgb(0x0f, 0xd2, 0x08);
pub const LEAK_COLOR: Color = Color::Rgb(0xff, 0x99, 0x00);

const WAVEFORM_Y_BOUNDS: AxisBounds = AxisBounds::Fixed(-5.0, 30.0);
const TREND_Y_BOUNDS: AxisBounds = AxisBounds::Fixed(15.0, 135.0);
const TREND_SWEEP_SECS: f64 = 1200.0;
const STRIP_SWEEP_SECS: f64 = 60.0;

const BLOCKS: [PixelRect; 3] = [
    PixelRect::new(43.0, 43.0, 2475.0, 816.0),
    PixelRect::new(43.0, 911.0, 1211.0, 491.0),
    PixelRect::new(1307.0, 911.0, 1211.0, 491.0),
];

/// Chart area of a top-block waveform; its labels sit left of it.
const fn waveform_rect(y: f64) -> PixelRect {
    PixelRect::new(469.0, y, 2049.0, 272.0)
}

const fn waveform_label_rect(y: f64) -> PixelRect {
    PixelRect::new(43.0, y, 426.0, 272.0)
}

/// Build the fixed set of panels and register their refresh callbacks.
///
/// Called once at startup; nothing here is recomputed per frame.
pub fn clinical_dashboard(config: &Config) -> Dashboard {
    let mut dashboard = Dashboard::new();
    let channels = &config.channels;

    for rect in BLOCKS {
        dashboard.push(rect, PanelKind::Block);
    }

    let waveforms = [
        (
            43.0,
            "Druk",
            PRESSURE_COLOR,
            &channels.pressure,
            vec![ReferenceLine::level(25.0)],
            vec![("PEEP", "7"), ("PIP", "26")],
        ),
        (
            315.0,
            "Flow",
            FLOW_COLOR,
            &channels.flow,
            vec![ReferenceLine::level(0.0)],
            vec![("Resp", "56")],
        ),
        (
            587.0,
            "Terugvolume",
            VOLUME_COLOR,
            &channels.volume,
            vec![ReferenceLine::level(4.0), ReferenceLine::level(8.0)],
            vec![("Vti", "11")],
        ),
    ];
    for (y, title, color, column, reference_lines, labels) in waveforms {
        dashboard.push(
            waveform_rect(y),
            PanelKind::Waveform(WaveformSpec {
                feed: FeedKind::Waveform,
                column: column.clone(),
                color,
                reference_lines,
                reference_labels: LabelSides::LEFT,
                y_bounds: WAVEFORM_Y_BOUNDS,
                sweep_secs: config.sweep_secs,
            }),
        );
        dashboard.push(
            waveform_label_rect(y),
            PanelKind::Readout(Readout {
                title: title.to_string(),
                color,
                items: labels
                    .into_iter()
                    .map(|(label, value)| {
                        ReadoutItem::labelled(label, ReadoutValue::Static(value.to_string()))
                    })
                    .collect(),
                emphasis: false,
            }),
        );
    }

    dashboard.push(
        PixelRect::new(43.0, 911.0, 371.0, 272.0),
        monitor_readout("FiO2", FIO2_COLOR, &channels.fio2, "%", "21%"),
    );
    dashboard.push(
        PixelRect::new(43.0, 1183.0, 371.0, 219.0),
        monitor_readout("SpO2", SPO2_COLOR, &channels.spo2, "%", "84%"),
    );
    dashboard.push(
        PixelRect::new(414.0, 911.0, 750.0, 300.0),
        PanelKind::Waveform(WaveformSpec {
            feed: FeedKind::Monitor,
            column: channels.spo2.clone(),
            color: SPO2_COLOR,
            reference_lines: vec![
                ReferenceLine::slope(20.0, 42.0),
                ReferenceLine::slope(60.0, 127.0),
            ],
            reference_labels: LabelSides::BOTH,
            y_bounds: TREND_Y_BOUNDS,
            sweep_secs: TREND_SWEEP_SECS,
        }),
    );
    dashboard.push(
        PixelRect::new(414.0, 1261.0, 750.0, 100.0),
        monitor_trace(&channels.spo2, SPO2_COLOR),
    );

    dashboard.push(
        PixelRect::new(1307.0, 911.0, 250.0, 272.0),
        monitor_readout("Pulse", PULSE_COLOR, &channels.pulse, "", "144"),
    );
    dashboard.push(
        PixelRect::new(1307.0, 1183.0, 250.0, 219.0),
        monitor_readout("Leak", LEAK_COLOR, &channels.leak, "%", "18%"),
    );
    dashboard.push(
        PixelRect::new(1557.0, 1011.0, 160.0, 80.0),
        monitor_trace(&channels.pulse, PULSE_COLOR),
    );
    dashboard.push(
        PixelRect::new(1557.0, 1283.0, 160.0, 80.0),
        monitor_trace(&channels.leak, LEAK_COLOR),
    );

    // centred on (2057, 1111)
    dashboard.push(PixelRect::new(1757.0, 1011.0, 600.0, 200.0), PanelKind::Clock);

    dashboard.register_refreshes(config.refresh_interval());
    log::info!(
        "dashboard laid out: {} panels, {} refresh callbacks",
        dashboard.panels().len(),
        dashboard.scheduler.len()
    );
    dashboard
}

fn monitor_readout(
    title: &str,
    color: Color,
    column: &ColumnRef,
    suffix: &str,
    fallback: &str,
) -> PanelKind {
    PanelKind::Readout(Readout {
        title: title.to_string(),
        color,
        items: vec![ReadoutItem::bare(ReadoutValue::Live {
            feed: FeedKind::Monitor,
            column: column.clone(),
            precision: 0,
            suffix: suffix.to_string(),
            fallback: fallback.to_string(),
        })],
        emphasis: true,
    })
}

fn monitor_trace(column: &ColumnRef, color: Color) -> PanelKind {
    PanelKind::Waveform(WaveformSpec {
        feed: FeedKind::Monitor,
        column: column.clone(),
        color,
        reference_lines: Vec::new(),
        reference_labels: LabelSides::NONE,
        y_bounds: AxisBounds::Auto,
        sweep_secs: STRIP_SWEEP_SECS,
    })
}

impl Dashboard {
    fn push(&mut self, rect: PixelRect, kind: PanelKind) {
        self.add_panel(PanelSpec {
            rect: DESIGNER_CANVAS.rect_to_unit(rect),
            kind,
        });
    }

    /// One callback per live panel; blocks never change.
    fn register_refreshes(&mut self, interval: std::time::Duration) {
        for (index, spec) in self.panels.iter().enumerate() {
            match &spec.kind {
                PanelKind::Block => {}
                PanelKind::Waveform(waveform) => {
                    self.scheduler
                        .register(index, interval, waveform_refresh(waveform))
                }
                PanelKind::Readout(readout) => {
                    self.scheduler
                        .register(index, interval, readout_refresh(readout))
                }
                PanelKind::Clock => self.scheduler.register(index, interval, clock_refresh()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::layout::UnitRect;

    fn inside(outer: &UnitRect, inner: &UnitRect) -> bool {
        const SLACK: f64 = 1e-9;
        inner.x >= outer.x - SLACK
            && inner.y >= outer.y - SLACK
            && inner.x + inner.width <= outer.x + outer.width + SLACK
            && inner.y + inner.height <= outer.y + outer.height + SLACK
    }

    #[test]
    fn test_layout_contents() {
        let dashboard = clinical_dashboard(&Config::default());
        let panels = dashboard.panels();

        let count = |pred: fn(&PanelKind) -> bool| panels.iter().filter(|p| pred(&p.kind)).count();
        assert_eq!(count(|k| matches!(k, PanelKind::Block)), 3);
        assert_eq!(count(|k| matches!(k, PanelKind::Waveform(_))), 7);
        assert_eq!(count(|k| matches!(k, PanelKind::Readout(_))), 7);
        assert_eq!(count(|k| matches!(k, PanelKind::Clock)), 1);

        // blocks first so they end up underneath
        assert!(panels[..3].iter().all(|p| p.kind == PanelKind::Block));
        assert_eq!(dashboard.scheduler.len(), panels.len() - 3);
    }

    #[test]
    fn test_every_panel_sits_in_a_block() {
        let dashboard = clinical_dashboard(&Config::default());
        let blocks: Vec<_> = dashboard.panels()[..3].iter().map(|p| p.rect).collect();
        for panel in &dashboard.panels()[3..] {
            assert!(
                blocks.iter().any(|block| inside(block, &panel.rect)),
                "{:?} outside every block",
                panel.kind
            );
        }
    }

    #[test]
    fn test_waveforms_use_configured_channels() {
        let mut config = Config::default();
        config.channels.volume = ColumnRef::Index(2);
        config.sweep_secs = 30.0;
        let dashboard = clinical_dashboard(&config);

        let top: Vec<&WaveformSpec> = dashboard
            .panels()
            .iter()
            .filter_map(|p| match &p.kind {
                PanelKind::Waveform(w) if w.feed == FeedKind::Waveform => Some(w),
                _ => None,
            })
            .collect();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].column, ColumnRef::Index(1));
        assert_eq!(top[2].column, ColumnRef::Index(2));
        assert!(top.iter().all(|w| w.sweep_secs == 30.0));
        assert_eq!(top[2].reference_lines.len(), 2);
    }
}
