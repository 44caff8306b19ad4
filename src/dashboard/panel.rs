use ratatui::style::Color;

use super::layout::UnitRect;
use crate::feed::{ColumnRef, FeedKind};

/// A fixed-position region of the dashboard. Built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub rect: UnitRect,
    pub kind: PanelKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    /// Grouping background behind other panels.
    Block,
    Waveform(WaveformSpec),
    Readout(Readout),
    /// Elapsed replay time, `MM:SS`.
    Clock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSpec {
    pub feed: FeedKind,
    pub column: ColumnRef,
    pub color: Color,
    pub reference_lines: Vec<ReferenceLine>,
    /// Print reference values beside the plot: start values on the left,
    /// end values on the right when `right` is set.
    pub reference_labels: LabelSides,
    pub y_bounds: AxisBounds,
    /// Width of the visible time window in seconds.
    pub sweep_secs: f64,
}

/// A straight guide line from the left to the right edge of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub start: f64,
    pub end: f64,
}

impl ReferenceLine {
    pub const fn level(value: f64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub const fn slope(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelSides {
    pub left: bool,
    pub right: bool,
}

impl LabelSides {
    pub const NONE: Self = Self {
        left: false,
        right: false,
    };
    pub const LEFT: Self = Self {
        left: true,
        right: false,
    };
    pub const BOTH: Self = Self {
        left: true,
        right: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisBounds {
    Fixed(f64, f64),
    /// Follow the visible data with a 5% margin on both ends.
    Auto,
}

/// Title plus one or more labelled values.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub title: String,
    pub color: Color,
    pub items: Vec<ReadoutItem>,
    /// Render values in bold (single large value readouts).
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutItem {
    pub label: Option<String>,
    pub value: ReadoutValue,
}

impl ReadoutItem {
    pub fn labelled(label: &str, value: ReadoutValue) -> Self {
        Self {
            label: Some(label.to_string()),
            value,
        }
    }

    pub fn bare(value: ReadoutValue) -> Self {
        Self { label: None, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadoutValue {
    Static(String),
    /// Latest value of a feed column, `fallback` until that column has data.
    Live {
        feed: FeedKind,
        column: ColumnRef,
        precision: usize,
        suffix: String,
        fallback: String,
    },
}

impl ReadoutValue {
    /// Text shown before the first refresh.
    pub fn initial_text(&self) -> &str {
        match self {
            ReadoutValue::Static(text) => text,
            ReadoutValue::Live { fallback, .. } => fallback,
        }
    }

    pub fn format(&self, latest: Option<f64>) -> String {
        match (self, latest) {
            (ReadoutValue::Static(text), _) => text.clone(),
            (
                ReadoutValue::Live {
                    precision, suffix, ..
                },
                Some(value),
            ) => format!("{:.*}{}", *precision, value, suffix),
            (ReadoutValue::Live { fallback, .. }, None) => fallback.clone(),
        }
    }
}

/// What a panel currently displays. Refresh callbacks replace it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub line: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Readout values in item order, or the clock text.
    pub texts: Vec<String>,
}

pub const CLOCK_PLACEHOLDER: &str = "--:--";

impl PanelState {
    pub fn initial(spec: &PanelSpec) -> Self {
        match &spec.kind {
            PanelKind::Block => Self::default(),
            PanelKind::Waveform(waveform) => Self {
                line: Vec::new(),
                x_bounds: [0.0, waveform.sweep_secs],
                y_bounds: match waveform.y_bounds {
                    AxisBounds::Fixed(low, high) => [low, high],
                    AxisBounds::Auto => [0.0, 1.0],
                },
                texts: Vec::new(),
            },
            PanelKind::Readout(readout) => Self {
                texts: readout
                    .items
                    .iter()
                    .map(|item| item.value.initial_text().to_string())
                    .collect(),
                ..Self::default()
            },
            PanelKind::Clock => Self {
                texts: vec![CLOCK_PLACEHOLDER.to_string()],
                ..Self::default()
            },
        }
    }
}
