//! Dashboard model: where panels sit, what they show and when they refresh.
//!
//! Nothing in here touches the terminal; `tui` draws whatever state the
//! panels currently hold.

pub mod layout;
pub mod panel;
pub mod preset;
pub mod scheduler;

pub use layout::{Canvas, PixelRect, UnitRect, DESIGNER_CANVAS};
pub use panel::{PanelKind, PanelSpec, PanelState};
pub use preset::clinical_dashboard;
pub use scheduler::{RefreshContext, Scheduler};

use std::time::Duration;

/// Fixed panels, their current states and the callbacks that update them.
#[derive(Default)]
pub struct Dashboard {
    panels: Vec<PanelSpec>,
    states: Vec<PanelState>,
    scheduler: Scheduler<PanelState>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a panel; later panels are drawn on top of earlier ones.
    pub fn add_panel(&mut self, spec: PanelSpec) -> usize {
        self.states.push(PanelState::initial(&spec));
        self.panels.push(spec);
        self.panels.len() - 1
    }

    pub fn panels(&self) -> &[PanelSpec] {
        &self.panels
    }

    pub fn states(&self) -> &[PanelState] {
        &self.states
    }

    /// Run the refresh callbacks due at `ctx.elapsed`.
    pub fn refresh(&mut self, ctx: &RefreshContext<'_>) -> bool {
        self.scheduler.run_due(ctx.elapsed, &mut self.states, ctx)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PanelSpec, &PanelState)> + '_ {
        self.panels.iter().zip(&self.states)
    }
}
