//! Timer-driven panel refresh.
//!
//! Each panel registers a callback with its own interval. The render loop
//! asks the scheduler to run whatever is due and redraws only when at least
//! one callback reports a change.

use std::time::Duration;

use super::panel::{AxisBounds, PanelState, Readout, ReadoutValue, WaveformSpec};
use crate::{
    core::clock::format_elapsed,
    feed::{ColumnCursor, FeedBuffers},
};

/// What a refresh callback gets to look at.
pub struct RefreshContext<'a> {
    pub buffers: &'a FeedBuffers,
    pub elapsed: Duration,
}

/// Updates one panel's state; returns `true` when anything visible changed.
pub type RefreshFn<S> = Box<dyn FnMut(&mut S, &RefreshContext<'_>) -> bool + Send>;

struct Entry<S> {
    target: usize,
    interval: Duration,
    next_due: Duration,
    callback: RefreshFn<S>,
}

/// Fixed-interval callbacks over a slice of panel states.
pub struct Scheduler<S> {
    entries: Vec<Entry<S>>,
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> Scheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh `states[target]` every `interval`, first on the next `run_due`.
    pub fn register<F>(&mut self, target: usize, interval: Duration, callback: F)
    where
        F: FnMut(&mut S, &RefreshContext<'_>) -> bool + Send + 'static,
    {
        self.entries.push(Entry {
            target,
            interval: interval.max(Duration::from_millis(1)),
            next_due: Duration::ZERO,
            callback: Box::new(callback),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every callback due at `now`. Missed ticks are not replayed.
    pub fn run_due(&mut self, now: Duration, states: &mut [S], ctx: &RefreshContext<'_>) -> bool {
        let mut changed = false;
        for entry in self.entries.iter_mut().filter(|entry| entry.next_due <= now) {
            match states.get_mut(entry.target) {
                Some(state) => changed |= (entry.callback)(state, ctx),
                None => log::warn!("refresh registered for missing panel #{}", entry.target),
            }
            entry.next_due += entry.interval;
            if entry.next_due <= now {
                entry.next_due = now + entry.interval;
            }
        }
        changed
    }

    /// Earliest time a callback becomes due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.next_due).min()
    }
}

/// Follow a feed column: new samples are appended to the line, which is then
/// cut down to the sweep window and handed to the panel as a whole.
pub fn waveform_refresh(
    spec: &WaveformSpec,
) -> impl FnMut(&mut PanelState, &RefreshContext<'_>) -> bool + Send + 'static {
    let feed = spec.feed;
    let sweep = spec.sweep_secs.max(f64::EPSILON);
    let y_bounds = spec.y_bounds;
    let mut cursor = ColumnCursor::new(spec.column.clone());

    move |state, ctx| {
        let fresh = ctx.buffers.get(feed).read_since(&mut cursor);
        if fresh.is_empty() {
            return false;
        }

        let mut line = std::mem::take(&mut state.line);
        line.extend(
            fresh
                .iter()
                .filter_map(|sample| sample.value.map(|value| (sample.time, value))),
        );

        let latest = line.last().map(|&(time, _)| time).unwrap_or(0.0);
        let high = latest.max(sweep);
        let low = high - sweep;
        let first_visible = line.partition_point(|&(time, _)| time < low);
        line.drain(..first_visible);

        state.x_bounds = [low, high];
        state.y_bounds = match y_bounds {
            AxisBounds::Fixed(low, high) => [low, high],
            AxisBounds::Auto => auto_bounds(&line),
        };
        state.line = line;
        true
    }
}

fn auto_bounds(line: &[(f64, f64)]) -> [f64; 2] {
    let (low, high) = line
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), &(_, value)| {
            (low.min(value), high.max(value))
        });
    if !low.is_finite() || !high.is_finite() {
        return [0.0, 1.0];
    }
    let margin = if high > low { (high - low) * 0.05 } else { 1.0 };
    [low - margin, high + margin]
}

/// Latest value of every live item, static items as they are.
pub fn readout_refresh(
    readout: &Readout,
) -> impl FnMut(&mut PanelState, &RefreshContext<'_>) -> bool + Send + 'static {
    let items = readout.items.clone();

    move |state, ctx| {
        let texts: Vec<String> = items
            .iter()
            .map(|item| {
                let latest = match &item.value {
                    ReadoutValue::Live { feed, column, .. } => {
                        ctx.buffers.get(*feed).latest_value(column)
                    }
                    ReadoutValue::Static(_) => None,
                };
                item.value.format(latest)
            })
            .collect();

        if texts == state.texts {
            return false;
        }
        state.texts = texts;
        true
    }
}

pub fn clock_refresh() -> impl FnMut(&mut PanelState, &RefreshContext<'_>) -> bool + Send + 'static {
    |state, ctx| {
        let text = format_elapsed(ctx.elapsed);
        if state.texts.first() == Some(&text) {
            return false;
        }
        state.texts = vec![text];
        true
    }
}
