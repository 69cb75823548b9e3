//! Visualization state and its timed mutation primitives
//!
//! - [`Visualizer`]: the single owner of the display state (array values,
//!   highlighted index, log) and the only sanctioned way to change it
//! - [`observed`]: the wrapper array handed to scripts, whose index reads and
//!   writes are turned into highlight and update calls
//! - [`scheduler`]: the clock every visualization pause suspends on
//!
//! Each state transition is recorded as a [`Frame`] in the [`Timeline`] so the
//! UI can replay the run with the original pauses between transitions.

pub mod observed;
pub mod scheduler;

use crate::memory::value::format_number;
use crate::snapshot::{Frame, FrameKind, Timeline};
use scheduler::{Scheduler, VirtualScheduler};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default pause after every highlight and update
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

/// The externally observable display state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub array: Vec<f64>,
    pub highlighted: Option<usize>,
    pub log: Vec<String>,
}

/// Owner of the display state, its timeline, and the pause clock
#[derive(Debug)]
pub struct Visualizer {
    state: DisplayState,
    timeline: Timeline,
    scheduler: Box<dyn Scheduler>,
    pause: Duration,
}

impl Visualizer {
    /// Create a visualizer on a virtual clock
    pub fn new(pause: Duration) -> Self {
        Self::with_scheduler(pause, Box::new(VirtualScheduler::new()))
    }

    pub fn with_scheduler(pause: Duration, scheduler: Box<dyn Scheduler>) -> Self {
        Visualizer {
            state: DisplayState::default(),
            timeline: Timeline::default(),
            scheduler,
            pause,
        }
    }

    /// Cap the recorded frames; the live state keeps changing past the cap
    pub fn with_timeline_capacity(mut self, max_frames: usize) -> Self {
        self.timeline = Timeline::new(max_frames);
        self
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The fixed interval each highlight and update suspends for
    pub fn pause_interval(&self) -> Duration {
        self.pause
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Mark `index` as under inspection, log it, then suspend for the pause interval
    pub fn highlight(&mut self, index: usize) {
        self.highlight_detached(index);
        self.pause(self.pause);
    }

    /// Apply a highlight without making the caller wait for its pause
    pub fn highlight_detached(&mut self, index: usize) {
        let value = self.state.array.get(index).copied();
        self.state.highlighted = value.map(|_| index);
        let shown = value.map_or_else(|| "undefined".to_string(), format_number);
        self.append_log(format!("Highlighting element at index {}: {}", index, shown));
        self.record(FrameKind::Highlight(index));
    }

    /// Replace the array with a copy of `values`, then suspend for the pause interval
    pub fn update(&mut self, values: &[f64]) {
        self.update_detached(values);
        self.pause(self.pause);
    }

    /// Apply an update without making the caller wait for its pause
    pub fn update_detached(&mut self, values: &[f64]) {
        self.state.array = values.to_vec();
        if self.state.highlighted.is_some_and(|i| i >= values.len()) {
            self.state.highlighted = None;
        }
        self.record(FrameKind::Update);
    }

    /// Append a line to the log
    pub fn log(&mut self, message: impl Into<String>) {
        self.append_log(message.into());
        self.record(FrameKind::Log);
    }

    /// Suspend the running script
    pub fn pause(&mut self, duration: Duration) {
        self.scheduler.sleep(duration);
    }

    /// Clear the log and the highlight and start a fresh timeline.
    /// The array is kept.
    pub fn reset(&mut self) {
        debug!(array_len = self.state.array.len(), "resetting display state");
        self.state.log.clear();
        self.state.highlighted = None;
        self.timeline.clear();
        self.record(FrameKind::Reset);
    }

    /// Seed the array from an extracted literal
    pub fn replace_array(&mut self, values: Vec<f64>) {
        self.state.array = values;
        self.state.highlighted = None;
        self.record(FrameKind::Seeded);
    }

    fn append_log(&mut self, message: String) {
        trace!(target: "algoviz::log", "{}", message);
        self.state.log.push(message);
    }

    fn record(&mut self, kind: FrameKind) {
        let frame = Frame {
            kind,
            at: self.scheduler.now(),
            array: self.state.array.clone(),
            highlighted: self.state.highlighted,
            log_len: self.state.log.len(),
        };
        let was_truncated = self.timeline.is_truncated();
        if !self.timeline.push(frame) && !was_truncated {
            warn!(
                frames = self.timeline.len(),
                "timeline capacity reached, later frames are not recorded"
            );
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE)
    }
}
