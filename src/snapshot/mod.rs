//! Timeline of display-state snapshots for step-by-step playback
//!
//! Every state transition the visualizer makes is recorded as a [`Frame`]
//! stamped with scheduler time. The UI replays a run by looking frames up with
//! [`Timeline::frame_at`].

use std::time::Duration;

/// Default cap on recorded frames per run
pub const DEFAULT_MAX_FRAMES: usize = 200_000;

/// What caused a frame to be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Log and highlight cleared at the start of a run or initialization
    Reset,
    /// Array replaced by the extractor
    Seeded,
    /// `highlight(index)` was applied
    Highlight(usize),
    /// `update(values)` replaced the array
    Update,
    /// A line was appended to the log
    Log,
}

/// Snapshot of the display state at one instant of the run
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    pub at: Duration, // Scheduler time when the transition happened
    pub array: Vec<f64>,
    pub highlighted: Option<usize>,
    pub log_len: usize, // The log is append-only within a run
}

/// Ordered history of frames for one run
#[derive(Debug, Clone)]
pub struct Timeline {
    frames: Vec<Frame>,
    max_frames: usize,
    truncated: bool,
}

impl Timeline {
    pub fn new(max_frames: usize) -> Self {
        Timeline {
            frames: Vec::new(),
            max_frames,
            truncated: false,
        }
    }

    /// Add a frame to history.
    ///
    /// Returns `false` once the cap is reached; later frames are dropped and the
    /// timeline is marked truncated, the live display state is unaffected.
    pub fn push(&mut self, frame: Frame) -> bool {
        if self.frames.len() >= self.max_frames {
            self.truncated = true;
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// Get a frame by index
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.truncated = false;
    }

    /// Time elapsed between the first and the last frame
    pub fn duration(&self) -> Duration {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.at.saturating_sub(first.at),
            _ => Duration::ZERO,
        }
    }

    /// Index of the latest frame recorded at or before `at`
    pub fn frame_at(&self, at: Duration) -> Option<usize> {
        let count = self.frames.partition_point(|frame| frame.at <= at);
        count.checked_sub(1)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(kind: FrameKind, ms: u64) -> Frame {
        Frame {
            kind,
            at: Duration::from_millis(ms),
            array: vec![1.0, 2.0],
            highlighted: None,
            log_len: 0,
        }
    }

    #[test]
    fn test_frame_at_picks_latest_not_after() {
        let mut timeline = Timeline::default();
        timeline.push(frame(FrameKind::Reset, 0));
        timeline.push(frame(FrameKind::Highlight(0), 0));
        timeline.push(frame(FrameKind::Update, 500));

        assert_eq!(timeline.frame_at(Duration::ZERO), Some(1));
        assert_eq!(timeline.frame_at(Duration::from_millis(499)), Some(1));
        assert_eq!(timeline.frame_at(Duration::from_millis(500)), Some(2));
        assert_eq!(timeline.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_cap_truncates() {
        let mut timeline = Timeline::new(1);
        assert!(timeline.push(frame(FrameKind::Reset, 0)));
        assert!(!timeline.push(frame(FrameKind::Log, 1)));
        assert_eq!(timeline.len(), 1);
        assert!(timeline.is_truncated());

        timeline.clear();
        assert!(timeline.is_empty());
        assert!(!timeline.is_truncated());
    }
}
