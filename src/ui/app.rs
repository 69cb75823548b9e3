//! Main TUI application state and logic
//!
//! A run finishes instantly on the virtual clock; the app then walks the
//! recorded [`Timeline`](crate::snapshot::Timeline) frame by frame, either on
//! demand or in real time scaled by the playback speed.

use crate::session::{InitOutcome, Playground, RunOutcome, Session};
use crate::snapshot::Frame as TimelineFrame;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use super::panes::{self, SourceView, StatusInfo};

const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 16.0;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Array,
    Log,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> array -> log)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Array,
            FocusedPane::Array => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Log,
            FocusedPane::Array => FocusedPane::Source,
            FocusedPane::Log => FocusedPane::Array,
        }
    }
}

/// The main application state
pub struct App {
    pub playground: Playground,

    /// The most recent run, if any
    pub session: Option<Session>,

    /// Index of the displayed timeline frame
    pub cursor: usize,

    /// Timeline instant reached by playback
    pub playhead: Duration,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub array_scroll: usize,
    pub log_scroll: usize,

    /// Show the instrumented text instead of the source
    pub show_instrumented: bool,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Playback multiplier
    pub speed: f64,

    /// Last time playback advanced
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create an app showing the playground's current timeline from its last frame
    pub fn new(playground: Playground) -> Self {
        let speed = playground.config().playback_speed.clamp(MIN_SPEED, MAX_SPEED);
        let cursor = playground.timeline().len().saturating_sub(1);
        let playhead = playground
            .timeline()
            .get(cursor)
            .map_or(Duration::ZERO, |frame| frame.at);

        App {
            playground,
            session: None,
            cursor,
            playhead,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            array_scroll: 0,
            log_scroll: usize::MAX,
            show_instrumented: false,
            should_quit: false,
            status_message: String::from("Ready! Press r to run"),
            is_playing: false,
            speed,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing {
                let elapsed = self.last_play_time.elapsed();
                self.last_play_time = Instant::now();
                self.advance(elapsed);
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// The frame under the cursor, `None` before anything was recorded
    pub fn current_frame(&self) -> Option<&TimelineFrame> {
        self.playground.timeline().get(self.cursor)
    }

    /// Move playback forward by `elapsed` wall-clock time
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.is_playing {
            return;
        }
        let timeline = self.playground.timeline();
        let Some(last) = timeline.len().checked_sub(1) else {
            self.is_playing = false;
            return;
        };

        let scaled = Duration::try_from_secs_f64(elapsed.as_secs_f64() * self.speed)
            .unwrap_or(Duration::ZERO);
        self.playhead = self.playhead.saturating_add(scaled);
        let reached = timeline.frame_at(self.playhead).unwrap_or(0);
        if reached > self.cursor {
            self.cursor = reached;
            self.log_scroll = usize::MAX;
        }

        if self.cursor >= last {
            self.cursor = last;
            self.is_playing = false;
            self.status_message = "Playback complete".to_string();
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        // Split into 2 columns
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(pane_area);

        // Right column: Array (top) | Log (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let instrumented = self
            .session
            .as_ref()
            .and_then(|session| session.instrumented.as_ref());
        let hook_lines: Vec<usize> = instrumented
            .map(|i| i.loops.iter().map(|l| l.line).collect())
            .unwrap_or_default();
        let view = match instrumented {
            Some(i) if self.show_instrumented => SourceView {
                text: &i.text,
                hook_lines: &hook_lines,
                instrumented: true,
            },
            _ => SourceView {
                text: self.playground.source(),
                hook_lines: &hook_lines,
                instrumented: false,
            },
        };
        panes::render_source_pane(
            frame,
            columns[0],
            &view,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let state = self.playground.state();
        let (array, highlighted, log) = match self.playground.timeline().get(self.cursor) {
            Some(current) => (
                current.array.as_slice(),
                current.highlighted,
                &state.log[..current.log_len.min(state.log.len())],
            ),
            None => (state.array.as_slice(), state.highlighted, state.log.as_slice()),
        };

        panes::render_array_pane(
            frame,
            right_rows[0],
            array,
            highlighted,
            self.focused_pane == FocusedPane::Array,
            &mut self.array_scroll,
        );

        panes::render_log_pane(
            frame,
            right_rows[1],
            log,
            self.focused_pane == FocusedPane::Log,
            &mut self.log_scroll,
        );

        let timeline = self.playground.timeline();
        let info = StatusInfo {
            message: &self.status_message,
            frame: self.cursor,
            total_frames: timeline.len(),
            at: timeline.get(self.cursor).map_or(Duration::ZERO, |f| f.at),
            duration: timeline.last().map_or(Duration::ZERO, |f| f.at),
            speed: self.speed,
            is_playing: self.is_playing,
            failed: self
                .session
                .as_ref()
                .is_some_and(|session| !session.outcome.is_success()),
        };
        panes::render_status_bar(frame, status_area, &info);
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => self.run_source(),
            KeyCode::Char('e') => {
                self.is_playing = false;
                self.session = None;
                let outcome = self.playground.load_example();
                self.show_initialized(outcome);
            }
            KeyCode::Char('i') => {
                self.is_playing = false;
                self.session = None;
                let outcome = self.playground.initialize_array();
                self.show_initialized(outcome);
            }
            KeyCode::Char('v') => {
                self.show_instrumented = !self.show_instrumented;
                self.status_message = if self.show_instrumented {
                    "Showing instrumented code".to_string()
                } else {
                    "Showing source".to_string()
                };
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.set_speed(self.speed * 2.0),
            KeyCode::Char('-') => self.set_speed(self.speed / 2.0),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => self.source_scroll = self.source_scroll.saturating_sub(1),
                FocusedPane::Array => self.array_scroll = self.array_scroll.saturating_sub(1),
                FocusedPane::Log => self.log_scroll = self.log_scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => self.source_scroll = self.source_scroll.saturating_add(1),
                FocusedPane::Array => self.array_scroll = self.array_scroll.saturating_add(1),
                FocusedPane::Log => self.log_scroll = self.log_scroll.saturating_add(1),
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.toggle_playback();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                let last = self.playground.timeline().len().saturating_sub(1);
                self.seek(last);
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.seek(0);
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Run the current source and start playing its timeline from the beginning
    fn run_source(&mut self) {
        let session = self.playground.run();
        debug!(steps = session.steps, frames = self.playground.timeline().len(), "session recorded");
        self.status_message = match &session.outcome {
            RunOutcome::Success => "Run recorded, playing".to_string(),
            RunOutcome::Failed(message) => format!("Run failed: {}", message),
        };
        self.session = Some(session);
        self.seek(0);
        self.is_playing = true;
        self.last_play_time = Instant::now();
    }

    fn show_initialized(&mut self, outcome: InitOutcome) {
        let last = self.playground.timeline().len().saturating_sub(1);
        self.seek(last);
        self.status_message = match outcome {
            InitOutcome::Initialized(values) => format!("Initialized {} values", values.len()),
            InitOutcome::NoArray => "No array found".to_string(),
            InitOutcome::Failed(err) => format!("Extraction failed: {}", err),
        };
    }

    fn toggle_playback(&mut self) {
        let last = self.playground.timeline().len().saturating_sub(1);
        if !self.is_playing && self.cursor >= last {
            // Replay from the start when already at the end
            self.seek(0);
        }
        self.is_playing = !self.is_playing;
        if self.is_playing {
            self.last_play_time = Instant::now();
            self.status_message = "Playing...".to_string();
        } else {
            self.status_message = "Paused".to_string();
        }
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.status_message = format!("Playback speed {}x", self.speed);
    }

    /// Move the cursor to `index` and sync the playhead to its timestamp
    fn seek(&mut self, index: usize) {
        self.cursor = index;
        self.playhead = self
            .playground
            .timeline()
            .get(index)
            .map_or(Duration::ZERO, |frame| frame.at);
        self.log_scroll = usize::MAX;
    }

    fn step_forward(&mut self) {
        if self.cursor + 1 < self.playground.timeline().len() {
            self.seek(self.cursor + 1);
            self.status_message = "Stepped forward".to_string();
        } else {
            self.status_message = "Cannot step forward: at the last frame".to_string();
        }
    }

    fn step_backward(&mut self) {
        if self.cursor > 0 {
            self.seek(self.cursor - 1);
            self.status_message = "Stepped backward".to_string();
        } else {
            self.status_message = "Cannot step backward: at the first frame".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::snapshot::FrameKind;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn example_app() -> App {
        let mut app = App::new(Playground::new(Config::default()));
        press(&mut app, KeyCode::Char('e'));
        app
    }

    #[test]
    fn test_focus_cycles() {
        let pane = FocusedPane::Source;
        assert_eq!(pane.next().next().next(), pane);
        assert_eq!(pane.next().prev(), pane);
    }

    #[test]
    fn test_load_example_shows_initialized_array() {
        let mut app = example_app();

        assert_eq!(app.current_frame().map(|f| f.kind), Some(FrameKind::Log));
        let text = screen(&mut app);
        assert!(text.contains("Array (10)"));
        assert!(text.contains("Initialized array: [9,7,5,3,1,8,6,4,2,0]"));
        assert!(text.contains("Bubble Sort example"));
    }

    #[test]
    fn test_run_starts_playback_from_first_frame() {
        let mut app = example_app();
        press(&mut app, KeyCode::Char('r'));

        assert!(app.is_playing);
        assert_eq!(app.cursor, 0);
        assert!(app.session.as_ref().is_some_and(|s| s.outcome.is_success()));
        // Final state is sorted even though the display starts at the beginning
        assert_eq!(
            app.playground.state().array,
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_playback_follows_timestamps() {
        let mut app = example_app();
        press(&mut app, KeyCode::Char('r'));

        // The first highlight pauses for 500ms; half of that stays on it
        app.advance(Duration::from_millis(250));
        let frame = app.current_frame().cloned();
        assert_eq!(frame.as_ref().map(|f| f.highlighted), Some(Some(0)));
        assert!(app.is_playing);

        app.speed = 4.0;
        app.advance(Duration::from_secs(3600));
        assert!(!app.is_playing);
        assert_eq!(app.cursor, app.playground.timeline().len() - 1);
        assert_eq!(app.status_message, "Playback complete");
    }

    #[test]
    fn test_stepping_and_jumps() {
        let mut app = example_app();
        press(&mut app, KeyCode::Char('r'));

        press(&mut app, KeyCode::Right);
        assert!(!app.is_playing);
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.status_message, "Cannot step backward: at the first frame");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.cursor, app.playground.timeline().len() - 1);
        let text = screen(&mut app);
        assert!(text.contains("Code executed successfully"));

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.playhead, Duration::ZERO);
    }

    #[test]
    fn test_log_pane_only_shows_lines_up_to_cursor() {
        let mut app = example_app();
        press(&mut app, KeyCode::Char('r'));

        let text = screen(&mut app);
        assert!(!text.contains("Code executed successfully"));
    }

    #[test]
    fn test_toggle_instrumented_view() {
        let mut app = example_app();
        app.playground
            .set_source("const a = [1, 2];\nfor (let i = 0; i < a.length; i++) { a[i] = 0; }");
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('v'));

        let text = screen(&mut app);
        assert!(text.contains("Source (instrumented)"));
        assert!(text.contains("await highlightElement(i);"));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut app = App::new(Playground::default());
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.speed, MAX_SPEED);
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.speed, MIN_SPEED);
    }

    #[test]
    fn test_failed_run_reports_in_status() {
        let mut app = App::new(Playground::default());
        app.playground.set_source("const a = [1];\nmissing();");
        press(&mut app, KeyCode::Char('r'));

        assert!(app.status_message.starts_with("Run failed: "));
        press(&mut app, KeyCode::Enter);
        assert!(screen(&mut app).contains("Error: "));
    }
}
