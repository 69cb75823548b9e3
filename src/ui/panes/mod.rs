//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source text with syntax highlighting, or the instrumented text
//! - [`array`]: The visualized array as horizontal bars, highlighted element marked
//! - [`log`]: The run log up to the current playback frame
//! - [`status`]: Status bar with keybindings and playback state
//!
//! Each pane module exports a `render_*` function taking the frame, its area and
//! the borrowed data it draws.

pub mod array;
pub mod log;
pub mod source;
pub mod status;

pub use array::render_array_pane;
pub use log::render_log_pane;
pub use source::{render_source_pane, SourceView};
pub use status::{render_status_bar, StatusInfo};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp a scroll offset so the last page stays full
fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}
