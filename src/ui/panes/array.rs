//! Array pane rendering
//!
//! One row per element: index, a bar scaled against the largest value, and the
//! value itself. The highlighted element gets the accent colour and a marker.
//! Negative and non-finite values draw an empty bar.

use super::{border_style, clamp_scroll};
use crate::memory::value::format_number;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const BAR_CHAR: &str = "█";

/// Render `values` with `highlighted` marked
pub fn render_array_pane(
    frame: &mut Frame,
    area: Rect,
    values: &[f64],
    highlighted: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Array ({}) ", values.len()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if values.is_empty() {
        let paragraph = Paragraph::new("(no array)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    // Keep the highlighted row on screen while playing
    if let Some(index) = highlighted {
        if index < *scroll_offset {
            *scroll_offset = index;
        } else if index >= *scroll_offset + visible_height {
            *scroll_offset = index + 1 - visible_height;
        }
    }
    clamp_scroll(scroll_offset, values.len(), visible_height);

    let labels: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
    let index_width = (values.len() - 1).to_string().len();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let content_width = area.width.saturating_sub(2) as usize;
    // "▶ " + index + " │" + bar + " " + label
    let bar_width = content_width.saturating_sub(2 + index_width + 2 + 1 + label_width);
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let lines: Vec<Line> = values
        .iter()
        .zip(&labels)
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(index, (value, label))| {
            let is_highlighted = highlighted == Some(index);
            let len = scaled_len(*value, max, bar_width);
            let (marker, bar_style) = if is_highlighted {
                (
                    "▶ ",
                    Style::default()
                        .fg(DEFAULT_THEME.bar_highlight)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default().fg(DEFAULT_THEME.bar))
            };

            Line::from(vec![
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.bar_highlight)),
                Span::styled(
                    format!("{:>width$} │", index, width = index_width),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(BAR_CHAR.repeat(len), bar_style),
                Span::styled(
                    format!(" {}", label),
                    if is_highlighted {
                        bar_style
                    } else {
                        Style::default().fg(DEFAULT_THEME.number)
                    },
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Bar length for `value` when `max` fills `width` cells
fn scaled_len(value: f64, max: f64, width: usize) -> usize {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    let len = (value / max * width as f64).round() as usize;
    // Any positive value is visible
    len.clamp(1, width.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_len() {
        assert_eq!(scaled_len(10.0, 10.0, 20), 20);
        assert_eq!(scaled_len(5.0, 10.0, 20), 10);
        assert_eq!(scaled_len(0.01, 10.0, 20), 1);
        assert_eq!(scaled_len(0.0, 10.0, 20), 0);
        assert_eq!(scaled_len(-3.0, 10.0, 20), 0);
        assert_eq!(scaled_len(f64::NAN, 10.0, 20), 0);
    }
}
