//! Source pane rendering with syntax highlighting
//!
//! Shows either the text the user wrote or the instrumented text that was
//! actually executed. Lines holding a rewritten counted loop get a marker in the
//! gutter.
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without requiring a full lexer.

use super::{border_style, clamp_scroll};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What the source pane shows
pub struct SourceView<'a> {
    pub text: &'a str,
    /// 1-based lines where an instrumented loop starts
    pub hook_lines: &'a [usize],
    pub instrumented: bool,
}

/// Simple syntax highlighting for the script language
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        // Handle comments
        if c == '/' && chars.get(i + 1).is_some_and(|&(_, n)| n == '/') {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            spans.push(Span::styled(
                &line[offset..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Handle strings
        if matches!(c, '"' | '\'' | '`') {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_offset = chars.get(end).map_or(line.len(), |&(o, _)| o);
            spans.push(Span::styled(
                &line[offset..end_offset],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Handle non-identifier characters (delimiters)
        if !c.is_alphanumeric() && c != '_' && c != '$' && !(c == '.' && is_numeric(&current_word)) {
            if !current_word.is_empty() {
                let style = get_keyword_style(&current_word, c == '(');
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = get_keyword_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "const" | "let" | "var" | "function" | "async" | "await" | "return" | "if" | "else"
        | "while" | "for" | "do" | "break" | "continue" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" => Style::default().fg(DEFAULT_THEME.number),
        "highlightElement" | "updateArrayData" | "delay" | "arrayData" | "dynamicArray" => {
            Style::default().fg(DEFAULT_THEME.hook)
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    view: &SourceView,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = if view.instrumented {
        " Source (instrumented) "
    } else {
        " Source "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = view.text.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_hook = view.hook_lines.contains(&line_num);
            let (gutter, num_style) = if is_hook {
                (
                    format!("{:4}◆", line_num),
                    Style::default()
                        .fg(DEFAULT_THEME.hook)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    format!("{:4} ", line_num),
                    Style::default().fg(DEFAULT_THEME.comment),
                )
            };

            let mut content_line = highlight_source_code(line);
            if is_hook {
                for span in &mut content_line.spans {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![Span::styled(gutter, num_style), Span::raw(" ")];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlighting_preserves_text() {
        for line in [
            "const list = [9, 7.5, 'é]'];",
            "for (let i = 0; i < a.length; i++) { // ü",
            "log(\"unterminated",
        ] {
            assert_eq!(text_of(&highlight_source_code(line)), line);
        }
    }

    #[test]
    fn test_keywords_and_hooks_are_styled() {
        let line = highlight_source_code("await highlightElement(j);");
        assert_eq!(line.spans[0].content, "await");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(line.spans[2].content, "highlightElement");
        assert_eq!(line.spans[2].style.fg, Some(DEFAULT_THEME.hook));
    }
}
