//! Loop instrumentor
//!
//! Rewrites counted loops of the exact shape
//!
//! ```text
//! for (let i = 0; i < arr.length; i++) { body }
//! ```
//!
//! so that every iteration highlights the element under the iterator, pauses,
//! runs the original body, then pushes `arr` to the display:
//!
//! ```text
//! for (let i = 0; i < arr.length; i++) { await highlightElement(i); await delay(500); body await updateArrayData(arr); }
//! ```
//!
//! Matching is a single left-to-right scan over the text. String literals and
//! comments are skipped, the body extends to the brace that balances the
//! opening one, and the scan resumes after a match, so a nested loop of the same
//! shape is covered by its outer match only. Nothing is validated
//! semantically: an unknown array name is only discovered when the script runs.
//!
//! The rewrite keeps the line count of the source unchanged, so line numbers in
//! runtime errors refer to the text the user wrote.

use crate::config::DEFAULT_PAUSE_MS;
use crate::interpreter::constants::{DELAY, HIGHLIGHT_ELEMENT, UPDATE_ARRAY_DATA};
use std::ops::Range;
use tracing::debug;

/// A recognised counted loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedLoop {
    pub iter_var: String,
    pub array_name: String,
    /// From `for` through the closing brace
    pub span: Range<usize>,
    /// From `for` through the opening brace
    pub header_span: Range<usize>,
    /// Between the braces
    pub body_span: Range<usize>,
    /// Line of the `for` keyword
    pub line: usize,
}

/// Result of instrumenting a source text
#[derive(Debug, Clone, PartialEq)]
pub struct Instrumented {
    pub text: String,
    pub loops: Vec<CountedLoop>,
}

impl Instrumented {
    /// True when no loop matched and the text was passed through
    pub fn is_unchanged(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Find every counted loop in `text`, outermost first
pub fn find_counted_loops(text: &str) -> Vec<CountedLoop> {
    let bytes = text.as_bytes();
    let mut loops = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if let Some(end) = skip_literal_or_comment(bytes, pos) {
            pos = end;
            continue;
        }

        if let Some(header) = match_header(text, pos) {
            if let Some(close) = find_closing_brace(bytes, header.open_brace + 1) {
                let body_span = header.open_brace + 1..close;
                // Already carries the hooks: leave it and everything inside alone
                if !starts_with_hook(&text[body_span.clone()], header.iter_var) {
                    loops.push(CountedLoop {
                        iter_var: header.iter_var.to_string(),
                        array_name: header.array_name.to_string(),
                        span: pos..close + 1,
                        header_span: pos..header.open_brace + 1,
                        body_span,
                        line: text[..pos].matches('\n').count() + 1,
                    });
                }
                pos = close + 1;
                continue;
            }
        }
        pos += 1;
    }

    loops
}

/// Instrument `text` with the default visualization pause
pub fn instrument(text: &str) -> Instrumented {
    instrument_with_pause(text, DEFAULT_PAUSE_MS)
}

/// Instrument `text`, inserting `await delay(pause_ms)` after each highlight
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn instrument_with_pause(text: &str, pause_ms: u64) -> Instrumented {
    let loops = find_counted_loops(text);
    debug!(loops = loops.len(), "instrumenting counted loops");

    let mut out = String::with_capacity(text.len() + loops.len() * 96);
    let mut last = 0;
    for counted in &loops {
        out.push_str(&text[last..counted.span.start]);
        out.push_str(&rewrite(text, counted, pause_ms));
        last = counted.span.end;
    }
    out.push_str(&text[last..]);

    Instrumented { text: out, loops }
}

fn rewrite(text: &str, counted: &CountedLoop, pause_ms: u64) -> String {
    let i = &counted.iter_var;
    let arr = &counted.array_name;
    let header_breaks = "\n".repeat(text[counted.header_span.clone()].matches('\n').count());
    format!(
        "for (let {i} = 0; {i} < {arr}.length; {i}++) {{ await {HIGHLIGHT_ELEMENT}({i}); await {DELAY}({pause_ms});{header_breaks}{body} await {UPDATE_ARRAY_DATA}({arr}); }}",
        body = &text[counted.body_span.clone()],
    )
}

fn starts_with_hook(body: &str, iter_var: &str) -> bool {
    let hook = format!("await {}({});", HIGHLIGHT_ELEMENT, iter_var);
    body.trim_start().starts_with(&hook)
}

struct Header<'a> {
    iter_var: &'a str,
    array_name: &'a str,
    open_brace: usize,
}

/// Match `for (let <i> = 0; <i> < <arr>.length; <i>++) {` starting at `start`
fn match_header(text: &str, start: usize) -> Option<Header<'_>> {
    let bytes = text.as_bytes();
    if start > 0 && is_ident_byte(bytes[start - 1]) {
        return None;
    }

    let mut cursor = Cursor { text, pos: start };
    cursor.keyword("for")?;
    cursor.whitespace();
    cursor.literal("(")?;
    cursor.whitespace();
    cursor.keyword("let")?;
    if cursor.whitespace() == 0 {
        return None;
    }
    let iter_var = cursor.ident()?;
    cursor.whitespace();
    cursor.literal("=")?;
    cursor.whitespace();
    cursor.literal("0")?;
    cursor.whitespace();
    cursor.literal(";")?;
    cursor.whitespace();
    cursor.same_ident(iter_var)?;
    cursor.whitespace();
    cursor.literal("<")?;
    cursor.whitespace();
    let array_name = cursor.ident()?;
    cursor.literal(".length")?;
    cursor.whitespace();
    cursor.literal(";")?;
    cursor.whitespace();
    cursor.same_ident(iter_var)?;
    cursor.literal("++")?;
    cursor.whitespace();
    cursor.literal(")")?;
    cursor.whitespace();
    cursor.literal("{")?;

    Some(Header {
        iter_var,
        array_name,
        open_brace: cursor.pos - 1,
    })
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a [u8] {
        &self.text.as_bytes()[self.pos..]
    }

    /// Skip whitespace, returning how much was skipped
    fn whitespace(&mut self) -> usize {
        let skipped = self
            .rest()
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.pos += skipped;
        skipped
    }

    fn literal(&mut self, literal: &str) -> Option<()> {
        if self.rest().starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Some(())
        } else {
            None
        }
    }

    /// A literal that must not run into a following identifier character
    fn keyword(&mut self, keyword: &str) -> Option<()> {
        self.literal(keyword)?;
        match self.rest().first() {
            Some(&b) if is_ident_byte(b) => None,
            _ => Some(()),
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let len = self.rest().iter().take_while(|b| is_ident_byte(**b)).count();
        if len == 0 {
            return None;
        }
        let ident = &self.text[self.pos..self.pos + len];
        self.pos += len;
        Some(ident)
    }

    fn same_ident(&mut self, expected: &str) -> Option<()> {
        (self.ident()? == expected).then_some(())
    }
}

/// Index of the `}` balancing an already consumed `{`, scanning from `from`
fn find_closing_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;

    while pos < bytes.len() {
        if let Some(end) = skip_literal_or_comment(bytes, pos) {
            pos = end;
            continue;
        }
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// If a string literal or comment starts at `pos`, the index just past it
fn skip_literal_or_comment(bytes: &[u8], pos: usize) -> Option<usize> {
    match (bytes[pos], bytes.get(pos + 1)) {
        (b'/', Some(b'/')) => Some(
            bytes[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |offset| pos + offset),
        ),
        (b'/', Some(b'*')) => Some(
            bytes[pos + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(bytes.len(), |offset| pos + 2 + offset + 2),
        ),
        (quote @ (b'"' | b'\'' | b'`'), _) => {
            let mut i = pos + 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b if b == quote => return Some(i + 1),
                    // Unterminated single-line string
                    b'\n' if quote != b'`' => return Some(i),
                    _ => i += 1,
                }
            }
            Some(bytes.len())
        }
        _ => None,
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_canonical_loop() {
        let text = "for (let i = 0; i < arr.length; i++) { arr[i] = 0; }";
        let loops = find_counted_loops(text);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].iter_var, "i");
        assert_eq!(loops[0].array_name, "arr");
        assert_eq!(loops[0].span, 0..text.len());
        assert_eq!(&text[loops[0].body_span.clone()], " arr[i] = 0; ");
    }

    #[test]
    fn test_compact_whitespace_is_accepted() {
        let loops = find_counted_loops("for(let k=0;k<xs.length;k++){}");
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].iter_var, "k");
    }

    #[test]
    fn test_other_shapes_are_ignored() {
        for text in [
            "for (let i = 1; i < a.length; i++) {}",
            "for (let i = 0; i <= a.length; i++) {}",
            "for (let i = 0; i < a.length - 1; i++) {}",
            "for (let i = 0; j < a.length; i++) {}",
            "for (let i = 0; i < a.length; i += 1) {}",
            "for (var i = 0; i < a.length; i++) {}",
            "for (let i = 0; i < a.length; i++) a[i] = 1;",
            "xfor (let i = 0; i < a.length; i++) {}",
        ] {
            assert!(find_counted_loops(text).is_empty(), "{}", text);
        }
    }

    #[test]
    fn test_braces_in_strings_and_comments_do_not_end_body() {
        let text = "for (let i = 0; i < a.length; i++) { log('}'); // }\n }";
        let loops = find_counted_loops(text);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].span.end, text.len());
    }

    #[test]
    fn test_unbalanced_body_is_not_a_match() {
        assert!(find_counted_loops("for (let i = 0; i < a.length; i++) { if (x) {").is_empty());
    }

    #[test]
    fn test_commented_loop_is_skipped() {
        assert!(find_counted_loops("// for (let i = 0; i < a.length; i++) {}").is_empty());
    }

    #[test]
    fn test_rewrite_shape() {
        let result = instrument_with_pause("for (let i = 0; i < a.length; i++) { s += a[i]; }", 250);
        assert_eq!(
            result.text,
            "for (let i = 0; i < a.length; i++) { await highlightElement(i); await delay(250); s += a[i];  await updateArrayData(a); }"
        );
    }

    #[test]
    fn test_multiline_header_keeps_line_count() {
        let text = "for (let i = 0;\n     i < a.length;\n     i++) {\n  a[i] = 1;\n}\nlog(1);";
        let result = instrument(text);
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.text.lines().count(), text.lines().count());
        assert!(result.text.starts_with("for (let i = 0; i < a.length; i++) {"));
    }
}
