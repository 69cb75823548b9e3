//! Array extractor
//!
//! Finds the first array-literal declaration in the source text, e.g.
//! `const list = [9, 7, 5];`, and parses its contents as a JSON array of numbers.
//! The scan works on raw characters: it does not know about comments or strings,
//! and the literal must close on the line it opens (`[` up to the first `]`).
//!
//! Finding no declaration is not an error; a declaration whose contents are not
//! a JSON array of numbers is an [`ExtractionError`].

use std::ops::Range;
use thiserror::Error;
use tracing::{debug, instrument};

const DECLARATION_KEYWORDS: [&str; 3] = ["const", "let", "var"];

/// A literal declaration whose contents failed to parse
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("Invalid array literal '{name}' at line {line}: {message}")]
    Syntax {
        name: String,
        line: usize,
        message: String,
    },

    #[error("Array '{name}' at line {line} must contain only numbers, element {index} is {found}")]
    NotNumeric {
        name: String,
        line: usize,
        index: usize,
        found: String,
    },
}

/// A declaration such as `const name = [..]` located in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    /// Text between the brackets
    pub contents: &'a str,
    /// Byte range from the keyword through the closing bracket
    pub span: Range<usize>,
    pub line: usize,
}

/// The parsed initial array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub name: String,
    pub values: Vec<f64>,
    pub line: usize,
}

/// Locate the first `const|let|var <ident> = [ ... ]` declaration
pub fn find_declaration(text: &str) -> Option<Declaration<'_>> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if let Some(found) = match_declaration(text, pos) {
            return Some(found);
        }
        pos += 1;
    }
    None
}

/// Parse the initial array out of `text`.
///
/// Returns `Ok(None)` when there is no array-literal declaration at all.
#[instrument(skip_all, fields(text_len = text.len()))]
pub fn extract(text: &str) -> Result<Option<ArrayLiteral>, ExtractionError> {
    let Some(declaration) = find_declaration(text) else {
        debug!("no array literal declaration");
        return Ok(None);
    };
    debug!(name = declaration.name, line = declaration.line, "found array literal");

    let items: Vec<serde_json::Value> = serde_json::from_str(&format!("[{}]", declaration.contents))
        .map_err(|err| ExtractionError::Syntax {
            name: declaration.name.to_string(),
            line: declaration.line,
            message: err.to_string(),
        })?;

    let values = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64().ok_or_else(|| ExtractionError::NotNumeric {
                name: declaration.name.to_string(),
                line: declaration.line,
                index,
                found: item.to_string(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(Some(ArrayLiteral {
        name: declaration.name.to_string(),
        values,
        line: declaration.line,
    }))
}

fn match_declaration(text: &str, start: usize) -> Option<Declaration<'_>> {
    let bytes = text.as_bytes();
    if start > 0 && is_ident_byte(bytes[start - 1]) {
        return None;
    }

    let keyword = DECLARATION_KEYWORDS
        .iter()
        .find(|kw| bytes[start..].starts_with(kw.as_bytes()))?;
    let mut pos = start + keyword.len();

    // At least one whitespace character between keyword and name
    let after_keyword = skip_whitespace(bytes, pos);
    if after_keyword == pos {
        return None;
    }
    pos = after_keyword;

    let name_start = pos;
    while pos < bytes.len() && is_ident_byte(bytes[pos]) {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = &text[name_start..pos];

    pos = skip_whitespace(bytes, pos);
    if bytes.get(pos) != Some(&b'=') {
        return None;
    }
    pos = skip_whitespace(bytes, pos + 1);
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }

    let contents_start = pos + 1;
    let close = text[contents_start..]
        .find(|c: char| c == ']' || c == '\n')
        .map(|offset| contents_start + offset)
        .filter(|&i| bytes[i] == b']')?;

    Some(Declaration {
        name,
        contents: &text[contents_start..close],
        span: start..close + 1,
        line: text[..start].matches('\n').count() + 1,
    })
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_declaration() {
        let text = "// demo\nconst list = [9, 7, 5];\nconst other = [1];";
        let literal = extract(text).unwrap().unwrap();
        assert_eq!(literal.name, "list");
        assert_eq!(literal.values, vec![9.0, 7.0, 5.0]);
        assert_eq!(literal.line, 2);
    }

    #[test]
    fn test_let_and_var_are_declarations_too() {
        assert_eq!(find_declaration("let a=[1,2]").unwrap().contents, "1,2");
        assert_eq!(find_declaration("var  xs =\t[ ]").unwrap().name, "xs");
    }

    #[test]
    fn test_no_declaration() {
        assert_eq!(extract("for (let i = 0; i < 3; i++) {}").unwrap(), None);
        assert_eq!(extract("").unwrap(), None);
        // keyword must stand alone
        assert_eq!(find_declaration("myconst a = [1]"), None);
    }

    #[test]
    fn test_literal_must_close_on_its_line() {
        let text = "const a = [1,\n 2];";
        assert_eq!(extract(text).unwrap(), None);
    }

    #[test]
    fn test_nested_bracket_stops_at_first_close() {
        // `[[1], 2]` is cut at the first `]`, leaving unbalanced JSON
        let err = extract("const grid = [[1], 2];").unwrap_err();
        assert!(matches!(err, ExtractionError::Syntax { ref name, .. } if name == "grid"));
    }

    #[test]
    fn test_invalid_contents_are_reported() {
        let err = extract("const a = [1, 2,];").unwrap_err();
        assert!(err.to_string().starts_with("Invalid array literal 'a' at line 1:"));

        let err = extract("const a = [1, \"two\"];").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Array 'a' at line 1 must contain only numbers, element 1 is \"two\""
        );
    }

    #[test]
    fn test_decimals_and_negatives() {
        let literal = extract("const a = [-1, 0.5, 2e3];").unwrap().unwrap();
        assert_eq!(literal.values, vec![-1.0, 0.5, 2000.0]);
    }
}
