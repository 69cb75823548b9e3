//! Lexer (tokenizer) for playground scripts
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Only the token set of the restricted script language is recognised; template
//! literals, regular expressions and other constructs are rejected with a
//! [`LexError`].

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column, and so the parser can apply automatic
/// semicolon insertion at line breaks.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    NumberLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Const(SourceLocation),
    Let(SourceLocation),
    Var(SourceLocation),
    Function(SourceLocation),
    Async(SourceLocation),
    Await(SourceLocation),
    Return(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    For(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),    // ==
    NotEq(SourceLocation),   // !=
    EqEqEq(SourceLocation),  // ===
    NotEqEq(SourceLocation), // !==
    Lt(SourceLocation),      // <
    Le(SourceLocation),      // <=
    Gt(SourceLocation),      // >
    Ge(SourceLocation),      // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Ternary
    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :

    // Punctuation
    Dot(SourceLocation),       // .
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::NumberLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Const(loc)
            | Token::Let(loc)
            | Token::Var(loc)
            | Token::Function(loc)
            | Token::Async(loc)
            | Token::Await(loc)
            | Token::Return(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::For(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Null(loc)
            | Token::Undefined(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::EqEqEq(loc)
            | Token::NotEqEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::Dot(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::NumberLiteral(n, _) => write!(f, "number {}", n),
            Token::StringLiteral(s, _) => write!(f, "string \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Const(_) => write!(f, "'const'"),
            Token::Let(_) => write!(f, "'let'"),
            Token::Var(_) => write!(f, "'var'"),
            Token::Function(_) => write!(f, "'function'"),
            Token::Async(_) => write!(f, "'async'"),
            Token::Await(_) => write!(f, "'await'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::For(_) => write!(f, "'for'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Do(_) => write!(f, "'do'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Null(_) => write!(f, "'null'"),
            Token::Undefined(_) => write!(f, "'undefined'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::EqEqEq(_) => write!(f, "'==='"),
            Token::NotEqEq(_) => write!(f, "'!=='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Question(_) => write!(f, "'?'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("Lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for playground scripts
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        match ch {
            '"' | '\'' => self.string_literal(ch, loc),

            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch, loc),

            'a'..='z' | 'A'..='Z' | '_' | '$' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => Ok(if self.eat('+') {
                Token::PlusPlus(loc)
            } else if self.eat('=') {
                Token::PlusEq(loc)
            } else {
                Token::Plus(loc)
            }),
            '-' => Ok(if self.eat('-') {
                Token::MinusMinus(loc)
            } else if self.eat('=') {
                Token::MinusEq(loc)
            } else {
                Token::Minus(loc)
            }),
            '*' => Ok(if self.eat('=') {
                Token::StarEq(loc)
            } else {
                Token::Star(loc)
            }),
            '/' => Ok(if self.eat('=') {
                Token::SlashEq(loc)
            } else {
                Token::Slash(loc)
            }),
            '%' => Ok(if self.eat('=') {
                Token::PercentEq(loc)
            } else {
                Token::Percent(loc)
            }),
            '=' => Ok(if self.eat('=') {
                if self.eat('=') {
                    Token::EqEqEq(loc)
                } else {
                    Token::EqEq(loc)
                }
            } else {
                Token::Eq(loc)
            }),
            '!' => Ok(if self.eat('=') {
                if self.eat('=') {
                    Token::NotEqEq(loc)
                } else {
                    Token::NotEq(loc)
                }
            } else {
                Token::Bang(loc)
            }),
            '<' => Ok(if self.eat('=') {
                Token::Le(loc)
            } else {
                Token::Lt(loc)
            }),
            '>' => Ok(if self.eat('=') {
                Token::Ge(loc)
            } else {
                Token::Gt(loc)
            }),
            '&' if self.eat('&') => Ok(Token::AndAnd(loc)),
            '|' if self.eat('|') => Ok(Token::OrOr(loc)),
            '?' => Ok(Token::Question(loc)),
            ':' => Ok(Token::Colon(loc)),
            '.' => Ok(Token::Dot(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse a single- or double-quoted string literal
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance();
                return Ok(Token::StringLiteral(string, loc));
            }
            if ch == '\n' {
                break;
            }

            self.advance();
            if ch == '\\' {
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "Unexpected end of input in string literal".to_string(),
                    location: self.current_location(),
                })?;

                string.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal (integer or decimal)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                seen_dot = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let value = num_str.parse::<f64>().map_err(|_| LexError {
            message: format!("Invalid number literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::NumberLiteral(value, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "const" => Token::Const(loc),
            "let" => Token::Let(loc),
            "var" => Token::Var(loc),
            "function" => Token::Function(loc),
            "async" => Token::Async(loc),
            "await" => Token::Await(loc),
            "return" => Token::Return(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "for" => Token::For(loc),
            "while" => Token::While(loc),
            "do" => Token::Do(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "null" => Token::Null(loc),
            "undefined" => Token::Undefined(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume the next character if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("const list = [3, 1];");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Const(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "list"));
        assert!(matches!(tokens[2], Token::Eq(_)));
        assert!(matches!(tokens[3], Token::LBracket(_)));
        assert!(matches!(tokens[4], Token::NumberLiteral(n, _) if n == 3.0));
        assert!(matches!(tokens[5], Token::Comma(_)));
        assert!(matches!(tokens[6], Token::NumberLiteral(n, _) if n == 1.0));
        assert!(matches!(tokens[7], Token::RBracket(_)));
        assert!(matches!(tokens[8], Token::Semicolon(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += -= == != === !== && ||");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::MinusEq(_)));
        assert!(matches!(tokens[4], Token::EqEq(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
        assert!(matches!(tokens[6], Token::EqEqEq(_)));
        assert!(matches!(tokens[7], Token::NotEqEq(_)));
        assert!(matches!(tokens[8], Token::AndAnd(_)));
        assert!(matches!(tokens[9], Token::OrOr(_)));
    }

    #[test]
    fn test_comments_are_skipped() {
        let mut lexer = Lexer::new("let x; // comment\nlet y; /* block\ncomment */ let z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Let(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[3], Token::Let(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[6], Token::Let(_)));
        assert_eq!(tokens[6].location().line, 3);
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new(r#"'it\'s' "two\nlines""#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::StringLiteral(ref s, _) if s == "it's"));
        assert!(matches!(tokens[1], Token::StringLiteral(ref s, _) if s == "two\nlines"));
    }

    #[test]
    fn test_decimal_numbers() {
        let mut lexer = Lexer::new("1.5 .25 list.length");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::NumberLiteral(n, _) if n == 1.5));
        assert!(matches!(tokens[1], Token::NumberLiteral(n, _) if n == 0.25));
        assert!(matches!(tokens[2], Token::Ident(ref s, _) if s == "list"));
        assert!(matches!(tokens[3], Token::Dot(_)));
    }

    #[test]
    fn test_template_literal_is_rejected() {
        let mut lexer = Lexer::new("log(`x`)");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.to_string().contains("Unexpected character"));
        assert_eq!(err.location.column, 5);
    }
}
