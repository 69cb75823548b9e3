//! Playground script parser
//!
//! This module transforms (instrumented) script text into an Abstract Syntax Tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! The language is the small, JavaScript-flavoured subset that array algorithms
//! written in the playground actually use:
//! - Bindings: `const`, `let`, `var`
//! - Functions: `function` / `async function` declarations, calls, `return`
//! - Control flow: `if/else`, `while`, `do-while`, `for`, `break`, `continue`
//! - Expressions: arithmetic, comparison, logical, ternary, `await`,
//!   array literals, indexing, `.length`, compound assignment, `++`/`--`
//! - No objects, closures, template literals or classes
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one function per precedence level.
//! Statement terminators follow a simplified automatic semicolon insertion rule:
//! a `;` may be omitted before `}`, end of input, or a line break.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
