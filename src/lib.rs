//! # Introduction
//!
//! algoviz is an algorithm playground. A small script declares an array
//! literal and walks it; the playground seeds the display from that literal,
//! rewrites counted loops so every iteration highlights the current element and
//! redraws the array, then runs the result in a restricted interpreter. Every
//! display transition is recorded on a timeline that a terminal UI built with
//! [ratatui](https://docs.rs/ratatui) plays back.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Extractor → Instrumentor → Lexer → Parser → Interpreter → Visualizer → Timeline → TUI
//! ```
//!
//! 1. [`extractor`]: finds the first `const name = [..]` declaration and parses it.
//! 2. [`instrument`]: rewrites `for (let i = 0; i < arr.length; i++) { .. }` loops.
//! 3. [`parser`]: tokenises the script and builds an AST.
//! 4. [`interpreter`]: walks the AST with `arrayData`, `highlightElement`,
//!    `updateArrayData`, `log` and `delay` bound as globals.
//! 5. [`memory`]: script values, the array arena and lexical scopes.
//! 6. [`visual`]: the display state, the observed wrapper array and the
//!    schedulers that pauses run on.
//! 7. [`snapshot`]: the timeline of recorded frames.
//! 8. [`session`]: the [`session::Playground`] tying the steps together.
//! 9. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Script language
//!
//! `const`/`let`/`var`, (async) functions, `if/else`, `while`, `do-while`,
//! `for`, `break`, `continue`, `return`, numbers, strings, booleans, array
//! literals and the usual arithmetic, comparison and logical operators.
//! `await` is accepted and evaluates its operand.

pub mod config;
pub mod extractor;
pub mod instrument;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod session;
pub mod snapshot;
pub mod ui;
pub mod visual;
