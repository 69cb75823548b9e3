//! Script execution engine (the sandbox)
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter with statement execution and function calls
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! The interpreter walks the AST of the instrumented script on a single logical
//! thread. The script only sees the capabilities bound by the engine: the wrapper
//! array (`arrayData`, `dynamicArray`), `highlightElement`, `updateArrayData`,
//! `log` and `delay`. Every suspension (`await delay(..)`, a highlight, an
//! update) is a pause on the visualizer's scheduler, so visualizations are
//! applied in exactly the order the script issues them.
//!
//! # Built-in Functions
//!
//! Capabilities and the small `Math`/`console` surface are implemented directly
//! in the interpreter rather than as script code.

mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod loops;
