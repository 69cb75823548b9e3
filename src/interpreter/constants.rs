// Names and limits for the script interpreter

/// Global name of the wrapper array
pub const ARRAY_DATA: &str = "arrayData";

/// Alias of [`ARRAY_DATA`] under which the wrapper is passed into the script
pub const DYNAMIC_ARRAY: &str = "dynamicArray";

/// Capability that marks an index as under inspection
pub const HIGHLIGHT_ELEMENT: &str = "highlightElement";

/// Capability that replaces the displayed array
pub const UPDATE_ARRAY_DATA: &str = "updateArrayData";

pub const LOG: &str = "log";
pub const DELAY: &str = "delay";

/// Nested user function calls allowed before the run is aborted
pub const MAX_CALL_DEPTH: usize = 48;

/// Statements and expressions that may be under evaluation at once, counted
/// across calls. Keeps the evaluator within a 2 MB thread stack.
pub const MAX_EVAL_DEPTH: usize = 192;

/// Array nesting printed before inner arrays collapse to `[Array]`
pub const MAX_PRINT_DEPTH: usize = 32;
