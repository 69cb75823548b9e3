//! Runtime error types for the script interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while a script runs (as opposed to parse errors, which are reported before
//! execution starts).
//!
//! All runtime errors are fatal: they abort the run and are shown in the log as
//! `Error: <message>`. Display changes made before the error are kept.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}' at line {}", .location.line)]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("Undefined function '{name}' at line {}", .location.line)]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("'{name}' is not a function at line {}", .location.line)]
    NotCallable {
        name: String,
        location: SourceLocation,
    },

    #[error("Type error at line {}: {message}", .location.line)]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    #[error("Attempted to modify const variable '{var}' at line {}", .location.line)]
    ConstModification {
        var: String,
        location: SourceLocation,
    },

    /// `let`/`const` declared twice in one scope
    #[error("{message} at line {}", .location.line)]
    Redeclaration {
        message: String,
        location: SourceLocation,
    },

    #[error("Index out of range at line {}: {message}", .location.line)]
    IndexOutOfRange {
        message: String,
        location: SourceLocation,
    },

    #[error(
        "Function '{function}' expects {expected} argument{}, got {got} at line {}",
        plural(.expected),
        .location.line
    )]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    #[error("Unsupported operation: {message} at line {}", .location.line)]
    UnsupportedOperation {
        message: String,
        location: SourceLocation,
    },

    /// Heap read/write failure
    #[error("Memory operation failed: {message} at line {}", .location.line)]
    InvalidMemoryOperation {
        message: String,
        location: SourceLocation,
    },

    #[error("Maximum call depth of {limit} exceeded at line {}", .location.line)]
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// Expressions and statements nested past what the evaluator can hold
    #[error("Maximum nesting depth of {limit} exceeded at line {}", .location.line)]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },

    /// The run used up its step budget
    #[error("Execution step limit exceeded ({limit} steps)")]
    StepLimitExceeded { limit: usize },
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::UndefinedFunction { location, .. }
            | RuntimeError::NotCallable { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::ConstModification { location, .. }
            | RuntimeError::Redeclaration { location, .. }
            | RuntimeError::IndexOutOfRange { location, .. }
            | RuntimeError::ArgumentCountMismatch { location, .. }
            | RuntimeError::UnsupportedOperation { location, .. }
            | RuntimeError::InvalidMemoryOperation { location, .. }
            | RuntimeError::CallDepthExceeded { location, .. }
            | RuntimeError::NestingTooDeep { location, .. } => Some(location),
            RuntimeError::StepLimitExceeded { .. } => None,
        }
    }
}
