//! Memory model for the script interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Number, Bool, Str, Array, Observed, ...)
//! - [`stack`]: Call stack with frames, block scopes and `const` tracking
//! - [`heap`]: Arena of script arrays addressed by [`value::ArrayRef`]
//!
//! The visualised array itself is *not* stored here: it is owned by the
//! [`ObservedArray`](crate::visual::observed::ObservedArray) wrapper and reached
//! through [`value::Value::Observed`].

pub mod heap;
pub mod stack;
pub mod value;
