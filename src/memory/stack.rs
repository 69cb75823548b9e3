//! Call stack and lexical scopes
//!
//! This module provides name resolution for script execution:
//! - [`Stack`]: The call stack; frame 0 is the global frame of the script body
//! - [`StackFrame`]: A single function's activation record holding nested scopes
//! - [`Binding`]: A named value with its `const`-ness
//!
//! # Resolution
//!
//! A name is looked up in the current frame from the innermost scope outwards and
//! then in the global frame. Functions therefore see their own locals and the
//! script's top-level bindings, but not the locals of their caller.

use super::value::Value;
use rustc_hash::FxHashMap;

/// A named value in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
}

/// Why an assignment to a name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Undeclared,
    Const,
}

/// Stack frame for a function call (or the global script body)
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl StackFrame {
    pub fn new(function_name: String) -> Self {
        StackFrame {
            function_name,
            scopes: vec![FxHashMap::default()],
        }
    }

    fn find(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }

    /// Names visible in this frame, innermost scope last
    pub fn bindings(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.scopes.iter().flat_map(|scope| scope.iter())
    }
}

/// The call stack
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    /// Create a stack holding only the global frame
    pub fn new() -> Self {
        Stack {
            frames: vec![StackFrame::new("<script>".to_string())],
        }
    }

    pub fn push_frame(&mut self, function_name: String) {
        self.frames.push(StackFrame::new(function_name));
    }

    /// Pop the top frame; the global frame is never popped
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Enter a new block scope in the current frame
    pub fn push_scope(&mut self) {
        self.current_frame_mut().scopes.push(FxHashMap::default());
    }

    /// Exit the current block scope, dropping its bindings
    pub fn pop_scope(&mut self) {
        let frame = self.current_frame_mut();
        if frame.scopes.len() > 1 {
            frame.scopes.pop();
        }
    }

    /// Declare a binding in the innermost scope.
    ///
    /// `let`/`const` may not redeclare a name already bound in the same scope;
    /// `var` (`allow_redeclare`) silently replaces it.
    pub fn declare(
        &mut self,
        name: &str,
        value: Value,
        is_const: bool,
        allow_redeclare: bool,
    ) -> Result<(), String> {
        let scope = self
            .current_frame_mut()
            .scopes
            .last_mut()
            .ok_or_else(|| "No active scope".to_string())?;

        if !allow_redeclare && scope.contains_key(name) {
            return Err(format!("Identifier '{}' has already been declared", name));
        }
        scope.insert(name.to_string(), Binding { value, is_const });
        Ok(())
    }

    /// Resolve a name: current frame first, then the global frame
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let current = self.current_frame();
        current.find(name).or_else(|| {
            if self.frames.len() > 1 {
                self.frames[0].find(name)
            } else {
                None
            }
        })
    }

    /// Assign to an existing, non-const binding
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let depth = self.frames.len();
        let in_current = self.current_frame().find(name).is_some();
        let frame = if in_current {
            self.current_frame_mut()
        } else if depth > 1 {
            &mut self.frames[0]
        } else {
            return Err(AssignError::Undeclared);
        };

        let binding = frame.find_mut(name).ok_or(AssignError::Undeclared)?;
        if binding.is_const {
            return Err(AssignError::Const);
        }
        binding.value = value;
        Ok(())
    }

    pub fn current_frame(&self) -> &StackFrame {
        // The global frame is never popped, so the stack is never empty
        &self.frames[self.frames.len() - 1]
    }

    fn current_frame_mut(&mut self) -> &mut StackFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Get all frames (for diagnostics)
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Number of frames, including the global one
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scope_shadowing() {
        let mut stack = Stack::new();
        stack.declare("x", Value::Number(1.0), false, false).unwrap();

        stack.push_scope();
        stack.declare("x", Value::Number(2.0), false, false).unwrap();
        assert_eq!(stack.lookup("x").unwrap().value, Value::Number(2.0));
        stack.pop_scope();

        assert_eq!(stack.lookup("x").unwrap().value, Value::Number(1.0));
    }

    #[test]
    fn test_let_redeclaration_rejected() {
        let mut stack = Stack::new();
        stack.declare("x", Value::Undefined, false, false).unwrap();
        assert!(stack.declare("x", Value::Undefined, false, false).is_err());
        assert!(stack.declare("x", Value::Undefined, false, true).is_ok());
    }

    #[test]
    fn test_const_assignment_rejected() {
        let mut stack = Stack::new();
        stack.declare("list", Value::Array(0), true, false).unwrap();
        assert_eq!(
            stack.assign("list", Value::Null),
            Err(AssignError::Const)
        );
        assert_eq!(
            stack.assign("missing", Value::Null),
            Err(AssignError::Undeclared)
        );
    }

    #[test]
    fn test_function_frame_sees_globals_not_caller_locals() {
        let mut stack = Stack::new();
        stack.declare("list", Value::Array(0), true, false).unwrap();

        stack.push_frame("outer".to_string());
        stack.declare("local", Value::Number(1.0), false, false).unwrap();

        stack.push_frame("inner".to_string());
        assert!(stack.lookup("list").is_some());
        assert!(stack.lookup("local").is_none());

        stack.assign("list", Value::Null).unwrap_err();
        stack.pop_frame();
        stack.pop_frame();
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.depth(), 1);
    }
}
