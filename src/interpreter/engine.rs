// Execution engine for the playground script language

use crate::config::Config;
use crate::interpreter::constants::{
    ARRAY_DATA, DYNAMIC_ARRAY, MAX_CALL_DEPTH, MAX_EVAL_DEPTH, MAX_PRINT_DEPTH,
};
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    heap::Heap,
    stack::Stack,
    value::{format_number, format_sequence, ArrayRef, Value},
};
use crate::parser::ast::*;
use crate::visual::{observed::ObservedArray, Visualizer};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// A user-defined function, shared between the function table and active calls
#[derive(Debug, Clone)]
pub(crate) struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<AstNode>,
}

/// Non-local control flow raised by `break`, `continue` and `return`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// The interpreter that executes an instrumented script against the display state
pub struct Interpreter<'v> {
    /// Parsed program (the statements of the implicit async wrapper)
    program: Program,

    /// Call stack
    pub(crate) stack: Stack,

    /// Script arrays
    pub(crate) heap: Heap,

    /// Display state every capability mutates
    pub(crate) visualizer: &'v mut Visualizer,

    /// The wrapper bound to `arrayData`
    pub(crate) observed: ObservedArray,

    /// Hoisted function declarations (name -> FunctionDef), one table per
    /// active call on top of the global one
    function_defs: Vec<FxHashMap<String, Rc<FunctionDef>>>,

    /// Current source location being executed
    pub(crate) current_location: SourceLocation,

    pub(crate) control_flow: ControlFlow,

    /// Value of the last executed `return`
    pub(crate) return_value: Value,

    /// Statements and loop iterations executed so far
    steps: usize,
    max_steps: usize,

    /// Statements and expressions currently under evaluation
    depth: usize,
}

impl<'v> Interpreter<'v> {
    /// Create an interpreter with the capabilities bound as globals
    pub fn new(
        program: Program,
        visualizer: &'v mut Visualizer,
        observed: ObservedArray,
        config: &Config,
    ) -> Result<Self, RuntimeError> {
        let mut interpreter = Interpreter {
            program,
            stack: Stack::new(),
            heap: Heap::new(),
            visualizer,
            observed,
            function_defs: vec![FxHashMap::default()],
            current_location: SourceLocation::new(1, 1),
            control_flow: ControlFlow::Normal,
            return_value: Value::Undefined,
            steps: 0,
            max_steps: config.max_steps,
            depth: 0,
        };

        // `let arrayData = dynamicArray;` ahead of the user's code
        let location = SourceLocation::new(1, 1);
        for name in [DYNAMIC_ARRAY, ARRAY_DATA] {
            interpreter
                .stack
                .declare(name, Value::Observed, false, false)
                .map_err(|message| RuntimeError::Redeclaration { message, location })?;
        }

        let nodes = std::mem::take(&mut interpreter.program.nodes);
        interpreter.hoist_functions(&nodes);
        interpreter.program.nodes = nodes;

        Ok(interpreter)
    }

    /// Run the script from start to finish
    #[instrument(skip_all, fields(max_steps = self.max_steps))]
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let nodes = std::mem::take(&mut self.program.nodes);
        let result = self.execute_statements(&nodes);
        self.program.nodes = nodes;
        debug!(steps = self.steps, ok = result.is_ok(), "script finished");
        result?;

        match self.control_flow {
            ControlFlow::Break | ControlFlow::Continue => {
                Err(self.illegal_jump(self.control_flow, self.current_location))
            }
            // A top-level `return` ends the wrapper function early
            ControlFlow::Return | ControlFlow::Normal => Ok(()),
        }
    }

    /// Register every function declared directly in `statements` in the
    /// innermost function table
    fn hoist_functions(&mut self, statements: &[AstNode]) {
        let Some(table) = self.function_defs.last_mut() else {
            return;
        };
        for node in statements {
            if let AstNode::FunctionDef {
                name, params, body, ..
            } = node
            {
                trace!(function = %name, "hoisting function");
                table.insert(
                    name.clone(),
                    Rc::new(FunctionDef {
                        name: name.clone(),
                        params: params.clone(),
                        body: body.clone(),
                    }),
                );
            }
        }
    }

    /// Find a declared function, innermost call first
    pub(crate) fn lookup_function(&self, name: &str) -> Option<&Rc<FunctionDef>> {
        self.function_defs
            .iter()
            .rev()
            .find_map(|table| table.get(name))
    }

    /// Count one unit of work against the step budget
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        Ok(())
    }

    /// Enter one level of statement or expression nesting
    pub(crate) fn descend(&mut self, location: SourceLocation) -> Result<(), RuntimeError> {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(RuntimeError::NestingTooDeep {
                limit: MAX_EVAL_DEPTH,
                location,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Execute statements in order until one raises non-local control flow
    pub(crate) fn execute_statements(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(())
    }

    /// Execute statements inside a fresh block scope
    pub(crate) fn execute_block(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        let result = self.execute_statements(statements);
        self.stack.pop_scope();
        result
    }

    fn execute_statement(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        self.descend(stmt.location())?;
        let result = self.execute_node(stmt);
        self.ascend();
        result
    }

    /// Execute a single statement
    fn execute_node(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        self.tick()?;
        self.current_location = stmt.location();

        match stmt {
            // Hoisted when the enclosing body was entered
            AstNode::FunctionDef { .. } => Ok(()),

            AstNode::VarDecl {
                kind,
                name,
                init,
                location,
            } => self.execute_var_decl(*kind, name, init.as_deref(), *location),

            AstNode::Return { expr, .. } => {
                self.return_value = match expr {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::Undefined,
                };
                self.control_flow = ControlFlow::Return;
                Ok(())
            }

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(())
                }
            }

            AstNode::While {
                condition, body, ..
            } => self.execute_while(condition, body),

            AstNode::DoWhile {
                body, condition, ..
            } => self.execute_do_while(body, condition),

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                increment.as_deref(),
                body,
            ),

            AstNode::Break { .. } => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            AstNode::Continue { .. } => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            AstNode::Block { statements, .. } => self.execute_block(statements),

            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(())
            }

            // Bare expressions are evaluated for their side effects
            expr => {
                self.evaluate_expr(expr)?;
                Ok(())
            }
        }
    }

    fn execute_var_decl(
        &mut self,
        kind: DeclKind,
        name: &str,
        init: Option<&AstNode>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = match init {
            Some(expr) => self.evaluate_expr(expr)?,
            None => Value::Undefined,
        };

        self.stack
            .declare(name, value, kind.is_const(), kind == DeclKind::Var)
            .map_err(|message| RuntimeError::Redeclaration { message, location })
    }

    /// Call a user-defined function with already evaluated arguments.
    ///
    /// Missing arguments are `undefined`, extra ones are ignored. `async`
    /// functions run to completion before returning: every suspension inside
    /// them is a scheduler pause.
    pub(crate) fn call_user_function(
        &mut self,
        function: Rc<FunctionDef>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.stack.depth() > MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
                location,
            });
        }
        trace!(function = %function.name, "call");

        self.stack.push_frame(function.name.clone());
        let mut args = args.into_iter();
        for param in &function.params {
            let value = args.next().unwrap_or_default();
            if let Err(message) = self.stack.declare(param, value, false, true) {
                self.stack.pop_frame();
                return Err(RuntimeError::Redeclaration { message, location });
            }
        }

        // Nested declarations live until this call returns
        self.function_defs.push(FxHashMap::default());
        self.hoist_functions(&function.body);
        self.return_value = Value::Undefined;
        let result = self.execute_statements(&function.body);
        self.function_defs.pop();
        self.stack.pop_frame();
        result?;

        let flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
        match flow {
            ControlFlow::Break | ControlFlow::Continue => Err(self.illegal_jump(flow, location)),
            ControlFlow::Return | ControlFlow::Normal => {
                Ok(std::mem::take(&mut self.return_value))
            }
        }
    }

    fn illegal_jump(&self, flow: ControlFlow, location: SourceLocation) -> RuntimeError {
        let keyword = if flow == ControlFlow::Break {
            "break"
        } else {
            "continue"
        };
        RuntimeError::UnsupportedOperation {
            message: format!("'{}' outside of a loop", keyword),
            location,
        }
    }

    /// Render a value the way `log` prints it
    pub fn format_value(&self, value: &Value) -> String {
        self.format_nested(value, &mut Vec::new())
    }

    /// `enclosing` holds the arrays currently being printed; an array that
    /// contains itself prints as `[Circular]`
    fn format_nested(&self, value: &Value, enclosing: &mut Vec<ArrayRef>) -> String {
        match value {
            Value::Array(r) if enclosing.contains(r) => "[Circular]".to_string(),
            Value::Array(_) if enclosing.len() >= MAX_PRINT_DEPTH => "[Array]".to_string(),
            Value::Array(r) => match self.heap.get(*r) {
                Some(elements) => {
                    enclosing.push(*r);
                    let items: Vec<String> = elements
                        .iter()
                        .map(|element| match element {
                            Value::Str(s) => format!("\"{}\"", s),
                            other => self.format_nested(other, enclosing),
                        })
                        .collect();
                    enclosing.pop();
                    format!("[{}]", items.join(","))
                }
                None => value.to_string(),
            },
            Value::Observed => format_sequence(self.observed.values()),
            Value::Number(n) => format_number(*n),
            other => other.to_string(),
        }
    }

    pub fn current_location(&self) -> SourceLocation {
        self.current_location
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The wrapper array, including every write the script made through it
    pub fn observed(&self) -> &ObservedArray {
        &self.observed
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}
