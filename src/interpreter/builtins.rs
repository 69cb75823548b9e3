//! Built-in function implementations
//!
//! This module provides the capabilities a script is allowed to use, handled by
//! the interpreter rather than being defined in user code.
//!
//! # Supported Built-ins
//!
//! - `highlightElement(i)`: mark index `i` of the displayed array and pause
//! - `updateArrayData(arr)`: replace the displayed array with a copy of `arr` and pause
//! - `log(...args)` / `console.log(...args)`: append the arguments, space separated, to the log
//! - `delay(ms)`: suspend the script for `ms` milliseconds
//! - `Math.floor`, `Math.ceil`, `Math.abs`, `Math.min`, `Math.max`
//! - `arr.push(v)`, `arr.pop()` on script arrays; `arrayData.push(v)` writes through
//!   the wrapper like an index assignment at the end
//!
//! User functions shadow built-ins of the same name.

use crate::interpreter::constants::{DELAY, HIGHLIGHT_ELEMENT, LOG, UPDATE_ARRAY_DATA};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation};
use std::time::Duration;

const BUILTINS: [&str; 4] = [HIGHLIGHT_ELEMENT, UPDATE_ARRAY_DATA, LOG, DELAY];

impl Interpreter<'_> {
    pub(crate) fn is_builtin(name: &str) -> bool {
        BUILTINS.contains(&name)
    }

    /// Evaluate `callee(args)`
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &AstNode,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let AstNode::Member { object, name, .. } = callee {
            return self.evaluate_method_call(object, name, args, location);
        }

        let function = match callee {
            AstNode::Variable(name, _) => self.resolve_callable(name, location)?,
            other => match self.evaluate_expr(other)? {
                Value::Function(name) => name,
                value => {
                    return Err(RuntimeError::NotCallable {
                        name: self.format_value(&value),
                        location,
                    })
                }
            },
        };

        let args = self.evaluate_args(args)?;
        self.call_function(&function, args, location)
    }

    fn resolve_callable(&self, name: &str, location: SourceLocation) -> Result<String, RuntimeError> {
        match self.stack.lookup(name) {
            Some(binding) => match &binding.value {
                Value::Function(target) => Ok(target.clone()),
                _ => Err(RuntimeError::NotCallable {
                    name: name.to_string(),
                    location,
                }),
            },
            None if self.lookup_function(name).is_some() || Self::is_builtin(name) => {
                Ok(name.to_string())
            }
            None => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }),
        }
    }

    fn evaluate_args(&mut self, args: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg)?);
        }
        Ok(values)
    }

    fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Some(function) = self.lookup_function(name).cloned() {
            return self.call_user_function(function, args, location);
        }

        match name {
            HIGHLIGHT_ELEMENT => self.builtin_highlight(&args, location),
            UPDATE_ARRAY_DATA => self.builtin_update(&args, location),
            LOG => self.builtin_log(&args),
            DELAY => self.builtin_delay(&args, location),
            _ => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }),
        }
    }

    fn evaluate_method_call(
        &mut self,
        object: &AstNode,
        method: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // Namespaces are not values in the script language
        if let AstNode::Variable(namespace, _) = object {
            if self.stack.lookup(namespace).is_none() {
                match namespace.as_str() {
                    "console" if method == "log" => {
                        let args = self.evaluate_args(args)?;
                        return self.builtin_log(&args);
                    }
                    "Math" => {
                        let args = self.evaluate_args(args)?;
                        return self.builtin_math(method, &args, location);
                    }
                    _ => {}
                }
            }
        }

        let receiver = self.evaluate_expr(object)?;
        let args = self.evaluate_args(args)?;

        match (&receiver, method) {
            (Value::Array(r), "push") => {
                let mut len = 0;
                for arg in args {
                    len = self
                        .heap
                        .push(*r, arg)
                        .map_err(|message| RuntimeError::InvalidMemoryOperation { message, location })?;
                }
                if len == 0 {
                    len = self.heap.len(*r).unwrap_or_default();
                }
                Ok(Value::Number(len as f64))
            }
            (Value::Array(r), "pop") => self
                .heap
                .pop(*r)
                .map_err(|message| RuntimeError::InvalidMemoryOperation { message, location }),
            (Value::Observed, "push") => {
                for arg in args {
                    let index = Value::Number(self.observed.len() as f64);
                    self.write_element(&Value::Observed, &index, arg, location)?;
                }
                Ok(Value::Number(self.observed.len() as f64))
            }
            _ => Err(RuntimeError::NotCallable {
                name: format!("{}.{}", self.format_value(&receiver), method),
                location,
            }),
        }
    }

    fn expect_args(
        function: &str,
        args: &[Value],
        expected: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if args.len() < expected {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: function.to_string(),
                expected,
                got: args.len(),
                location,
            });
        }
        Ok(())
    }

    /// `highlightElement(i)`
    fn builtin_highlight(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        Self::expect_args(HIGHLIGHT_ELEMENT, args, 1, location)?;
        let index = args[0].as_index().ok_or_else(|| RuntimeError::TypeError {
            message: format!(
                "{} expects a non-negative integer index, got {}",
                HIGHLIGHT_ELEMENT,
                self.format_value(&args[0])
            ),
            location,
        })?;
        self.visualizer.highlight(index);
        Ok(Value::Undefined)
    }

    /// `updateArrayData(arr)`
    fn builtin_update(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        Self::expect_args(UPDATE_ARRAY_DATA, args, 1, location)?;
        let values = match &args[0] {
            Value::Observed => self.observed.values().to_vec(),
            Value::Array(r) => self
                .heap
                .numbers(*r)
                .map_err(|message| RuntimeError::TypeError {
                    message: format!("{} expects an array of numbers: {}", UPDATE_ARRAY_DATA, message),
                    location,
                })?,
            other => {
                return Err(RuntimeError::TypeError {
                    message: format!(
                        "{} expects an array, got {}",
                        UPDATE_ARRAY_DATA,
                        other.type_name()
                    ),
                    location,
                })
            }
        };
        self.visualizer.update(&values);
        Ok(Value::Undefined)
    }

    /// `log(...args)`
    fn builtin_log(&mut self, args: &[Value]) -> Result<Value, RuntimeError> {
        let parts: Vec<String> = args.iter().map(|arg| self.format_value(arg)).collect();
        self.visualizer.log(parts.join(" "));
        Ok(Value::Undefined)
    }

    /// `delay(ms)`; negative or non-numeric durations do not pause
    fn builtin_delay(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        Self::expect_args(DELAY, args, 1, location)?;
        let ms = args[0].to_number();
        let duration = if ms.is_finite() && ms > 0.0 {
            Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self.visualizer.pause(duration);
        Ok(Value::Undefined)
    }

    fn builtin_math(
        &self,
        method: &str,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let numbers: Vec<f64> = args.iter().map(Value::to_number).collect();
        let unary = |f: fn(f64) -> f64| -> Result<Value, RuntimeError> {
            Self::expect_args(&format!("Math.{}", method), args, 1, location)?;
            Ok(Value::Number(f(numbers[0])))
        };

        match method {
            "floor" => unary(f64::floor),
            "ceil" => unary(f64::ceil),
            "abs" => unary(f64::abs),
            "min" => Ok(Value::Number(numbers.iter().copied().fold(f64::INFINITY, |acc, n| {
                if n.is_nan() || acc.is_nan() {
                    f64::NAN
                } else {
                    acc.min(n)
                }
            }))),
            "max" => Ok(Value::Number(numbers.iter().copied().fold(
                f64::NEG_INFINITY,
                |acc, n| {
                    if n.is_nan() || acc.is_nan() {
                        f64::NAN
                    } else {
                        acc.max(n)
                    }
                },
            ))),
            _ => Err(RuntimeError::UndefinedFunction {
                name: format!("Math.{}", method),
                location,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parser::Parser;
    use crate::snapshot::FrameKind;
    use crate::visual::observed::{InterceptPolicy, ObservedArray};
    use crate::visual::Visualizer;
    use std::time::Duration;

    fn run_on(source: &str, array: &[f64]) -> (Result<(), RuntimeError>, Visualizer, Vec<f64>) {
        let config = Config::default();
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut viz = Visualizer::new(config.pause());
        viz.replace_array(array.to_vec());
        viz.reset();
        let observed = ObservedArray::new(array.to_vec(), InterceptPolicy::Serialized);
        let (result, wrapper) = {
            let mut interpreter = Interpreter::new(program, &mut viz, observed, &config).unwrap();
            let result = interpreter.run();
            (result, interpreter.observed().values().to_vec())
        };
        (result, viz, wrapper)
    }

    #[test]
    fn test_highlight_and_update_capabilities() {
        let source = "
            const list = [2, 1];
            await highlightElement(0);
            list[0] = 1; list[1] = 2;
            await updateArrayData(list);
        ";
        let (result, viz, _) = run_on(source, &[2.0, 1.0]);
        result.unwrap();

        assert_eq!(viz.state().array, vec![1.0, 2.0]);
        assert_eq!(viz.state().log, vec!["Highlighting element at index 0: 2"]);
        assert_eq!(viz.now(), Duration::from_millis(1000));
    }

    #[test]
    fn test_wrapper_write_goes_through_update() {
        let source = "arrayData[1] = 7; log(arrayData.length, dynamicArray[1]);";
        let (result, viz, wrapper) = run_on(source, &[3.0, 4.0]);
        result.unwrap();

        assert_eq!(wrapper, vec![3.0, 7.0]);
        assert_eq!(viz.state().array, vec![3.0, 7.0]);
        assert_eq!(
            viz.state().log,
            vec!["Highlighting element at index 1: 7", "2 7"]
        );
    }

    #[test]
    fn test_log_formats_values() {
        let source = "log('sum', 1 + 2, [1, 'a'], 0.5, null, undefined, true);";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        assert_eq!(viz.state().log, vec!["sum 3 [1,\"a\"] 0.5 null undefined true"]);
    }

    #[test]
    fn test_delay_advances_clock() {
        let (result, viz, _) = run_on("await delay(250); await delay(-5);", &[]);
        result.unwrap();
        assert_eq!(viz.now(), Duration::from_millis(250));
        // pauses alone record no frames
        assert_eq!(viz.timeline().len(), 1);
        assert_eq!(viz.timeline().frames()[0].kind, FrameKind::Reset);
    }

    #[test]
    fn test_math_console_and_array_methods() {
        let source = "
            const xs = [];
            xs.push(3, 4);
            const last = xs.pop();
            console.log(Math.floor(7 / 2), Math.max(1, last, 2), Math.min(), xs.length);
        ";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        assert_eq!(viz.state().log, vec!["3 4 Infinity 1"]);
    }

    #[test]
    fn test_capability_errors() {
        let (result, _, _) = run_on("highlightElement();", &[1.0]);
        assert!(matches!(result, Err(RuntimeError::ArgumentCountMismatch { .. })));

        let (result, _, _) = run_on("updateArrayData(['x']);", &[1.0]);
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));

        let (result, _, _) = run_on("missing();", &[1.0]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Undefined function 'missing' at line 1"
        );

        let (result, _, _) = run_on("arrayData[5] = 1;", &[1.0]);
        assert!(matches!(result, Err(RuntimeError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_user_function_shadows_builtin() {
        let source = "
            let calls = 0;
            function delay(ms) { calls++; }
            await delay(1000);
            log(calls);
        ";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        assert_eq!(viz.now(), Duration::ZERO);
        assert_eq!(viz.state().log, vec!["1"]);
    }

    #[test]
    fn test_log_self_containing_array_prints_circular() {
        let source = "
            const b = [0, 1];
            b[0] = b;
            log(b);
            log('' + b);
        ";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        assert_eq!(viz.state().log, vec!["[[Circular],1]", "[[Circular],1]"]);
    }

    #[test]
    fn test_log_shared_array_twice_is_not_circular() {
        let (result, viz, _) = run_on("const a = [1]; log([a, a]);", &[]);
        result.unwrap();
        assert_eq!(viz.state().log, vec!["[[1],[1]]"]);
    }

    #[test]
    fn test_log_deeply_nested_array_collapses() {
        let source = "
            let a = [1];
            for (let i = 0; i < 1000; i++) { a = [a]; }
            log(a);
        ";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        let line = &viz.state().log[0];
        assert!(line.starts_with("[[[["));
        assert!(line.contains("[Array]"));
    }

    #[test]
    fn test_nested_function_is_scoped_to_its_call() {
        let source = "
            function g() { return 1; }
            function f() {
                function g() { return 2; }
                return g();
            }
            log(f());
            log(g());
        ";
        let (result, viz, _) = run_on(source, &[]);
        result.unwrap();
        assert_eq!(viz.state().log, vec!["2", "1"]);
    }

    #[test]
    fn test_nested_function_can_recurse_and_is_gone_after_return() {
        let source = "
            function outer(n) {
                function count(k) { return k == 0 ? 0 : 1 + count(k - 1); }
                return count(n);
            }
            log(outer(3));
            count();
        ";
        let (result, viz, _) = run_on(source, &[]);
        assert_eq!(viz.state().log, vec!["3"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Undefined function 'count' at line 7"
        );
    }

    #[test]
    fn test_unbounded_recursion_hits_call_depth() {
        let source = "function f(n) { return f(n + 1); }\nf(0);";
        let (result, _, _) = run_on(source, &[]);
        assert!(matches!(
            result,
            Err(RuntimeError::CallDepthExceeded { limit: 48, .. })
        ));
    }
}
