//! Expression evaluation implementation
//!
//! This module handles evaluation of all expression types of the script language:
//!
//! - Literals (numbers, strings, booleans, `null`, `undefined`, array literals)
//! - Variables and identifiers
//! - Binary operators (arithmetic, comparison, short-circuit logical)
//! - Unary operators (negation, not, pre/post increment/decrement, `await`)
//! - Array subscripting and `.length`
//! - Assignment and compound assignment
//!
//! Index reads and writes on the wrapper array go through
//! [`ObservedArray`](crate::visual::observed::ObservedArray), which is where the
//! highlight and update visualizations happen. Calls live in the builtins module.
//!
//! Arithmetic follows IEEE doubles: division by zero yields `Infinity` or `NaN`
//! rather than an error.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::stack::AssignError;
use crate::memory::value::Value;
use crate::parser::ast::*;

/// A resolved assignment target; container and index are evaluated exactly once
pub(crate) enum Place {
    Name(String),
    Element { container: Value, index: Value },
}

impl Interpreter<'_> {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        self.descend(expr.location())?;
        let result = self.evaluate_node(expr);
        self.ascend();
        result
    }

    fn evaluate_node(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        let location = expr.location();

        match expr {
            AstNode::NumberLiteral(n, _) => Ok(Value::Number(*n)),

            AstNode::StringLiteral(s, _) => Ok(Value::Str(s.clone())),

            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),

            AstNode::Null { .. } => Ok(Value::Null),

            AstNode::Undefined { .. } => Ok(Value::Undefined),

            AstNode::ArrayLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate_expr(element)?);
                }
                Ok(Value::Array(self.heap.allocate(values)))
            }

            AstNode::Variable(name, _) => self.resolve_variable(name, location),

            AstNode::Assignment { target, rhs, .. } => {
                let place = self.resolve_place(target)?;
                let value = self.evaluate_expr(rhs)?;
                self.write_place(&place, value.clone(), location)?;
                Ok(value)
            }

            AstNode::CompoundAssignment {
                target, op, rhs, ..
            } => {
                let place = self.resolve_place(target)?;
                let current = self.read_place(&place, location)?;
                let rhs = self.evaluate_expr(rhs)?;
                let value = self.apply_binary(*op, current, rhs);
                self.write_place(&place, value.clone(), location)?;
                Ok(value)
            }

            AstNode::BinaryOp {
                op, left, right, ..
            } => match op {
                BinOp::And => {
                    let left = self.evaluate_expr(left)?;
                    if left.is_truthy() {
                        self.evaluate_expr(right)
                    } else {
                        Ok(left)
                    }
                }
                BinOp::Or => {
                    let left = self.evaluate_expr(left)?;
                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        self.evaluate_expr(right)
                    }
                }
                _ => {
                    let left = self.evaluate_expr(left)?;
                    let right = self.evaluate_expr(right)?;
                    Ok(self.apply_binary(*op, left, right))
                }
            },

            AstNode::UnaryOp { op, operand, .. } => self.evaluate_unary_op(*op, operand, location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.evaluate_expr(true_expr)
                } else {
                    self.evaluate_expr(false_expr)
                }
            }

            AstNode::Index { object, index, .. } => {
                let container = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                self.read_element(&container, &index, location)
            }

            AstNode::Member { object, name, .. } => {
                let object = self.evaluate_expr(object)?;
                self.read_member(&object, name, location)
            }

            AstNode::Call { callee, args, .. } => self.evaluate_call(callee, args, location),

            other => Err(RuntimeError::UnsupportedOperation {
                message: "statement used as an expression".to_string(),
                location: other.location(),
            }),
        }
    }

    fn resolve_variable(&self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        if let Some(binding) = self.stack.lookup(name) {
            return Ok(binding.value.clone());
        }
        if self.lookup_function(name).is_some() || Self::is_builtin(name) {
            return Ok(Value::Function(name.to_string()));
        }
        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            location,
        })
    }

    fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Neg => Ok(Value::Number(-self.evaluate_expr(operand)?.to_number())),
            UnOp::Plus => Ok(Value::Number(self.evaluate_expr(operand)?.to_number())),
            UnOp::Not => Ok(Value::Bool(!self.evaluate_expr(operand)?.is_truthy())),
            // Suspension happens inside the awaited capability itself
            UnOp::Await => self.evaluate_expr(operand),
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                let place = self.resolve_place(operand)?;
                let old = self.read_place(&place, location)?.to_number();
                let new = if matches!(op, UnOp::PreInc | UnOp::PostInc) {
                    old + 1.0
                } else {
                    old - 1.0
                };
                self.write_place(&place, Value::Number(new), location)?;
                if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                    Ok(Value::Number(new))
                } else {
                    Ok(Value::Number(old))
                }
            }
        }
    }

    /// Apply a non-short-circuit binary operator
    pub(crate) fn apply_binary(&self, op: BinOp, left: Value, right: Value) -> Value {
        match op {
            BinOp::Add => match (&left, &right) {
                (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!(
                    "{}{}",
                    self.format_value(&left),
                    self.format_value(&right)
                )),
                _ => Value::Number(left.to_number() + right.to_number()),
            },
            BinOp::Sub => Value::Number(left.to_number() - right.to_number()),
            BinOp::Mul => Value::Number(left.to_number() * right.to_number()),
            BinOp::Div => Value::Number(left.to_number() / right.to_number()),
            BinOp::Mod => Value::Number(left.to_number() % right.to_number()),
            BinOp::StrictEq => Value::Bool(strict_equals(&left, &right)),
            BinOp::StrictNe => Value::Bool(!strict_equals(&left, &right)),
            BinOp::Eq => Value::Bool(loose_equals(&left, &right)),
            BinOp::Ne => Value::Bool(!loose_equals(&left, &right)),
            BinOp::Lt => Value::Bool(compare(&left, &right, |o| o.is_lt())),
            BinOp::Le => Value::Bool(compare(&left, &right, |o| o.is_le())),
            BinOp::Gt => Value::Bool(compare(&left, &right, |o| o.is_gt())),
            BinOp::Ge => Value::Bool(compare(&left, &right, |o| o.is_ge())),
            BinOp::And => {
                if left.is_truthy() {
                    right
                } else {
                    left
                }
            }
            BinOp::Or => {
                if left.is_truthy() {
                    left
                } else {
                    right
                }
            }
        }
    }

    /// Evaluate the parts of an assignment target without reading it
    pub(crate) fn resolve_place(&mut self, target: &AstNode) -> Result<Place, RuntimeError> {
        match target {
            AstNode::Variable(name, _) => Ok(Place::Name(name.clone())),
            AstNode::Index { object, index, .. } => {
                let container = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                Ok(Place::Element { container, index })
            }
            other => Err(RuntimeError::UnsupportedOperation {
                message: "invalid assignment target".to_string(),
                location: other.location(),
            }),
        }
    }

    pub(crate) fn read_place(
        &mut self,
        place: &Place,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match place {
            Place::Name(name) => self.resolve_variable(name, location),
            Place::Element { container, index } => self.read_element(container, index, location),
        }
    }

    pub(crate) fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match place {
            Place::Name(name) => self.stack.assign(name, value).map_err(|err| match err {
                AssignError::Const => RuntimeError::ConstModification {
                    var: name.clone(),
                    location,
                },
                AssignError::Undeclared => RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    location,
                },
            }),
            Place::Element { container, index } => {
                self.write_element(container, index, value, location)
            }
        }
    }

    /// `container[index]`; reads on the wrapper highlight the element first
    pub(crate) fn read_element(
        &mut self,
        container: &Value,
        index: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match container {
            Value::Observed => {
                let i = Self::require_index(index, location)?;
                Ok(self
                    .observed
                    .get(i, self.visualizer)
                    .map_or(Value::Undefined, Value::Number))
            }
            Value::Array(r) => match index.as_index() {
                Some(i) => self
                    .heap
                    .read(*r, i)
                    .map_err(|message| RuntimeError::InvalidMemoryOperation { message, location }),
                None => Ok(Value::Undefined),
            },
            Value::Str(s) => Ok(index
                .as_index()
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::Str(c.to_string()))),
            Value::Null | Value::Undefined => Err(RuntimeError::TypeError {
                message: format!(
                    "Cannot read properties of {} (reading '{}')",
                    container.type_name(),
                    self.format_value(index)
                ),
                location,
            }),
            _ => Ok(Value::Undefined),
        }
    }

    /// `container[index] = value`; writes on the wrapper push the array to the display
    pub(crate) fn write_element(
        &mut self,
        container: &Value,
        index: &Value,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match container {
            Value::Observed => {
                let i = Self::require_index(index, location)?;
                let number = value.as_number().ok_or_else(|| RuntimeError::TypeError {
                    message: format!(
                        "only numbers can be stored in arrayData, got {}",
                        value.type_name()
                    ),
                    location,
                })?;
                self.observed
                    .set(i, number, self.visualizer)
                    .map_err(|message| RuntimeError::IndexOutOfRange { message, location })
            }
            Value::Array(r) => {
                let i = Self::require_index(index, location)?;
                self.heap
                    .write(*r, i, value)
                    .map_err(|message| RuntimeError::InvalidMemoryOperation { message, location })
            }
            other => Err(RuntimeError::TypeError {
                message: format!("Cannot set elements of {}", other.type_name()),
                location,
            }),
        }
    }

    fn read_member(
        &self,
        object: &Value,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (object, name) {
            (Value::Observed, "length") => Ok(Value::Number(self.observed.len() as f64)),
            (Value::Array(r), "length") => {
                let len = self
                    .heap
                    .len(*r)
                    .ok_or_else(|| RuntimeError::InvalidMemoryOperation {
                        message: format!("Invalid array reference #{}", r),
                        location,
                    })?;
                Ok(Value::Number(len as f64))
            }
            (Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
            (Value::Null | Value::Undefined, _) => Err(RuntimeError::TypeError {
                message: format!(
                    "Cannot read properties of {} (reading '{}')",
                    object.type_name(),
                    name
                ),
                location,
            }),
            (Value::Array(_) | Value::Observed, "push" | "pop") => {
                Err(RuntimeError::UnsupportedOperation {
                    message: format!("'{}' can only be called", name),
                    location,
                })
            }
            _ => Ok(Value::Undefined),
        }
    }

    fn require_index(index: &Value, location: SourceLocation) -> Result<usize, RuntimeError> {
        index.as_index().ok_or_else(|| RuntimeError::TypeError {
            message: format!(
                "array index must be a non-negative integer, got {}",
                index
            ),
            location,
        })
    }
}

/// `===`: same type and same value; arrays compare by identity
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => a == b,
        (Value::Observed, Value::Observed)
        | (Value::Null, Value::Null)
        | (Value::Undefined, Value::Undefined) => true,
        _ => false,
    }
}

/// `==`: `null` equals `undefined`, primitives of different types compare as numbers
pub(crate) fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,
        (Value::Number(_) | Value::Str(_) | Value::Bool(_), Value::Number(_) | Value::Bool(_))
        | (Value::Number(_) | Value::Bool(_), Value::Str(_)) => {
            if std::mem::discriminant(left) == std::mem::discriminant(right) {
                strict_equals(left, right)
            } else {
                left.to_number() == right.to_number()
            }
        }
        _ => strict_equals(left, right),
    }
}

/// Relational comparison; strings compare lexicographically, everything else numerically
fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => test(a.cmp(b)),
        _ => left
            .to_number()
            .partial_cmp(&right.to_number())
            .is_some_and(test),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_rules() {
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(!strict_equals(&Value::Null, &Value::Undefined));
        assert!(loose_equals(&Value::Str("3".to_string()), &Value::Number(3.0)));
        assert!(!strict_equals(&Value::Str("3".to_string()), &Value::Number(3.0)));
        assert!(!loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        assert!(loose_equals(&Value::Bool(true), &Value::Number(1.0)));
        assert!(!loose_equals(&Value::Array(0), &Value::Array(1)));
    }

    #[test]
    fn test_compare_strings_and_numbers() {
        let a = Value::Str("apple".to_string());
        let b = Value::Str("banana".to_string());
        assert!(compare(&a, &b, |o| o.is_lt()));
        assert!(compare(&Value::Number(2.0), &Value::Str("10".to_string()), |o| o.is_lt()));
        assert!(!compare(&Value::Number(f64::NAN), &Value::Number(1.0), |o| o.is_le()));
    }
}
