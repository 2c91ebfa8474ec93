//! Expression evaluation for the JavaScript subset

use super::Executor;
use crate::javascript::ast::{
    AssignOp, BinaryOp, Expression, Literal, LogicalOp, UnaryOp, UpdateOp,
};
use crate::runtime::ops::{self, ArithmeticOp, ComparisonOp};
use crate::runtime::{RuntimeError, RuntimeErrorKind, Value};
use crate::syntax::SourceLocation;

impl<'a> Executor<'a> {
    pub(crate) fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        let location = expression.location();
        match expression {
            Expression::Literal { value, .. } => Ok(match value {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null | Literal::Undefined => Value::None,
            }),

            Expression::Identifier { name, .. } => {
                self.env.get(name).map_err(|kind| kind.at(location))
            }

            Expression::Array { elements, .. } => {
                let items = self.evaluate_arguments(elements)?;
                Ok(Value::list(items))
            }

            Expression::Object { properties, .. } => {
                let mut entries: Vec<(String, Value)> = Vec::with_capacity(properties.len());
                for (key, value) in properties {
                    let value = self.evaluate(value)?;
                    match entries.iter_mut().find(|entry| entry.0 == *key) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key.clone(), value)),
                    }
                }
                Ok(Value::dict(entries))
            }

            Expression::Unary { op, operand, .. } => {
                let value = self.evaluate(operand)?;
                self.unary(*op, &value).map_err(|kind| kind.at(location))
            }

            Expression::Binary {
                left, op, right, ..
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(*op, &left, &right)
                    .map_err(|kind| kind.at(location))
            }

            Expression::Logical {
                left, op, right, ..
            } => {
                let allow_truthiness = self.ctx.features().allow_truthiness;
                let left = self.evaluate(left)?;
                let truth = ops::condition(&left, allow_truthiness).map_err(|kind| kind.at(location))?;
                let short_circuit = match op {
                    LogicalOp::And => !truth,
                    LogicalOp::Or => truth,
                };
                if short_circuit {
                    return Ok(left);
                }
                let right = self.evaluate(right)?;
                ops::condition(&right, allow_truthiness).map_err(|kind| kind.at(location))?;
                Ok(right)
            }

            Expression::Conditional {
                test,
                consequent,
                alternate,
                ..
            } => {
                let value = self.evaluate(test)?;
                let truth = ops::condition(&value, self.ctx.features().allow_truthiness)
                    .map_err(|kind| kind.at(location))?;
                if truth {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }

            Expression::Assignment { .. } | Expression::Update { .. } => {
                self.evaluate_store(expression).map(|(value, _, _)| value)
            }

            Expression::Call { callee, args, .. } => {
                let args = self.evaluate_arguments(args)?;
                if callee.callee_name().as_deref() == Some("console.log") {
                    let output = args
                        .iter()
                        .map(Value::to_output_string)
                        .collect::<Vec<_>>()
                        .join(" ");
                    self.ctx.log(output);
                    return Ok(Value::None);
                }
                self.call_callee(callee, args, location)
            }

            Expression::Member {
                object, property, ..
            } => {
                let object = self.evaluate(object)?;
                get_property(&object, property).map_err(|kind| kind.at(location))
            }

            Expression::Index { object, index, .. } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                get_index(&object, &index).map_err(|kind| kind.at(location))
            }

            Expression::Grouping { inner, .. } => self.evaluate(inner),
        }
    }

    pub(crate) fn evaluate_arguments(&mut self, args: &[Expression]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    /// Calls go through their name: `f(…)` or a dotted external such as
    /// `canvas.draw(…)`.
    pub(crate) fn call_callee(
        &mut self,
        callee: &Expression,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match callee.callee_name() {
            Some(name) => self.call_function(&name, args, location),
            None => Err(RuntimeErrorKind::FunctionNotFound {
                name: "(anonymous)".to_string(),
            }
            .at(location)),
        }
    }

    /// Evaluate an assignment or update. Returns the expression's value and
    /// the value now stored in the target (they differ for postfix `x++`).
    /// Evaluate an assignment or update, returning the expression's value,
    /// the stored value and the name of the target written to.
    pub(crate) fn evaluate_store(
        &mut self,
        expression: &Expression,
    ) -> Result<(Value, Value, String), RuntimeError> {
        let location = expression.location();
        match expression {
            Expression::Assignment {
                target, op, value, ..
            } => {
                let value = self.evaluate(value)?;
                let stored = match arithmetic_for(*op) {
                    None => value,
                    Some(op) => {
                        let current = self.evaluate(target)?;
                        self.arithmetic(op, &current, &value)
                            .map_err(|kind| kind.at(location))?
                    }
                };
                let name = self.store(target, stored.clone())?;
                Ok((stored.clone(), stored, name))
            }
            Expression::Update {
                target, op, prefix, ..
            } => {
                let current = self.evaluate(target)?;
                let op = match op {
                    UpdateOp::Increment => ArithmeticOp::Add,
                    UpdateOp::Decrement => ArithmeticOp::Subtract,
                };
                let stored = self
                    .arithmetic(op, &current, &Value::Number(1.0))
                    .map_err(|kind| kind.at(location))?;
                let name = self.store(target, stored.clone())?;
                let value = if *prefix { stored.clone() } else { current };
                Ok((value, stored, name))
            }
            other => {
                let value = self.evaluate(other)?;
                let name = other.callee_name().unwrap_or_default();
                Ok((value.clone(), value, name))
            }
        }
    }

    fn store(&mut self, target: &Expression, value: Value) -> Result<String, RuntimeError> {
        let location = target.location();
        match target {
            Expression::Identifier { name, .. } => {
                self.env.assign(name, value).map_err(|kind| kind.at(location))?;
                Ok(name.clone())
            }
            Expression::Member {
                object: object_expr,
                property,
                ..
            } => {
                let object = self.evaluate(object_expr)?;
                set_key(&object, property, value).map_err(|kind| kind.at(location))?;
                Ok(format!("{}.{}", object_expr.callee_name().unwrap_or_default(), property))
            }
            Expression::Index {
                object: object_expr,
                index,
                ..
            } => {
                let object = self.evaluate(object_expr)?;
                let index = self.evaluate(index)?;
                set_index(&object, &index, value).map_err(|kind| kind.at(location))?;
                Ok(format!("{}[{}]", object_expr.callee_name().unwrap_or_default(), index))
            }
            _ => Err(RuntimeErrorKind::TargetNotModifiable.at(location)),
        }
    }

    fn arithmetic(&self, op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
        ops::arithmetic(op, left, right, self.ctx.features().allow_type_coercion)
    }

    fn unary(&self, op: UnaryOp, value: &Value) -> Result<Value, RuntimeErrorKind> {
        let features = self.ctx.features();
        match op {
            UnaryOp::Not => {
                ops::condition(value, features.allow_truthiness).map(|b| Value::Boolean(!b))
            }
            UnaryOp::Negate | UnaryOp::Plus => {
                let n = match value {
                    Value::Number(n) => *n,
                    other if features.allow_type_coercion => ops::coerce_to_number(other),
                    other => {
                        return Err(RuntimeErrorKind::TypeCoercionNotAllowed {
                            operator: if op == UnaryOp::Negate { "-" } else { "+" }.to_string(),
                            left: None,
                            right: Some(other.type_name().to_string()),
                        })
                    }
                };
                Ok(Value::Number(if op == UnaryOp::Negate { -n } else { n }))
            }
        }
    }

    fn binary(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
        let strict_equality = self.ctx.features().enforce_strict_equality;
        let compare = |op| ops::compare(op, left, right).map(Value::Boolean);
        match op {
            BinaryOp::Add => self.arithmetic(ArithmeticOp::Add, left, right),
            BinaryOp::Subtract => self.arithmetic(ArithmeticOp::Subtract, left, right),
            BinaryOp::Multiply => self.arithmetic(ArithmeticOp::Multiply, left, right),
            BinaryOp::Divide => self.arithmetic(ArithmeticOp::Divide, left, right),
            BinaryOp::Remainder => self.arithmetic(ArithmeticOp::Remainder, left, right),
            BinaryOp::Less => compare(ComparisonOp::Less),
            BinaryOp::LessEqual => compare(ComparisonOp::LessEqual),
            BinaryOp::Greater => compare(ComparisonOp::Greater),
            BinaryOp::GreaterEqual => compare(ComparisonOp::GreaterEqual),
            BinaryOp::StrictEqual => Ok(Value::Boolean(ops::strict_equals(left, right))),
            BinaryOp::StrictNotEqual => Ok(Value::Boolean(!ops::strict_equals(left, right))),
            BinaryOp::LooseEqual | BinaryOp::LooseNotEqual if strict_equality => {
                Err(RuntimeErrorKind::StrictEqualityRequired {
                    operator: if op == BinaryOp::LooseEqual { "==" } else { "!=" }.to_string(),
                })
            }
            BinaryOp::LooseEqual => Ok(Value::Boolean(ops::loose_equals(left, right))),
            BinaryOp::LooseNotEqual => Ok(Value::Boolean(!ops::loose_equals(left, right))),
        }
    }
}

fn arithmetic_for(op: AssignOp) -> Option<ArithmeticOp> {
    match op {
        AssignOp::Assign => None,
        AssignOp::Add => Some(ArithmeticOp::Add),
        AssignOp::Subtract => Some(ArithmeticOp::Subtract),
        AssignOp::Multiply => Some(ArithmeticOp::Multiply),
        AssignOp::Divide => Some(ArithmeticOp::Divide),
    }
}

fn get_property(object: &Value, property: &str) -> Result<Value, RuntimeErrorKind> {
    match (object, property) {
        (Value::List(items), "length") => Ok(Value::Number(items.borrow().len() as f64)),
        (Value::String(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
        (Value::Dict(entries), key) => entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeErrorKind::PropertyNotFound {
                property: key.to_string(),
            }),
        (_, property) => Err(RuntimeErrorKind::PropertyNotFound {
            property: property.to_string(),
        }),
    }
}

/// Zero-based position for an array or string index.
fn position(index: &Value) -> Result<i64, RuntimeErrorKind> {
    let n = index
        .as_number()
        .ok_or_else(|| RuntimeErrorKind::IndexMustBeNumber {
            type_name: index.type_name().to_string(),
        })?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(RuntimeErrorKind::IndexMustBeInteger {
            index: index.to_string(),
        });
    }
    Ok(n as i64)
}

fn get_index(object: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let i = position(index)?;
            usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i).cloned())
                .ok_or(RuntimeErrorKind::IndexOutOfBoundsInGet {
                    index: i,
                    length: items.len(),
                    data_type: "list",
                })
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = position(index)?;
            usize::try_from(i)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::String(c.to_string()))
                .ok_or(RuntimeErrorKind::IndexOutOfBoundsInGet {
                    index: i,
                    length: chars.len(),
                    data_type: "string",
                })
        }
        Value::Dict(_) => get_property(object, &index.to_output_string()),
        other => Err(RuntimeErrorKind::CannotIndex {
            type_name: other.type_name().to_string(),
        }),
    }
}

/// Arrays may grow by one when writing just past the end.
fn set_index(object: &Value, index: &Value, value: Value) -> Result<(), RuntimeErrorKind> {
    match object {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let i = position(index)?;
            let length = items.len();
            match usize::try_from(i) {
                Ok(i) if i < length => items[i] = value,
                Ok(i) if i == length => items.push(value),
                _ => {
                    return Err(RuntimeErrorKind::IndexOutOfBoundsInChange {
                        index: i,
                        length,
                        data_type: "list",
                    })
                }
            }
            Ok(())
        }
        Value::Dict(_) => set_key(object, &index.to_output_string(), value),
        _ => Err(RuntimeErrorKind::TargetNotModifiable),
    }
}

fn set_key(object: &Value, key: &str, value: Value) -> Result<(), RuntimeErrorKind> {
    let Value::Dict(entries) = object else {
        return Err(RuntimeErrorKind::TargetNotModifiable);
    };
    let mut entries = entries.borrow_mut();
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key.to_string(), value)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_arrays_and_strings() {
        let list = Value::list(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(get_property(&list, "length").unwrap().as_number(), Some(2.0));
        assert_eq!(
            get_property(&Value::from("abc"), "length").unwrap().as_number(),
            Some(3.0)
        );
    }

    #[test]
    fn arrays_are_zero_based() {
        let list = Value::list(vec![Value::Number(7.0)]);
        assert_eq!(get_index(&list, &Value::Number(0.0)).unwrap().as_number(), Some(7.0));
        assert_eq!(
            get_index(&list, &Value::Number(1.0)).unwrap_err().to_string(),
            "IndexOutOfBoundsInGet: index: 1, length: 1, dataType: list"
        );
    }

    #[test]
    fn writing_past_the_end_appends_once() {
        let list = Value::list(vec![]);
        set_index(&list, &Value::Number(0.0), Value::Number(1.0)).unwrap();
        assert_eq!(list.to_string(), "[1]");
        assert!(set_index(&list, &Value::Number(5.0), Value::Number(1.0)).is_err());
    }

    #[test]
    fn object_keys_are_set_in_place() {
        let object = Value::dict(vec![("a".into(), Value::Number(1.0))]);
        set_key(&object, "a", Value::Number(2.0)).unwrap();
        set_key(&object, "b", Value::Number(3.0)).unwrap();
        assert_eq!(object.to_string(), "{\"a\": 2, \"b\": 3}");
    }
}
