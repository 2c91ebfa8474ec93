//! Expression evaluation
//!
//! JikiScript never coerces: arithmetic and ordering need numbers on both
//! sides, conditions need booleans (unless truthiness is switched on) and
//! equality compares type and value.

use super::statements::list_position;
use super::Executor;
use crate::jikiscript::ast::{BinaryOp, Expression, Literal, LogicalOp, UnaryOp};
use crate::runtime::ops::{self, ArithmeticOp, ComparisonOp};
use crate::runtime::{RuntimeError, RuntimeErrorKind, Value};

impl<'a> Executor<'a> {
    pub(crate) fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        let location = expression.location();
        match expression {
            Expression::Literal { value, .. } => Ok(match value {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null => Value::None,
            }),

            Expression::Variable { name, .. } => {
                self.env.get(name).map_err(|kind| kind.at(location))
            }

            Expression::List { elements, .. } => {
                let items = self.evaluate_arguments(elements)?;
                Ok(Value::list(items))
            }

            Expression::Dictionary { entries, .. } => {
                let mut evaluated: Vec<(String, Value)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.evaluate(value)?;
                    match evaluated.iter_mut().find(|entry| entry.0 == *key) {
                        Some(entry) => entry.1 = value,
                        None => evaluated.push((key.clone(), value)),
                    }
                }
                Ok(Value::dict(evaluated))
            }

            Expression::Unary { op, operand, .. } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Negate => ops::number_operand(&value)
                        .map(|n| Value::Number(-n))
                        .map_err(|kind| kind.at(location)),
                    UnaryOp::Not => self
                        .truth(&value)
                        .map(|b| Value::Boolean(!b))
                        .map_err(|kind| kind.at(location)),
                }
            }

            Expression::Binary {
                left, op, right, ..
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, &left, &right).map_err(|kind| kind.at(location))
            }

            Expression::Logical {
                left, op, right, ..
            } => {
                let left = self.evaluate(left)?;
                let left = self.truth(&left).map_err(|kind| kind.at(location))?;
                let short_circuit = match op {
                    LogicalOp::And => !left,
                    LogicalOp::Or => left,
                };
                if short_circuit {
                    return Ok(Value::Boolean(left));
                }
                let right = self.evaluate(right)?;
                self.truth(&right)
                    .map(Value::Boolean)
                    .map_err(|kind| kind.at(location))
            }

            Expression::Grouping { inner, .. } => self.evaluate(inner),

            Expression::Call { callee, args, .. } => {
                let args = self.evaluate_arguments(args)?;
                self.call_function(callee, args, location)
            }

            Expression::Index { object, index, .. } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                get_element(&object, &index).map_err(|kind| kind.at(location))
            }
        }
    }

    pub(crate) fn evaluate_arguments(&mut self, args: &[Expression]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn truth(&self, value: &Value) -> Result<bool, RuntimeErrorKind> {
        ops::condition(value, self.ctx.features().allow_truthiness)
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
    let arithmetic = |op: ArithmeticOp| -> Result<Value, RuntimeErrorKind> {
        let a = ops::number_operand(left)?;
        let b = ops::number_operand(right)?;
        let result = op.apply(a, b);
        Ok(Value::Number(match op {
            ArithmeticOp::Remainder => result,
            _ => ops::round_decimal(result),
        }))
    };
    let comparison = |op: ComparisonOp| -> Result<Value, RuntimeErrorKind> {
        let a = ops::number_operand(left)?;
        let b = ops::number_operand(right)?;
        Ok(Value::Boolean(op.apply(a, b)))
    };

    match op {
        BinaryOp::Add => arithmetic(ArithmeticOp::Add),
        BinaryOp::Subtract => arithmetic(ArithmeticOp::Subtract),
        BinaryOp::Multiply => arithmetic(ArithmeticOp::Multiply),
        BinaryOp::Divide => arithmetic(ArithmeticOp::Divide),
        BinaryOp::Remainder => arithmetic(ArithmeticOp::Remainder),
        BinaryOp::Less => comparison(ComparisonOp::Less),
        BinaryOp::LessEqual => comparison(ComparisonOp::LessEqual),
        BinaryOp::Greater => comparison(ComparisonOp::Greater),
        BinaryOp::GreaterEqual => comparison(ComparisonOp::GreaterEqual),
        BinaryOp::Equal => equality(left, right).map(Value::Boolean),
        BinaryOp::NotEqual => equality(left, right).map(|b| Value::Boolean(!b)),
    }
}

fn equality(left: &Value, right: &Value) -> Result<bool, RuntimeErrorKind> {
    if let (Value::List(_), Value::List(_)) = (left, right) {
        return Err(RuntimeErrorKind::CannotCompareListObjects);
    }
    Ok(ops::strict_equals(left, right))
}

/// `object[index]`: 1-based for lists and strings, by key for dictionaries.
fn get_element(object: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let position = list_position(index, items.len(), |index, length| {
                RuntimeErrorKind::IndexOutOfBoundsInGet {
                    index,
                    length,
                    data_type: "list",
                }
            })?;
            Ok(items[position].clone())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let position = list_position(index, chars.len(), |index, length| {
                RuntimeErrorKind::IndexOutOfBoundsInGet {
                    index,
                    length,
                    data_type: "string",
                }
            })?;
            Ok(Value::String(chars[position].to_string()))
        }
        Value::Dict(entries) => {
            let key = index.to_output_string();
            entries
                .borrow()
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .ok_or(RuntimeErrorKind::KeyNotFound { key })
        }
        other => Err(RuntimeErrorKind::CannotIndex {
            type_name: other.type_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_rounds_to_five_places() {
        let sum = binary(BinaryOp::Add, &Value::Number(0.1), &Value::Number(0.2)).unwrap();
        assert_eq!(sum.as_number(), Some(0.3));
    }

    #[test]
    fn strings_do_not_concatenate() {
        let err = binary(BinaryOp::Add, &Value::from("a"), &Value::from("b")).unwrap_err();
        assert_eq!(err.to_string(), "OperandMustBeNumber: value: \"a\"");
    }

    #[test]
    fn lists_cannot_be_compared() {
        let a = Value::list(vec![]);
        let b = Value::list(vec![]);
        assert_eq!(
            binary(BinaryOp::Equal, &a, &b).unwrap_err(),
            RuntimeErrorKind::CannotCompareListObjects
        );
    }

    #[test]
    fn indexing_is_one_based() {
        let list = Value::list(vec![Value::Number(10.0), Value::Number(20.0)]);
        let first = get_element(&list, &Value::Number(1.0)).unwrap();
        assert_eq!(first.as_number(), Some(10.0));

        assert_eq!(
            get_element(&list, &Value::Number(0.0)).unwrap_err(),
            RuntimeErrorKind::IndexIsOneBased
        );
        assert_eq!(
            get_element(&list, &Value::Number(3.0)).unwrap_err().to_string(),
            "IndexOutOfBoundsInGet: index: 3, length: 2, dataType: list"
        );
    }

    #[test]
    fn string_indexing_returns_characters() {
        let word = Value::from("jiki");
        let third = get_element(&word, &Value::Number(3.0)).unwrap();
        assert_eq!(third.as_str(), Some("k"));
    }
}
