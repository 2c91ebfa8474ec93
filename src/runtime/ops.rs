//! Operator semantics shared by the front-ends
//!
//! Arithmetic, comparison, equality and condition checks over tagged
//! [`Value`]s. Each function returns the error kind a language should raise;
//! the executor attaches the location.

use super::errors::RuntimeErrorKind;
use super::value::Value;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Remainder => "%",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Subtract => a - b,
            ArithmeticOp::Multiply => a * b,
            ArithmeticOp::Divide => a / b,
            ArithmeticOp::Remainder => a % b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> bool {
        match self {
            ComparisonOp::Less => a < b,
            ComparisonOp::LessEqual => a <= b,
            ComparisonOp::Greater => a > b,
            ComparisonOp::GreaterEqual => a >= b,
        }
    }
}

/// Numeric value under coercion: booleans become 0/1, none becomes 0,
/// strings are parsed (NaN if they do not parse).
pub fn coerce_to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::None => 0.0,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::List(_) | Value::Dict(_) => f64::NAN,
    }
}

/// Binary arithmetic honouring `allow_type_coercion`.
///
/// With coercion disabled `+` accepts two numbers or two strings and the
/// other operators accept only numbers, naming the first offending side.
pub fn arithmetic(
    op: ArithmeticOp,
    left: &Value,
    right: &Value,
    allow_coercion: bool,
) -> Result<Value, RuntimeErrorKind> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => return Ok(Value::Number(op.apply(*a, *b))),
        (Value::String(a), Value::String(b)) if op == ArithmeticOp::Add => {
            return Ok(Value::String(format!("{}{}", a, b)))
        }
        _ => {}
    }

    if !allow_coercion {
        let operator = op.symbol().to_string();
        let left_type = left.type_name().to_string();
        let right_type = right.type_name().to_string();
        return Err(if op == ArithmeticOp::Add {
            RuntimeErrorKind::TypeCoercionNotAllowed {
                operator,
                left: Some(left_type),
                right: Some(right_type),
            }
        } else if left.as_number().is_none() {
            RuntimeErrorKind::TypeCoercionNotAllowed {
                operator,
                left: Some(left_type),
                right: None,
            }
        } else {
            RuntimeErrorKind::TypeCoercionNotAllowed {
                operator,
                left: None,
                right: Some(right_type),
            }
        });
    }

    if op == ArithmeticOp::Add && (left.as_str().is_some() || right.as_str().is_some()) {
        return Ok(Value::String(format!(
            "{}{}",
            left.to_output_string(),
            right.to_output_string()
        )));
    }
    Ok(Value::Number(op.apply(
        coerce_to_number(left),
        coerce_to_number(right),
    )))
}

/// `< <= > >=`; both sides must be numbers.
pub fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Result<bool, RuntimeErrorKind> {
    let a = left
        .as_number()
        .ok_or_else(|| comparison_error(op, "left", left))?;
    let b = right
        .as_number()
        .ok_or_else(|| comparison_error(op, "right", right))?;
    Ok(op.apply(a, b))
}

fn comparison_error(op: ComparisonOp, side: &'static str, value: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::ComparisonRequiresNumber {
        operator: op.symbol().to_string(),
        side,
        type_name: value.type_name().to_string(),
    }
}

/// Operand of a JikiScript arithmetic or comparison operator.
pub fn number_operand(value: &Value) -> Result<f64, RuntimeErrorKind> {
    value.as_number().ok_or_else(|| RuntimeErrorKind::OperandMustBeNumber {
        value: value.to_string(),
    })
}

/// Round to five decimal places so `0.1 + 0.2` reads as `0.3`.
pub fn round_decimal(n: f64) -> f64 {
    const DP_MULTIPLE: f64 = 100_000.0;
    (n * DP_MULTIPLE).round() / DP_MULTIPLE
}

/// Value of a condition or logical operand under `allow_truthiness`.
pub fn condition(value: &Value, allow_truthiness: bool) -> Result<bool, RuntimeErrorKind> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other if allow_truthiness => Ok(other.is_truthy()),
        other => Err(RuntimeErrorKind::TruthinessDisabled {
            type_name: other.type_name().to_string(),
        }),
    }
}

/// Same type and same value; lists and dictionaries compare by identity.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::None, Value::None) => true,
        (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
        (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// `==` with numeric conversion of strings and booleans.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::None, _) | (_, Value::None) => false,
        (Value::List(_) | Value::Dict(_), _) | (_, Value::List(_) | Value::Dict(_)) => {
            strict_equals(left, right)
        }
        (Value::String(a), Value::String(b)) => a == b,
        _ => coerce_to_number(left) == coerce_to_number(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_without_coercion_names_both_sides() {
        let err = arithmetic(
            ArithmeticOp::Add,
            &Value::Number(5.0),
            &Value::Boolean(true),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeCoercionNotAllowed: operator: +: left: number: right: boolean"
        );
    }

    #[test]
    fn other_operators_name_first_offending_side() {
        let err = arithmetic(
            ArithmeticOp::Multiply,
            &Value::Number(5.0),
            &Value::Boolean(true),
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "TypeCoercionNotAllowed: operator: *: right: boolean");
    }

    #[test]
    fn coercion_enabled_follows_host_rules() {
        let sum = arithmetic(ArithmeticOp::Add, &Value::Number(5.0), &Value::Boolean(true), true);
        assert_eq!(sum.unwrap().as_number(), Some(6.0));

        let text = arithmetic(ArithmeticOp::Add, &Value::from("a"), &Value::Number(1.0), true);
        assert_eq!(text.unwrap().as_str(), Some("a1"));

        let product = arithmetic(ArithmeticOp::Multiply, &Value::from("3"), &Value::Number(2.0), true);
        assert_eq!(product.unwrap().as_number(), Some(6.0));

        let nan = arithmetic(ArithmeticOp::Subtract, &Value::from("x"), &Value::Number(1.0), true);
        assert!(nan.unwrap().as_number().is_some_and(f64::is_nan));
    }

    #[test]
    fn comparison_requires_numbers() {
        let err = compare(ComparisonOp::Less, &Value::Number(1.0), &Value::from("2")).unwrap_err();
        assert_eq!(err.to_string(), "ComparisonRequiresNumber: operator: <: right: string");
    }

    #[test]
    fn truthiness_gate() {
        assert_eq!(
            condition(&Value::Number(1.0), false),
            Err(RuntimeErrorKind::TruthinessDisabled {
                type_name: "number".into()
            })
        );
        assert_eq!(condition(&Value::Number(1.0), true), Ok(true));
    }

    #[test]
    fn loose_equality_converts() {
        assert!(loose_equals(&Value::from("1"), &Value::Number(1.0)));
        assert!(loose_equals(&Value::Boolean(true), &Value::Number(1.0)));
        assert!(!strict_equals(&Value::from("1"), &Value::Number(1.0)));
    }

    #[test]
    fn decimals_are_rounded() {
        assert_eq!(round_decimal(0.1 + 0.2), 0.3);
    }
}
