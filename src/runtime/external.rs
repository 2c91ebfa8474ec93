//! External function bridge
//!
//! Host capabilities (movement, drawing, measuring…) are exposed to learner
//! code as [`ExternalFunction`]s. The bridge checks arity before calling,
//! translates the two failure channels into runtime errors, and wraps the
//! host's JSON return value into a runtime [`Value`].

use super::context::ExecutionContext;
use super::errors::RuntimeErrorKind;
use super::value::Value;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// An expected, learner-facing failure raised through
/// [`ExecutionContext::logic_error`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct LogicError(pub String);

/// Number of arguments an external function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "between {} and {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

type HostFn = dyn Fn(&mut ExecutionContext, &[Value]) -> anyhow::Result<serde_json::Value>;

/// A host-provided capability callable from interpreted code.
#[derive(Clone)]
pub struct ExternalFunction {
    pub name: String,
    pub arity: Arity,
    pub description: String,
    func: Rc<HostFn>,
}

impl fmt::Debug for ExternalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl ExternalFunction {
    pub fn new<F>(name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&mut ExecutionContext, &[Value]) -> anyhow::Result<serde_json::Value> + 'static,
    {
        ExternalFunction {
            name: name.into(),
            arity,
            description: String::new(),
            func: Rc::new(func),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check arity, run the host function and wrap its result.
    ///
    /// A [`LogicError`] surfaces as `LogicErrorInExecution` with its message
    /// untouched; any other error becomes `FunctionExecutionError`.
    pub fn invoke(&self, ctx: &mut ExecutionContext, args: &[Value]) -> Result<Value, RuntimeErrorKind> {
        if !self.arity.accepts(args.len()) {
            return Err(RuntimeErrorKind::InvalidNumberOfArguments {
                function: self.name.clone(),
                expected: self.arity.to_string(),
                got: args.len(),
            });
        }

        ctx.record_call(&self.name, args);
        match (self.func)(ctx, args) {
            Ok(value) => Ok(Value::from_json(&value)),
            Err(err) => match err.downcast_ref::<LogicError>() {
                Some(LogicError(message)) => Err(RuntimeErrorKind::LogicErrorInExecution {
                    message: message.clone(),
                }),
                None => Err(RuntimeErrorKind::FunctionExecutionError {
                    function: self.name.clone(),
                    message: err.to_string(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::LanguageFeatures;
    use std::cell::Cell;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("", LanguageFeatures::default(), Some(7))
    }

    #[test]
    fn arity_mismatch_does_not_call_function() {
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let func = ExternalFunction::new("move", Arity::Exact(0), move |_, _| {
            flag.set(true);
            Ok(serde_json::Value::Null)
        });

        let err = func.invoke(&mut ctx(), &[Value::Number(1.0)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "InvalidNumberOfArguments: function: move: expected: 0: got: 1"
        );
        assert!(!called.get());
    }

    #[test]
    fn arity_range_is_described() {
        assert_eq!(Arity::Range(1, 2).to_string(), "between 1 and 2");
        assert_eq!(Arity::AtLeast(1).to_string(), "at least 1");
    }

    #[test]
    fn logic_error_is_verbatim() {
        let func = ExternalFunction::new("move", Arity::Exact(0), |ctx, _| {
            Err(ctx.logic_error("You hit a wall"))
        });
        let err = func.invoke(&mut ctx(), &[]).unwrap_err();
        assert_eq!(
            err,
            RuntimeErrorKind::LogicErrorInExecution {
                message: "You hit a wall".into()
            }
        );
    }

    #[test]
    fn host_error_is_wrapped() {
        let func = ExternalFunction::new("riskyOperation", Arity::Exact(1), |_, _| {
            anyhow::bail!("Negative values not allowed")
        });
        let err = func.invoke(&mut ctx(), &[Value::Number(-1.0)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "FunctionExecutionError: function: riskyOperation: message: Negative values not allowed"
        );
    }

    #[test]
    fn arrays_wrap_into_lists() {
        let func = ExternalFunction::new("get_list", Arity::Exact(0), |_, _| {
            Ok(serde_json::json!([1, 2]))
        });
        let value = func.invoke(&mut ctx(), &[]).unwrap();
        assert_eq!(value.type_name(), "list");
        assert_eq!(value.to_string(), "[1, 2]");
    }
}
