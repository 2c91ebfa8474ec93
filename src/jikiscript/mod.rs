//! JikiScript front-end
//!
//! JikiScript is a small, English-flavoured teaching language:
//!
//! ```text
//! set count to 0
//! repeat 3 times do
//!   change count to count + 1
//! end
//! log count
//! ```
//!
//! It deliberately refuses implicit conversions, keeps function bodies
//! isolated from globals and indexes lists from 1.

pub mod ast;
pub mod executor;
pub mod lexer;
pub mod parser;

use crate::interpreter::{EvaluationResult, InterpretOptions, InterpretResult};
use crate::runtime::Value;
use executor::Executor;
use tracing::{debug, info};

pub use parser::parse;

pub fn interpret(source: &str, options: &InterpretOptions) -> InterpretResult {
    let program = match parse(source) {
        Ok(program) => program,
        Err(error) => {
            debug!(%error, "JikiScript parse failed");
            return InterpretResult::syntax_error(error);
        }
    };
    debug!(statements = program.statements.len(), "parsed JikiScript program");

    let mut executor = Executor::new(source, options);
    executor.execute(&program);
    let result = InterpretResult::from_run(executor.finish());

    info!(
        frames = result.frames.len(),
        success = result.success,
        "JikiScript run finished"
    );
    result
}

/// Run the program, then call `function_name` with `args` converted from
/// host values.
pub fn evaluate_function(
    source: &str,
    options: &InterpretOptions,
    function_name: &str,
    args: &[serde_json::Value],
) -> EvaluationResult {
    let program = match parse(source) {
        Ok(program) => program,
        Err(error) => {
            debug!(%error, "JikiScript parse failed");
            return EvaluationResult::syntax_error(error);
        }
    };

    let mut executor = Executor::new(source, options);
    let value = if executor.execute(&program) {
        let args = args.iter().map(Value::from_json).collect();
        executor
            .call_entry(function_name, args)
            .map(|value| value.freeze())
    } else {
        None
    };

    let result = EvaluationResult::from_run(executor.finish(), value);
    info!(
        function = function_name,
        frames = result.frames.len(),
        success = result.success,
        "JikiScript evaluation finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{FrozenValue, LanguageFeatures};

    fn error_kind(result: &InterpretResult) -> &'static str {
        result
            .frames
            .last()
            .and_then(|frame| frame.error())
            .map(|error| error.kind)
            .unwrap_or_default()
    }

    #[test]
    fn test_log_writes_output() {
        let result = interpret("log \"hello\"", &InterpretOptions::default());
        assert!(result.success);
        assert_eq!(result.log_lines[0].output, "hello");
        assert_eq!(result.frames.len(), 1);
    }

    #[test]
    fn test_evaluate_function_returns_value() {
        let source = "function double with n do\n  return n * 2\nend";
        let result = evaluate_function(
            source,
            &InterpretOptions::default(),
            "double",
            &[serde_json::json!(21)],
        );
        assert!(result.success);
        assert_eq!(result.value, Some(FrozenValue::Number(42.0)));
    }

    #[test]
    fn test_evaluate_missing_function() {
        let result = evaluate_function("log 1", &InterpretOptions::default(), "nope", &[]);
        assert!(!result.success);
        assert_eq!(result.value, None);
        let last = result.frames.last().unwrap();
        assert_eq!(last.error().unwrap().message, "FunctionNotFound: name: nope");
    }

    #[test]
    fn test_fractional_index_is_rejected() {
        let result = interpret("set a to [1, 2]\nlog a[1.5]", &InterpretOptions::default());
        assert!(!result.success);
        assert_eq!(error_kind(&result), "IndexMustBeInteger");
        assert_eq!(
            result.frames.last().unwrap().error().unwrap().message,
            "IndexMustBeInteger: index: 1.5"
        );
        assert!(result.log_lines.is_empty());

        let result = interpret("set a to [1, 2]\nchange a[2.5] to 3", &InterpretOptions::default());
        assert_eq!(error_kind(&result), "IndexMustBeInteger");
    }

    #[test]
    fn test_repeat_count_is_checked_before_looping() {
        let result = interpret("repeat -1 times do\n  log 1\nend", &InterpretOptions::default());
        assert!(!result.success);
        assert_eq!(error_kind(&result), "RangeErrorRepeatCountMustBeNonNegative");
        assert_eq!(result.frames.len(), 1);
        assert!(result.log_lines.is_empty());

        let result = interpret("repeat 1.5 times do\n  log 1\nend", &InterpretOptions::default());
        assert_eq!(error_kind(&result), "RangeErrorRepeatCountMustBeInteger");
        assert!(result.log_lines.is_empty());
    }

    #[test]
    fn test_repeat_count_above_iteration_limit() {
        let options = InterpretOptions {
            language_features: LanguageFeatures {
                max_total_loop_iterations: 5,
                ..LanguageFeatures::default()
            },
            ..InterpretOptions::default()
        };
        let result = interpret("repeat 6 times do\n  log 1\nend", &options);
        assert!(!result.success);
        assert_eq!(error_kind(&result), "RangeErrorRepeatCountTooHighForExecution");
        assert_eq!(
            result.frames.last().unwrap().error().unwrap().message,
            "RangeErrorRepeatCountTooHighForExecution: count: 6, max: 5"
        );
        assert_eq!(result.frames.len(), 1);
        assert!(result.log_lines.is_empty());

        assert!(interpret("repeat 5 times do\n  log 1\nend", &options).success);
    }
}
