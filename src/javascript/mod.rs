//! JavaScript subset front-end
//!
//! Covers the part of JavaScript beginners meet first: `let`/`const`,
//! functions, `if`/`while`/`for`/`for...of`, arrays, plain objects and
//! `console.log`. Behaviour that usually surprises learners (coercion,
//! truthiness, `==`) can be switched off per exercise.

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
            debug!(%error, "JavaScript parse failed");
            return InterpretResult::syntax_error(error);
        }
    };
    debug!(statements = program.statements.len(), "parsed JavaScript program");

    let mut executor = Executor::new(source, options);
    executor.execute(&program);
    let result = InterpretResult::from_run(executor.finish());

    info!(
        frames = result.frames.len(),
        success = result.success,
        "JavaScript run finished"
    );
    result
}

pub fn evaluate_function(
    source: &str,
    options: &InterpretOptions,
    function_name: &str,
    args: &[serde_json::Value],
) -> EvaluationResult {
    let program = match parse(source) {
        Ok(program) => program,
        Err(error) => {
            debug!(%error, "JavaScript parse failed");
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
        "JavaScript evaluation finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{FrozenValue, LanguageFeatures};

    fn run(source: &str) -> InterpretResult {
        interpret(source, &InterpretOptions::default())
    }

    fn last_error(result: &InterpretResult) -> String {
        result
            .frames
            .last()
            .and_then(|frame| frame.error())
            .map(|error| error.message.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_console_log_joins_arguments() {
        let result = run("console.log(\"a\", 1, true);");
        assert!(result.success);
        assert_eq!(result.log_lines[0].output, "a 1 true");
    }

    #[test]
    fn test_let_and_assignment_frames() {
        let result = run("let x = 1;\nx = x + 2;\nx++;");
        assert!(result.success);
        assert_eq!(result.frames.len(), 3);
        let last = result.frames.last().unwrap();
        assert_eq!(last.variables().get("x"), Some(&FrozenValue::Number(4.0)));
    }

    #[test]
    fn test_const_reassignment_fails() {
        let result = run("const x = 1;\nx = 2;");
        assert!(!result.success);
        assert_eq!(last_error(&result), "AssignmentToConstant: name: x");
        assert_eq!(result.frames.last().unwrap().line(), 2);
    }

    #[test]
    fn test_shadowing_is_gated() {
        let result = run("let x = 5;\n{\n  let x = 10;\n}");
        assert_eq!(last_error(&result), "ShadowingDisabled: name: x");

        let options = InterpretOptions {
            language_features: LanguageFeatures {
                allow_shadowing: true,
                ..LanguageFeatures::default()
            },
            ..InterpretOptions::default()
        };
        assert!(interpret("let x = 5;\n{\n  let x = 10;\n}", &options).success);
    }

    #[test]
    fn test_loose_equality_needs_opt_in() {
        let result = run("let same = 1 == 1;");
        assert_eq!(last_error(&result), "StrictEqualityRequired: operator: ==");

        let options = InterpretOptions {
            language_features: LanguageFeatures {
                enforce_strict_equality: false,
                ..LanguageFeatures::default()
            },
            ..InterpretOptions::default()
        };
        let result = interpret("let same = \"1\" == 1;", &options);
        assert!(result.success);
        assert_eq!(
            result.frames[0].variables().get("same"),
            Some(&FrozenValue::Boolean(true))
        );
    }

    #[test]
    fn test_coercion_is_gated() {
        let result = run("let x = 5 + true;");
        assert_eq!(
            last_error(&result),
            "TypeCoercionNotAllowed: operator: +: left: number: right: boolean"
        );
    }

    #[test]
    fn test_for_loop_records_condition_frames() {
        let result = run("let total = 0;\nfor (let i = 0; i < 3; i++) {\n  total += i;\n}");
        assert!(result.success);
        // declare, init, 4 tests, 3 body assignments
        assert_eq!(result.frames.len(), 9);
        let last = result.frames.last().unwrap();
        assert_eq!(last.variables().get("total"), Some(&FrozenValue::Number(3.0)));
    }

    #[test]
    fn test_for_of_over_empty_array_records_skip() {
        let result = run("for (const x of []) {\n  console.log(x);\n}");
        assert!(result.success);
        assert_eq!(result.frames.len(), 1);
        assert!(result.frames[0].generate_description().contains("did not run"));
    }

    #[test]
    fn test_for_of_rejects_numbers() {
        let result = run("for (const x of 5) {}");
        assert_eq!(last_error(&result), "ForOfLoopTargetNotIterable: type: number");
    }

    #[test]
    fn test_functions_see_globals() {
        let result = run("let base = 10;\nfunction add(n) {\n  return base + n;\n}\nlet x = add(5);");
        assert!(result.success);
        let last = result.frames.last().unwrap();
        assert_eq!(last.variables().get("x"), Some(&FrozenValue::Number(15.0)));
    }

    #[test]
    fn test_arrays_are_shared_with_functions() {
        let source = "function push(list) {\n  list[list.length] = 1;\n}\nlet xs = [];\npush(xs);";
        let result = run(source);
        assert!(result.success);
        let last = result.frames.last().unwrap();
        assert_eq!(
            last.variables().get("xs"),
            Some(&FrozenValue::List(vec![FrozenValue::Number(1.0)]))
        );
    }

    #[test]
    fn test_unknown_property_fails() {
        let result = run("let o = { a: 1 };\nlet b = o.b;");
        assert_eq!(last_error(&result), "PropertyNotFound: property: b");
    }

    #[test]
    fn test_redefining_console_fails() {
        let result = run("function console() {}");
        assert_eq!(last_error(&result), "FunctionAlreadyDefined: name: console");
    }

    #[test]
    fn test_evaluate_function_passes_host_values() {
        let source = "function sum(xs) {\n  let total = 0;\n  for (const x of xs) {\n    total += x;\n  }\n  return total;\n}";
        let result = evaluate_function(
            source,
            &InterpretOptions::default(),
            "sum",
            &[serde_json::json!([1, 2, 3])],
        );
        assert!(result.success);
        assert_eq!(result.value, Some(FrozenValue::Number(6.0)));
    }

    #[test]
    fn test_fractional_index_is_rejected() {
        let result = run("let a = [1, 2];\nlet b = a[1.5];");
        assert!(!result.success);
        assert_eq!(last_error(&result), "IndexMustBeInteger: index: 1.5");

        let result = run("let a = [1];\na[0.5] = 2;");
        assert_eq!(last_error(&result), "IndexMustBeInteger: index: 0.5");
        assert_eq!(result.frames.last().unwrap().line(), 2);
    }

    #[test]
    fn test_element_assignment_names_its_target() {
        let result = run("let a = [1, 2];\na[1] = 5;\nlet point = { x: 1 };\npoint.x += 2;");
        assert!(result.success);
        assert!(result.frames[1]
            .generate_description()
            .starts_with("This line updated the variable a[1] to 5."));
        assert!(result.frames[3]
            .generate_description()
            .starts_with("This line updated the variable point.x to 3."));
    }
}
