// Integration tests for the interpreters and the external function bridge

use maplit::btreemap;
use serde_json::json;
use steptrace::interpreter::{evaluate_function, interpret, InterpretOptions, Language};
use steptrace::runtime::{Arity, ExternalFunction, FrozenValue, LanguageFeatures};

fn frame_json(language: Language, source: &str) -> Vec<serde_json::Value> {
    interpret(language, source, &InterpretOptions::default())
        .frames
        .iter()
        .map(|frame| frame.to_json())
        .collect()
}

#[test]
fn test_runs_are_deterministic() {
    let jiki = "set total to 0\nrepeat 3 times do\n  change total to total + 2\nend\nlog total";
    assert_eq!(frame_json(Language::JikiScript, jiki), frame_json(Language::JikiScript, jiki));

    let js = "let xs = [1, 2, 3];\nlet sum = 0;\nfor (const x of xs) {\n  sum += x;\n}\nconsole.log(sum);";
    assert_eq!(frame_json(Language::JavaScript, js), frame_json(Language::JavaScript, js));
}

#[test]
fn test_frame_times_increase() {
    let result = interpret(
        Language::JavaScript,
        "let x = 0;\nwhile (x < 4) {\n  x++;\n}",
        &InterpretOptions::default(),
    );
    assert!(result.success);
    assert!(result.frames.len() > 4);
    for pair in result.frames.windows(2) {
        assert!(pair[0].time() < pair[1].time());
    }
}

#[test]
fn test_descriptions_do_not_change_after_mutation() {
    let result = interpret(
        Language::JikiScript,
        "set x to 42\nlog x\nchange x to 100\nlog x",
        &InterpretOptions::default(),
    );
    assert!(result.success);
    assert_eq!(result.frames.len(), 4);

    let first = &result.frames[0];
    assert_eq!(first.variables().get("x"), Some(&FrozenValue::Number(42.0)));
    assert!(first.generate_description().contains("42"));
    assert!(!first.generate_description().contains("100"));
    assert_eq!(
        result.frames[3].variables().get("x"),
        Some(&FrozenValue::Number(100.0))
    );

    let output: Vec<&str> = result.log_lines.iter().map(|line| line.output.as_str()).collect();
    assert_eq!(output, vec!["42", "100"]);
}

#[test]
fn test_nested_lists_are_frozen() {
    let result = interpret(
        Language::JavaScript,
        "let inner = [1];\nlet outer = [inner];\ninner[0] = 5;",
        &InterpretOptions::default(),
    );
    assert!(result.success);
    assert_eq!(
        result.frames[1].variables().get("outer"),
        Some(&FrozenValue::List(vec![FrozenValue::List(vec![FrozenValue::Number(1.0)])]))
    );
}

#[test]
fn test_language_gates_can_be_lifted() {
    let strict = interpret(Language::JavaScript, "5 + true;", &InterpretOptions::default());
    assert!(!strict.success);
    assert_eq!(
        strict.frames.last().unwrap().error().unwrap().kind,
        "TypeCoercionNotAllowed"
    );

    let options = InterpretOptions {
        language_features: LanguageFeatures {
            allow_type_coercion: true,
            allow_shadowing: true,
            ..LanguageFeatures::default()
        },
        ..InterpretOptions::default()
    };
    assert!(interpret(Language::JavaScript, "5 + true;", &options).success);
    assert!(interpret(Language::JavaScript, "let x = 5;\n{\n  let x = 10;\n}", &options).success);
}

#[test]
fn test_syntax_errors_produce_no_frames() {
    let result = interpret(Language::JikiScript, "set to", &InterpretOptions::default());
    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(result.frames.is_empty());
}

#[test]
fn test_nested_functions_are_syntax_errors() {
    let jiki = "function outer do\n  function inner do\n  end\nend";
    let js = "function outer() {\n  function inner() {}\n}";
    for (language, source) in [(Language::JikiScript, jiki), (Language::JavaScript, js)] {
        let result = interpret(language, source, &InterpretOptions::default());
        assert!(!result.success);
        assert!(result.frames.is_empty());
        let error = result.error.unwrap();
        assert_eq!(error.message, "NestedFunctionDeclaration: name: inner");
        assert_eq!(error.location.line, 2);
    }
}

#[test]
fn test_external_function_errors() {
    let functions = vec![
        ExternalFunction::new("jump", Arity::Exact(0), |ctx, _| {
            Err(ctx.logic_error("You can't jump here!"))
        }),
        ExternalFunction::new("explode", Arity::Exact(0), |_, _| {
            Err(anyhow::anyhow!("boom"))
        }),
        ExternalFunction::new("answer", Arity::Exact(0), |_, _| Ok(json!(42)))
            .with_description("returns the answer"),
    ];
    let options = InterpretOptions {
        external_functions: functions,
        ..InterpretOptions::default()
    };

    let result = interpret(Language::JikiScript, "set a to answer()\njump()", &options);
    assert_eq!(
        result.frames[0].variables().get("a"),
        Some(&FrozenValue::Number(42.0))
    );
    let error = result.frames.last().unwrap().error().unwrap();
    assert_eq!(error.kind, "LogicErrorInExecution");
    assert_eq!(error.message, "You can't jump here!");

    let result = interpret(Language::JikiScript, "explode()", &options);
    let error = result.frames.last().unwrap().error().unwrap();
    assert_eq!(error.kind, "FunctionExecutionError");

    let result = interpret(Language::JikiScript, "answer(1)", &options);
    let error = result.frames.last().unwrap().error().unwrap();
    assert_eq!(error.kind, "InvalidNumberOfArguments");
}

#[test]
fn test_evaluate_function_in_both_languages() {
    let jiki = "function area with width, height do\n  return width * height\nend";
    let result = evaluate_function(
        Language::JikiScript,
        jiki,
        &InterpretOptions::default(),
        "area",
        &[json!(3), json!(4)],
    );
    assert_eq!(result.value, Some(FrozenValue::Number(12.0)));

    let js = "function pair(a, b) {\n  return { first: a, second: b };\n}";
    let result = evaluate_function(
        Language::JavaScript,
        js,
        &InterpretOptions::default(),
        "pair",
        &[json!(1), json!("two")],
    );
    let value = result.value.unwrap();
    assert!(value.matches_json(&json!({"first": 1, "second": "two"})));
    assert_eq!(
        value.to_json(),
        serde_json::to_value(btreemap! {"first" => json!(1), "second" => json!("two")}).unwrap()
    );
}

#[test]
fn test_seeded_random_numbers_repeat() {
    let options = |seed| InterpretOptions {
        external_functions: vec![ExternalFunction::new("roll", Arity::Exact(0), |ctx, _| {
            Ok(json!(ctx.random_number(1, 6)))
        })],
        random_seed: Some(seed),
        ..InterpretOptions::default()
    };
    let rolls = |seed| {
        interpret(Language::JavaScript, "console.log(roll());\nconsole.log(roll());\nconsole.log(roll());", &options(seed))
            .log_lines
            .into_iter()
            .map(|line| line.output)
            .collect::<Vec<_>>()
    };

    let first = rolls(42);
    assert_eq!(first.len(), 3);
    assert_eq!(first, rolls(42));
    assert!(first
        .iter()
        .all(|roll| (1..=6).contains(&roll.parse::<i64>().unwrap())));
}
