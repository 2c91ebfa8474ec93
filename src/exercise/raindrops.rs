//! Raindrops: an input/output exercise
//!
//! The learner writes `raindrops(n)`, returning "Pling", "Plang" and "Plong"
//! for factors 3, 5 and 7, or the number itself as a string.

use super::scenario::{CodeCheck, IoScenario, Scenario, ScenarioKind};
use super::{ExerciseDefinition, Task};
use crate::interpreter::Language;
use crate::runtime::{Arity, ExternalFunction, Value};
use serde_json::json;

fn functions() -> Vec<ExternalFunction> {
    vec![
        ExternalFunction::new("concatenate", Arity::AtLeast(1), |_, args: &[Value]| {
            let joined: String = args.iter().map(Value::to_output_string).collect();
            Ok(json!(joined))
        })
        .with_description("Join strings together"),
        ExternalFunction::new("number_to_string", Arity::Exact(1), |ctx, args: &[Value]| {
            match args[0].as_number() {
                Some(_) => Ok(json!(args[0].to_output_string())),
                None => Err(ctx.logic_error(format!(
                    "number_to_string expects a number, not {}.",
                    args[0].type_name()
                ))),
            }
        })
        .with_description("Turn a number into a string"),
    ]
}

fn io_scenario(task_id: &str, input: i64, expected: &str) -> Scenario {
    let io = IoScenario {
        function_name: "raindrops".to_string(),
        args: vec![json!(input)],
        expected: json!(expected),
        code_checks: Vec::new(),
    };
    Scenario {
        slug: format!("raindrops-{}", input),
        name: format!("raindrops({})", input),
        description: format!("{} gives \"{}\"", input, expected),
        task_id: task_id.to_string(),
        kind: ScenarioKind::Io(io),
    }
}

const JIKISCRIPT_STUB: &str = "function raindrops with number do\n  return \"\"\nend\n";
const JAVASCRIPT_STUB: &str = "function raindrops(number) {\n  return \"\";\n}\n";

pub fn definition() -> ExerciseDefinition {
    let mut scenarios = vec![
        io_scenario("single-sounds", 3, "Pling"),
        io_scenario("single-sounds", 5, "Plang"),
        io_scenario("single-sounds", 7, "Plong"),
        io_scenario("combined-sounds", 15, "PlingPlang"),
        io_scenario("combined-sounds", 105, "PlingPlangPlong"),
        io_scenario("no-sound", 34, "34"),
    ];
    if let Some(ScenarioKind::Io(io)) = scenarios.last_mut().map(|scenario| &mut scenario.kind) {
        io.code_checks.push(CodeCheck::new(
            "Use <code>number_to_string</code> to build the fallback.",
            |input| Ok(input.call_count("number_to_string") > 0),
        ));
    }

    ExerciseDefinition {
        slug: "raindrops",
        title: "Raindrops",
        instructions: "Return the raindrop sounds for a number's factors of 3, 5 and 7.",
        factory: None,
        functions,
        tasks: vec![
            Task::new("single-sounds", "One factor", "Handle numbers with a single factor."),
            Task::new("combined-sounds", "Several factors", "Combine sounds in order.")
                .with_hints(&["Check every factor, not just the first one that matches"]),
            Task::new("no-sound", "No factors", "Fall back to the number itself.").bonus(),
        ],
        scenarios,
        stubs: vec![
            (Language::JikiScript, JIKISCRIPT_STUB),
            (Language::JavaScript, JAVASCRIPT_STUB),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::run_scenario;
    use crate::runtime::LanguageFeatures;

    const SOLUTION: &str = r#"function raindrops(n) {
  let sounds = "";
  if (n % 3 === 0) {
    sounds = sounds + "Pling";
  }
  if (n % 5 === 0) {
    sounds = sounds + "Plang";
  }
  if (n % 7 === 0) {
    sounds = sounds + "Plong";
  }
  if (sounds === "") {
    return number_to_string(n);
  }
  return sounds;
}"#;

    #[test]
    fn test_solution_passes_every_scenario() {
        let definition = definition();
        let features = LanguageFeatures::default();
        for scenario in &definition.scenarios {
            let result = run_scenario(&definition, scenario, SOLUTION, Language::JavaScript, &features);
            assert!(result.passed(), "{} failed: {:?}", scenario.slug, result.expects);
        }
    }

    #[test]
    fn test_stub_fails() {
        let definition = definition();
        let scenario = &definition.scenarios[0];
        let stub = definition.stub(Language::JavaScript).unwrap();
        let result = run_scenario(&definition, scenario, stub, Language::JavaScript, &LanguageFeatures::default());
        assert!(!result.passed());
        assert_eq!(result.expects[0].actual, Some(json!("")));
    }

    #[test]
    fn test_number_to_string_rejects_strings() {
        let definition = definition();
        let code = "function raindrops(n) {\n  return number_to_string(\"x\");\n}";
        let result = run_scenario(
            &definition,
            &definition.scenarios[0],
            code,
            Language::JavaScript,
            &LanguageFeatures::default(),
        );
        let error = result.frames.last().unwrap().error().unwrap();
        assert_eq!(error.message, "number_to_string expects a number, not string.");
    }
}
