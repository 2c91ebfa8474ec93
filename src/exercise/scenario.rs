//! Scenario definitions and the runners that check learner code against them
//!
//! A visual scenario builds a fresh exercise, lets `setup` arrange it, runs
//! the learner's program (or one of its functions) against the exercise's
//! functions and then asks `expectations` whether the world ended up right.
//! An IO scenario calls one learner function and compares its return value.
//! Both may carry code checks over the source itself.

use super::{Exercise, ExerciseDefinition, ExerciseFactory};
use crate::interpreter::{self, InterpretOptions, InterpretResult, Language};
use crate::runtime::{ExternalFunction, FrameTrace, FrozenValue, LanguageFeatures, LogLine};
use crate::timeline::AnimationTimeline;
use crate::{javascript, jikiscript};
use std::rc::Rc;
use tracing::{debug, info};

pub type SetupFn = Rc<dyn Fn(&mut dyn Exercise)>;
pub type ExpectationsFn = Rc<dyn Fn(&dyn Exercise) -> Vec<Expect>>;
pub type CheckFn = Rc<dyn Fn(&CodeCheckInput) -> anyhow::Result<bool>>;

/// Wrap a setup closure written against a concrete exercise type.
pub fn setup<E: Exercise>(f: impl Fn(&mut E) + 'static) -> SetupFn {
    Rc::new(move |exercise: &mut dyn Exercise| {
        if let Some(exercise) = exercise.as_any_mut().downcast_mut::<E>() {
            f(exercise)
        }
    })
}

/// Wrap an expectations closure written against a concrete exercise type.
pub fn expectations<E: Exercise>(f: impl Fn(&E) -> Vec<Expect> + 'static) -> ExpectationsFn {
    Rc::new(move |exercise: &dyn Exercise| match exercise.as_any().downcast_ref::<E>() {
        Some(exercise) => f(exercise),
        None => vec![Expect::fail(format!(
            "This scenario cannot check a {} exercise.",
            exercise.slug()
        ))],
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expect {
    pub pass: bool,
    pub error_html: String,
    pub actual: Option<serde_json::Value>,
    pub expected: Option<serde_json::Value>,
}

impl Expect {
    pub fn new(pass: bool, error_html: impl Into<String>) -> Self {
        Expect {
            pass,
            error_html: error_html.into(),
            actual: None,
            expected: None,
        }
    }

    pub fn fail(error_html: impl Into<String>) -> Self {
        Expect::new(false, error_html)
    }
}

/// What a code check gets to look at.
pub struct CodeCheckInput<'a> {
    pub code: &'a str,
    pub language: Language,
    pub result: &'a InterpretResult,
}

impl CodeCheckInput<'_> {
    /// Whether the learner defined a top-level function called `name`.
    pub fn function_defined(&self, name: &str) -> bool {
        match self.language {
            Language::JikiScript => jikiscript::parse(self.code).is_ok_and(|program| {
                program.statements.iter().any(|statement| {
                    matches!(statement, jikiscript::ast::Statement::Function(decl) if decl.name == name)
                })
            }),
            Language::JavaScript => javascript::parse(self.code).is_ok_and(|program| {
                program.statements.iter().any(|statement| {
                    matches!(statement, javascript::ast::Statement::Function(decl) if decl.name == name)
                })
            }),
        }
    }

    /// How many times the external function `name` was called, across all
    /// argument lists.
    pub fn call_count(&self, name: &str) -> usize {
        self.result
            .meta
            .function_call_log
            .get(name)
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }

    /// Non-blank source lines, ignoring `//` comments.
    pub fn line_count(&self) -> usize {
        self.code
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .count()
    }
}

#[derive(Clone)]
pub struct CodeCheck {
    pub pass: CheckFn,
    pub error_html: String,
}

impl CodeCheck {
    pub fn new(
        error_html: impl Into<String>,
        pass: impl Fn(&CodeCheckInput) -> anyhow::Result<bool> + 'static,
    ) -> Self {
        CodeCheck {
            pass: Rc::new(pass),
            error_html: error_html.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<serde_json::Value>,
}

#[derive(Clone)]
pub struct VisualScenario {
    pub setup: Option<SetupFn>,
    pub expectations: ExpectationsFn,
    pub code_checks: Vec<CodeCheck>,
    /// Call this learner function after the program ran, instead of only
    /// running the program.
    pub function_call: Option<FunctionCall>,
    pub random_seed: Option<u64>,
}

#[derive(Clone)]
pub struct IoScenario {
    pub function_name: String,
    pub args: Vec<serde_json::Value>,
    pub expected: serde_json::Value,
    pub code_checks: Vec<CodeCheck>,
}

#[derive(Clone)]
pub enum ScenarioKind {
    Visual(VisualScenario),
    Io(IoScenario),
}

#[derive(Clone)]
pub struct Scenario {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub task_id: String,
    pub kind: ScenarioKind,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ScenarioKind::Visual(_) => "visual",
            ScenarioKind::Io(_) => "io",
        };
        f.debug_struct("Scenario")
            .field("slug", &self.slug)
            .field("task_id", &self.task_id)
            .field("kind", &kind)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pass,
    Fail,
}

#[derive(Debug)]
pub struct ScenarioResult {
    pub slug: String,
    pub name: String,
    pub status: ScenarioStatus,
    pub expects: Vec<Expect>,
    pub frames: FrameTrace,
    pub log_lines: Vec<LogLine>,
    /// Return value of the called function, for IO and function-call runs.
    pub value: Option<FrozenValue>,
    /// Final exercise state, if the scenario had an exercise.
    pub state: Option<serde_json::Value>,
    pub animation_timeline: AnimationTimeline,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Pass
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "slug": self.slug,
            "name": self.name,
            "status": self.status,
            "expects": self.expects.iter().map(|expect| serde_json::json!({
                "pass": expect.pass,
                "errorHtml": expect.error_html,
                "actual": expect.actual,
                "expected": expect.expected,
            })).collect::<Vec<_>>(),
            "value": self.value.as_ref().map(FrozenValue::to_json),
            "state": self.state,
            "logLines": self.log_lines,
            "frames": self.frames.iter().map(|frame| frame.to_json()).collect::<Vec<_>>(),
        })
    }
}

/// Results of one run of every scenario, in scenario order.
#[derive(Debug, Default)]
pub struct TestSuiteResult {
    pub tests: Vec<ScenarioResult>,
}

impl TestSuiteResult {
    pub fn all_passed(&self) -> bool {
        !self.tests.is_empty() && self.tests.iter().all(ScenarioResult::passed)
    }

    pub fn get(&self, slug: &str) -> Option<&ScenarioResult> {
        self.tests.iter().find(|test| test.slug == slug)
    }

    pub fn get_mut(&mut self, slug: &str) -> Option<&mut ScenarioResult> {
        self.tests.iter_mut().find(|test| test.slug == slug)
    }
}

fn run_checks(checks: &[CodeCheck], input: &CodeCheckInput) -> Vec<Expect> {
    checks
        .iter()
        .filter_map(|check| match (check.pass)(input) {
            Ok(true) => None,
            Ok(false) => Some(Expect::fail(check.error_html.clone())),
            Err(error) => Some(Expect::fail(format!("Code check error: {}", error))),
        })
        .collect()
}

fn status(expects: &[Expect], result: &InterpretResult) -> ScenarioStatus {
    let passed = result.error.is_none()
        && !result.frames.has_errors()
        && expects.iter().all(|expect| expect.pass);
    if passed {
        ScenarioStatus::Pass
    } else {
        ScenarioStatus::Fail
    }
}

fn syntax_expect(result: &InterpretResult) -> Option<Expect> {
    result
        .error
        .as_ref()
        .map(|error| Expect::fail(error.to_string()))
}

pub fn run_visual_scenario(
    scenario: &Scenario,
    visual: &VisualScenario,
    code: &str,
    factory: ExerciseFactory,
    language: Language,
    features: &LanguageFeatures,
) -> ScenarioResult {
    let mut exercise = factory();
    if let Some(setup) = &visual.setup {
        setup(exercise.as_mut());
    }

    let options = InterpretOptions {
        language_features: features.clone(),
        external_functions: exercise.available_functions(),
        random_seed: visual.random_seed,
    };
    let (result, value) = match &visual.function_call {
        Some(call) => {
            let evaluation =
                interpreter::evaluate_function(language, code, &options, &call.name, &call.args);
            let value = evaluation.value.clone();
            (InterpretResult::from(evaluation), value)
        }
        None => (interpreter::interpret(language, code, &options), None),
    };

    let mut expects: Vec<Expect> = syntax_expect(&result).into_iter().collect();
    expects.extend((visual.expectations)(exercise.as_ref()));
    let input = CodeCheckInput {
        code,
        language,
        result: &result,
    };
    expects.extend(run_checks(&visual.code_checks, &input));

    let status = status(&expects, &result);
    info!(scenario = %scenario.slug, ?status, frames = result.frames.len(), "visual scenario finished");

    ScenarioResult {
        slug: scenario.slug.clone(),
        name: scenario.name.clone(),
        status,
        expects,
        animation_timeline: AnimationTimeline::new(exercise.animations(), &result.frames),
        state: Some(exercise.state()),
        frames: result.frames,
        log_lines: result.log_lines,
        value,
    }
}

pub fn run_io_scenario(
    scenario: &Scenario,
    io: &IoScenario,
    code: &str,
    language: Language,
    features: &LanguageFeatures,
    functions: Vec<ExternalFunction>,
) -> ScenarioResult {
    let options = InterpretOptions {
        language_features: features.clone(),
        external_functions: functions,
        random_seed: None,
    };
    let evaluation =
        interpreter::evaluate_function(language, code, &options, &io.function_name, &io.args);
    let value = evaluation.value.clone();
    let result = InterpretResult::from(evaluation);

    let mut expects: Vec<Expect> = syntax_expect(&result).into_iter().collect();
    if result.error.is_none() {
        let pass = value
            .as_ref()
            .is_some_and(|value| value.matches_json(&io.expected));
        expects.push(Expect {
            pass,
            error_html: format!(
                "Expected <code>{}</code> to return <code>{}</code>.",
                io.function_name, io.expected
            ),
            actual: value.as_ref().map(FrozenValue::to_json),
            expected: Some(io.expected.clone()),
        });
    }
    let input = CodeCheckInput {
        code,
        language,
        result: &result,
    };
    expects.extend(run_checks(&io.code_checks, &input));

    let status = status(&expects, &result);
    info!(scenario = %scenario.slug, ?status, "io scenario finished");

    ScenarioResult {
        slug: scenario.slug.clone(),
        name: scenario.name.clone(),
        status,
        expects,
        animation_timeline: AnimationTimeline::new(Vec::new(), &result.frames),
        state: None,
        frames: result.frames,
        log_lines: result.log_lines,
        value,
    }
}

pub fn run_scenario(
    definition: &ExerciseDefinition,
    scenario: &Scenario,
    code: &str,
    language: Language,
    features: &LanguageFeatures,
) -> ScenarioResult {
    debug!(exercise = definition.slug, scenario = %scenario.slug, "running scenario");
    match (&scenario.kind, definition.factory) {
        (ScenarioKind::Visual(visual), Some(factory)) => {
            run_visual_scenario(scenario, visual, code, factory, language, features)
        }
        (ScenarioKind::Visual(_), None) => {
            let result = interpreter::interpret(language, code, &InterpretOptions::default());
            ScenarioResult {
                slug: scenario.slug.clone(),
                name: scenario.name.clone(),
                status: ScenarioStatus::Fail,
                expects: vec![Expect::fail(format!(
                    "The {} exercise has no world to run this scenario in.",
                    definition.slug
                ))],
                animation_timeline: AnimationTimeline::new(Vec::new(), &result.frames),
                state: None,
                frames: result.frames,
                log_lines: result.log_lines,
                value: None,
            }
        }
        (ScenarioKind::Io(io), _) => {
            run_io_scenario(scenario, io, code, language, features, (definition.functions)())
        }
    }
}

/// Run a whole program outside any exercise, as a single test named after
/// the program.
pub fn run_program(code: &str, language: Language, features: &LanguageFeatures) -> ScenarioResult {
    let options = InterpretOptions {
        language_features: features.clone(),
        ..InterpretOptions::default()
    };
    let result = interpreter::interpret(language, code, &options);
    let expects: Vec<Expect> = syntax_expect(&result).into_iter().collect();
    let status = status(&expects, &result);

    ScenarioResult {
        slug: "program".to_string(),
        name: "Program".to_string(),
        status,
        expects,
        animation_timeline: AnimationTimeline::new(Vec::new(), &result.frames),
        state: None,
        frames: result.frames,
        log_lines: result.log_lines,
        value: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::maze::{self, MazeExercise};
    use serde_json::json;

    fn visual_scenario(checks: Vec<CodeCheck>) -> (Scenario, VisualScenario) {
        let visual = VisualScenario {
            setup: Some(setup(|maze: &mut MazeExercise| {
                maze.setup_grid(vec![vec![2, 0, 3]]);
                maze.setup_position(0, 0);
                maze.setup_direction(maze::Direction::Right);
            })),
            expectations: expectations(|maze: &MazeExercise| {
                vec![Expect::new(maze.position() == (0, 2), "You didn't reach the end.")]
            }),
            code_checks: checks,
            function_call: None,
            random_seed: None,
        };
        let scenario = Scenario {
            slug: "short".into(),
            name: "Short corridor".into(),
            description: String::new(),
            task_id: "walk".into(),
            kind: ScenarioKind::Visual(visual.clone()),
        };
        (scenario, visual)
    }

    fn run(code: &str, checks: Vec<CodeCheck>) -> ScenarioResult {
        let (scenario, visual) = visual_scenario(checks);
        run_visual_scenario(
            &scenario,
            &visual,
            code,
            maze::factory,
            Language::JikiScript,
            &LanguageFeatures::default(),
        )
    }

    #[test]
    fn test_visual_scenario_passes() {
        let result = run("move()\nmove()", Vec::new());
        assert_eq!(result.status, ScenarioStatus::Pass);
        assert_eq!(result.animation_timeline.animations().len(), 2);
        assert_eq!(result.state.as_ref().unwrap()["gameResult"], json!("win"));
    }

    #[test]
    fn test_visual_scenario_fails_on_unmet_expectation() {
        let result = run("move()", Vec::new());
        assert_eq!(result.status, ScenarioStatus::Fail);
        assert!(!result.expects[0].pass);
    }

    #[test]
    fn test_logic_error_fails_the_scenario() {
        let result = run("move()\nmove()\nmove()", Vec::new());
        assert_eq!(result.status, ScenarioStatus::Fail);
        let last = result.frames.last().unwrap();
        assert_eq!(last.error().unwrap().message, "Cannot move outside the maze!");
    }

    #[test]
    fn test_code_checks_append_failures() {
        let checks = vec![
            CodeCheck::new("Use at most one line.", |input| Ok(input.line_count() <= 1)),
            CodeCheck::new("unused", |_| Err(anyhow::anyhow!("boom"))),
            CodeCheck::new("Call move twice.", |input| Ok(input.call_count("move") == 2)),
        ];
        let result = run("move()\nmove()", checks);
        assert_eq!(result.status, ScenarioStatus::Fail);
        let messages: Vec<_> = result
            .expects
            .iter()
            .filter(|expect| !expect.pass)
            .map(|expect| expect.error_html.as_str())
            .collect();
        assert_eq!(messages, vec!["Use at most one line.", "Code check error: boom"]);
    }

    #[test]
    fn test_syntax_error_fails_with_message() {
        let result = run("move(", Vec::new());
        assert_eq!(result.status, ScenarioStatus::Fail);
        assert!(result.frames.is_empty());
        assert!(!result.expects[0].pass);
    }

    #[test]
    fn test_io_scenario_compares_return_value() {
        let io = IoScenario {
            function_name: "double".into(),
            args: vec![json!(4)],
            expected: json!(8),
            code_checks: Vec::new(),
        };
        let scenario = Scenario {
            slug: "double-4".into(),
            name: "Doubles 4".into(),
            description: String::new(),
            task_id: "double".into(),
            kind: ScenarioKind::Io(io.clone()),
        };
        let features = LanguageFeatures::default();

        let good = "function double(n) {\n  return n * 2;\n}";
        let result = run_io_scenario(&scenario, &io, good, Language::JavaScript, &features, Vec::new());
        assert!(result.passed());
        assert_eq!(result.value, Some(FrozenValue::Number(8.0)));

        let bad = "function double(n) {\n  return n + 2;\n}";
        let result = run_io_scenario(&scenario, &io, bad, Language::JavaScript, &features, Vec::new());
        assert!(!result.passed());
        assert_eq!(result.expects[0].actual, Some(json!(6)));
    }

    #[test]
    fn test_function_defined_check() {
        let result = interpreter::interpret(Language::JikiScript, "", &InterpretOptions::default());
        let input = CodeCheckInput {
            code: "function turn_around do\n  turn_left()\nend",
            language: Language::JikiScript,
            result: &result,
        };
        assert!(input.function_defined("turn_around"));
        assert!(!input.function_defined("can_move"));
    }

    #[test]
    fn test_run_program_without_exercise() {
        let result = run_program("log 1", Language::JikiScript, &LanguageFeatures::default());
        assert!(result.passed());
        assert_eq!(result.log_lines.len(), 1);
    }
}
