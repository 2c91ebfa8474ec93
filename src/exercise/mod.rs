//! Exercises, scenarios and task tracking
//!
//! An exercise is a host world learner code acts on (a maze, a canvas…). It
//! exposes [`ExternalFunction`]s, records the animations those functions
//! queue, and reports its state so scenarios can check it. Exercises are
//! looked up by slug in a [`registry`]; each [`ExerciseDefinition`] bundles
//! the factory with its tasks and scenarios.

pub mod maze;
pub mod raindrops;
pub mod scenario;
pub mod tasks;

use crate::interpreter::Language;
use crate::runtime::ExternalFunction;
use crate::timeline::Animation;
use std::any::Any;

pub use scenario::{
    run_io_scenario, run_program, run_scenario, run_visual_scenario, CodeCheck, Expect,
    Scenario, ScenarioKind, ScenarioResult, ScenarioStatus, TestSuiteResult,
};
pub use tasks::{TaskManager, TaskProgress, TaskStatus};

/// A host world driven by learner code.
///
/// Implementations keep their state behind shared cells: the functions
/// returned by [`available_functions`](Exercise::available_functions) outlive
/// the borrow and mutate the same state the scenario later inspects.
pub trait Exercise: Any {
    fn slug(&self) -> &'static str;

    fn available_functions(&self) -> Vec<ExternalFunction>;

    /// Observable state, for expectations and `--json` output.
    fn state(&self) -> serde_json::Value;

    /// Animations queued so far, in the order they were added.
    fn animations(&self) -> Vec<Animation>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub type ExerciseFactory = fn() -> Box<dyn Exercise>;

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hints: Vec<String>,
    /// Scenario slugs that must pass. `None` means every scenario tagged
    /// with this task.
    pub required_scenarios: Option<Vec<String>>,
    pub bonus: bool,
}

impl Task {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            hints: Vec::new(),
            required_scenarios: None,
            bonus: false,
        }
    }

    pub fn requiring(mut self, scenarios: &[&str]) -> Self {
        self.required_scenarios = Some(scenarios.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_hints(mut self, hints: &[&str]) -> Self {
        self.hints = hints.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn bonus(mut self) -> Self {
        self.bonus = true;
        self
    }
}

pub struct ExerciseDefinition {
    pub slug: &'static str,
    pub title: &'static str,
    pub instructions: &'static str,
    /// Builds a fresh world for each visual scenario. IO-only exercises
    /// have none.
    pub factory: Option<ExerciseFactory>,
    /// Helper functions offered to IO scenarios.
    pub functions: fn() -> Vec<ExternalFunction>,
    pub tasks: Vec<Task>,
    pub scenarios: Vec<Scenario>,
    stubs: Vec<(Language, &'static str)>,
}

impl ExerciseDefinition {
    /// Starting code shown to the learner for `language`.
    pub fn stub(&self, language: Language) -> Option<&'static str> {
        self.stubs
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, stub)| *stub)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

impl std::fmt::Debug for ExerciseDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseDefinition")
            .field("slug", &self.slug)
            .field("tasks", &self.tasks.len())
            .field("scenarios", &self.scenarios.len())
            .finish()
    }
}

fn no_functions() -> Vec<ExternalFunction> {
    Vec::new()
}

/// Every bundled exercise.
pub fn registry() -> Vec<ExerciseDefinition> {
    vec![maze::definition(), raindrops::definition()]
}

pub fn find(slug: &str) -> Option<ExerciseDefinition> {
    registry().into_iter().find(|definition| definition.slug == slug)
}

pub fn slugs() -> Vec<&'static str> {
    registry().iter().map(|definition| definition.slug).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert_eq!(slugs(), vec!["maze", "raindrops"]);
        assert!(find("maze").is_some_and(|def| def.factory.is_some()));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_every_task_has_scenarios() {
        for definition in registry() {
            for task in &definition.tasks {
                let tagged = definition
                    .scenarios
                    .iter()
                    .any(|scenario| scenario.task_id == task.id);
                assert!(tagged, "{} has no scenarios for {}", definition.slug, task.id);
            }
        }
    }

    #[test]
    fn test_stubs_exist_for_both_languages() {
        let maze = maze::definition();
        assert!(maze.stub(Language::JikiScript).is_some());
        assert!(maze.stub(Language::JavaScript).is_some());
    }
}
