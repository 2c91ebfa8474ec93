//! Task progress across test runs
//!
//! A task is complete once every scenario it requires has passed in a single
//! run. Progress is recomputed from scratch on every run, but a completion
//! time, once set, is kept until the task falls back out of completion.

use super::scenario::TestSuiteResult;
use super::{ExerciseDefinition, Task};
use rustc_hash::FxHashMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub status: TaskStatus,
    /// Slugs of the required scenarios that passed, in requirement order.
    pub passed_scenarios: Vec<String>,
    pub total_scenarios: usize,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct TaskManager {
    order: Vec<(String, bool)>,
    progress: FxHashMap<String, TaskProgress>,
    current_task_id: Option<String>,
}

/// Slugs that must pass for `task` to count as done.
fn required_scenarios(task: &Task, definition: &ExerciseDefinition) -> Vec<String> {
    match &task.required_scenarios {
        Some(required) => required.clone(),
        None => definition
            .scenarios
            .iter()
            .filter(|scenario| scenario.task_id == task.id)
            .map(|scenario| scenario.slug.clone())
            .collect(),
    }
}

impl TaskManager {
    pub fn new(definition: &ExerciseDefinition) -> Self {
        let mut progress = FxHashMap::default();
        for task in &definition.tasks {
            progress.insert(
                task.id.clone(),
                TaskProgress {
                    task_id: task.id.clone(),
                    status: TaskStatus::NotStarted,
                    passed_scenarios: Vec::new(),
                    total_scenarios: required_scenarios(task, definition).len(),
                    completed_at: None,
                },
            );
        }
        let mut manager = TaskManager {
            order: definition
                .tasks
                .iter()
                .map(|task| (task.id.clone(), task.bonus))
                .collect(),
            progress,
            current_task_id: None,
        };
        manager.current_task_id = manager.next_incomplete();
        manager
    }

    /// Fold a run's results into task progress. Returns the ids of tasks that
    /// became complete with this run, in task order.
    pub fn update(
        &mut self,
        results: &TestSuiteResult,
        definition: &ExerciseDefinition,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut newly_completed = Vec::new();

        for task in &definition.tasks {
            let required = required_scenarios(task, definition);
            let mut passed: Vec<String> = Vec::new();
            for slug in &required {
                if !passed.contains(slug) && results.get(slug).is_some_and(|result| result.passed()) {
                    passed.push(slug.clone());
                }
            }
            let status = if !required.is_empty() && passed.len() == required.len() {
                TaskStatus::Completed
            } else if !passed.is_empty() {
                TaskStatus::InProgress
            } else {
                TaskStatus::NotStarted
            };

            let entry = self.progress.entry(task.id.clone()).or_insert_with(|| TaskProgress {
                task_id: task.id.clone(),
                status: TaskStatus::NotStarted,
                passed_scenarios: Vec::new(),
                total_scenarios: 0,
                completed_at: None,
            });
            let was_completed = entry.status == TaskStatus::Completed;
            entry.status = status;
            entry.passed_scenarios = passed;
            entry.total_scenarios = required.len();
            match status {
                TaskStatus::Completed if !was_completed => {
                    entry.completed_at = Some(now);
                    newly_completed.push(task.id.clone());
                }
                TaskStatus::Completed => {}
                _ => entry.completed_at = None,
            }
        }

        if self
            .current_task_id
            .as_ref()
            .map_or(true, |id| self.is_completed(id))
        {
            self.current_task_id = self.next_incomplete();
        }
        if !newly_completed.is_empty() {
            info!(tasks = ?newly_completed, "tasks completed");
        }
        newly_completed
    }

    /// First incomplete required task, else the first incomplete bonus task.
    fn next_incomplete(&self) -> Option<String> {
        let incomplete = |bonus: bool| {
            self.order
                .iter()
                .find(|(id, is_bonus)| *is_bonus == bonus && !self.is_completed(id))
                .map(|(id, _)| id.clone())
        };
        incomplete(false).or_else(|| incomplete(true))
    }

    pub fn status(&self, task_id: &str) -> Option<TaskStatus> {
        self.progress.get(task_id).map(|progress| progress.status)
    }

    pub fn progress(&self, task_id: &str) -> Option<&TaskProgress> {
        self.progress.get(task_id)
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.status(task_id) == Some(TaskStatus::Completed)
    }

    pub fn completed_task_ids(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|(id, _)| self.is_completed(id))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn all_completed(&self) -> bool {
        self.order.iter().all(|(id, _)| self.is_completed(id))
    }

    pub fn current_task_id(&self) -> Option<&str> {
        self.current_task_id.as_deref()
    }

    /// Point the learner at `task_id`. Unknown ids are ignored.
    pub fn set_current_task(&mut self, task_id: &str) -> bool {
        if !self.progress.contains_key(task_id) {
            return false;
        }
        self.current_task_id = Some(task_id.to_string());
        true
    }
}
