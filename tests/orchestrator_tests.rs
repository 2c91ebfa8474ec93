// End-to-end runs through the orchestrator with the bundled exercises

use std::cell::RefCell;
use std::rc::Rc;

use maplit::btreeset;
use steptrace::exercise::{self, run_program, TaskManager, TaskStatus, TestSuiteResult};
use steptrace::interpreter::Language;
use steptrace::orchestrator::{FrameLookup, ModalPresenter, Orchestrator, RunStatus, SoundPlayer};
use steptrace::runtime::LanguageFeatures;

const MAZE_SOLUTION: &str = "repeat 3 times do\n  move()\nend";

const RAINDROPS_SOLUTION: &str = r#"function raindrops(n) {
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

#[derive(Clone, Default)]
struct Events(Rc<RefCell<Vec<String>>>);

impl SoundPlayer for Events {
    fn play(&self, sound: &str) {
        self.0.borrow_mut().push(format!("sound:{}", sound));
    }
}

impl ModalPresenter for Events {
    fn show(&self, modal: &str) {
        self.0.borrow_mut().push(format!("modal:{}", modal));
    }
}

fn raindrops(code: &str) -> Orchestrator {
    let definition = exercise::find("raindrops").unwrap();
    Orchestrator::new(Language::JavaScript, code).with_exercise(definition)
}

#[test]
fn test_registry_lists_bundled_exercises() {
    assert_eq!(exercise::slugs(), vec!["maze", "raindrops"]);
    assert!(exercise::find("chess").is_none());
}

#[test]
fn test_raindrops_solution_completes_every_task() {
    let events = Events::default();
    let mut orchestrator = raindrops(RAINDROPS_SOLUTION)
        .with_sound_player(Box::new(events.clone()))
        .with_modal_presenter(Box::new(events.clone()));
    let results = orchestrator.run_code();
    assert!(results.all_passed());

    let state = orchestrator.state();
    assert_eq!(state.status, RunStatus::Success);
    assert_eq!(
        state.completed_tasks,
        vec!["single-sounds", "combined-sounds", "no-sound"]
    );
    assert!(state
        .task_progress
        .iter()
        .all(|progress| progress.status == TaskStatus::Completed && progress.completed_at.is_some()));
    assert_eq!(
        events.0.borrow().iter().filter(|event| event.starts_with("sound:")).count(),
        3
    );
}

#[test]
fn test_partial_solution_keeps_current_task() {
    let mut orchestrator = raindrops("function raindrops(n) {\n  return \"Pling\";\n}");
    orchestrator.run_code();

    let state = orchestrator.state();
    assert_eq!(state.status, RunStatus::Failure);
    assert_eq!(state.current_task_id.as_deref(), Some("single-sounds"));
    assert!(!state.is_spotlight_active);
    assert!(state.completed_tasks.is_empty());
    let single = &state.task_progress[0];
    assert_eq!(single.status, TaskStatus::InProgress);
    assert_eq!(single.passed_scenarios, vec!["raindrops-3"]);
}

#[test]
fn test_auto_play_follows_test_changes_until_paused() {
    let definition = exercise::find("maze").unwrap();
    let mut orchestrator =
        Orchestrator::new(Language::JikiScript, MAZE_SOLUTION).with_exercise(definition);
    orchestrator.run_code();
    assert!(orchestrator.state().is_playing);

    let second = orchestrator.state().tests[1].slug.clone();
    orchestrator.set_current_test(&second);
    assert!(orchestrator.state().is_playing);

    orchestrator.pause();
    assert!(orchestrator.state().information_widget.visible);
    let first = orchestrator.state().tests[0].slug.clone();
    orchestrator.set_current_test(&first);
    let state = orchestrator.state();
    assert!(!state.is_playing);
    assert!(!state.should_play_on_test_change);
    assert_eq!(state.current_frame, Some(0));
}

#[test]
fn test_playback_completes_and_reports_success_once() {
    let events = Events::default();
    let definition = exercise::find("maze").unwrap();
    let mut orchestrator = Orchestrator::new(Language::JikiScript, "move()\nmove()\nturn_right()\nmove()\nmove()")
        .with_exercise(definition)
        .with_modal_presenter(Box::new(events.clone()));
    orchestrator.run_code();
    assert_eq!(orchestrator.state().status, RunStatus::Failure);

    // The straight maze fails, so finishing playback shows nothing.
    orchestrator.tick(60_000.0);
    assert!(!orchestrator.state().is_playing);
    assert!(events.0.borrow().is_empty());

    orchestrator.set_code(MAZE_SOLUTION);
    assert!(orchestrator.state().has_code_been_edited);
    orchestrator.run_code();
    assert_eq!(orchestrator.state().status, RunStatus::Failure);
}

#[test]
fn test_folded_breakpoints_are_skipped() {
    let code = "set a to 1\nset b to 2\nset c to 3\nset d to 4\nset e to 5\nset f to 6";
    let mut orchestrator = Orchestrator::new(Language::JikiScript, code).with_playback(false, 1.0);
    orchestrator.run_code();
    orchestrator.set_breakpoints(btreeset! {2, 4, 6});
    orchestrator.set_folded_lines(btreeset! {2});

    let mut visited = Vec::new();
    while orchestrator.state().next_breakpoint_frame.is_some() {
        orchestrator.go_to_next_breakpoint();
        visited.push(orchestrator.state().highlighted_line);
    }
    assert_eq!(visited, vec![4, 6]);

    orchestrator.set_current_test_time(0, FrameLookup::Nearest, true);
    orchestrator.go_to_next_frame();
    assert_eq!(orchestrator.state().highlighted_line, 3);
}

#[test]
fn test_task_manager_tracks_whole_exercise() {
    let definition = exercise::find("raindrops").unwrap();
    let mut tasks = TaskManager::new(&definition);
    assert_eq!(tasks.current_task_id(), Some("single-sounds"));

    let results = TestSuiteResult {
        tests: definition
            .scenarios
            .iter()
            .map(|scenario| {
                exercise::run_scenario(
                    &definition,
                    scenario,
                    RAINDROPS_SOLUTION,
                    Language::JavaScript,
                    &LanguageFeatures::default(),
                )
            })
            .collect(),
    };
    let completed = tasks.update(&results, &definition, chrono::Utc::now());
    assert_eq!(completed.len(), 3);
    assert!(tasks.all_completed());
    assert_eq!(tasks.current_task_id(), None);
}

#[test]
fn test_external_results_replace_the_run() {
    let mut orchestrator = Orchestrator::new(Language::JikiScript, "set a to 1").with_playback(false, 1.0);
    orchestrator.run_code();
    orchestrator.go_to_next_frame();

    let program = run_program("set a to 1\nset b to 2", Language::JikiScript, &LanguageFeatures::default());
    orchestrator.set_test_suite_result(TestSuiteResult { tests: vec![program] });
    let state = orchestrator.state();
    assert_eq!(state.status, RunStatus::Success);
    assert_eq!(state.tests[0].frame_count, 2);
    assert_eq!(state.current_frame, Some(0));
    assert!(!state.is_playing);
}
