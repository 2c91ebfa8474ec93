//! Run orchestration
//!
//! The [`Orchestrator`] owns the code being edited, the results of the latest
//! run and the playback position inside the selected test. Every public
//! operation is one transition: it builds the next [`OrchestratorState`] from
//! the current one and commits it, notifying subscribers when something
//! changed.
//!
//! Playback is driven from outside with [`tick`](Orchestrator::tick). The
//! selected test's animation clock reports back through callbacks that queue
//! clock events; `tick` drains them into frame selection and completion
//! handling.

pub mod collaborators;
pub mod state;
pub mod store;

pub use collaborators::{ModalPresenter, Silent, SoundPlayer};
pub use state::{FrameLookup, InformationWidget, OrchestratorState, RunStatus, TestSummary};
pub use store::Store;

use chrono::Utc;
use crate::exercise::{
    run_program, run_scenario, ExerciseDefinition, ScenarioResult, TaskManager, TestSuiteResult,
};
use crate::interpreter::Language;
use crate::runtime::{Frame, LanguageFeatures, TIME_SCALE_FACTOR};
use crate::timeline::{
    find_nearest_frame, find_next_breakpoint_frame, find_next_frame, find_prev_breakpoint_frame,
    find_prev_frame, toggle_line,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const SUCCESS_MODAL: &str = "exercise-success-modal";
pub const TASK_COMPLETED_SOUND: &str = "task-completed";

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClockEvent {
    Update(f64),
    Complete,
}

pub struct Orchestrator {
    store: Store<OrchestratorState>,
    definition: Option<ExerciseDefinition>,
    tasks: Option<TaskManager>,
    features: LanguageFeatures,
    results: TestSuiteResult,
    auto_play: bool,
    speed: f64,
    clock_events: Rc<RefCell<Vec<ClockEvent>>>,
    sounds: Box<dyn SoundPlayer>,
    modals: Box<dyn ModalPresenter>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", self.store.get())
            .field("definition", &self.definition)
            .field("results", &self.results.tests.len())
            .finish()
    }
}

/// Highlight frame `index` and refresh everything derived from it.
fn select_frame(frames: &[Frame], next: &mut OrchestratorState, index: usize) {
    let Some(frame) = frames.get(index) else {
        return;
    };
    next.current_frame = Some(index);
    next.highlighted_line = frame.line();
    next.information_widget.line = frame.line();
    next.information_widget.status = frame.status();
    next.information_widget.html = frame.generate_description();
    recalculate_navigation(frames, next);
}

fn recalculate_navigation(frames: &[Frame], next: &mut OrchestratorState) {
    let current = next.current_frame.and_then(|index| frames.get(index));
    next.prev_frame = current.and_then(|frame| find_prev_frame(frames, frame, &next.folded_lines));
    next.next_frame = current.and_then(|frame| find_next_frame(frames, frame, &next.folded_lines));
    next.prev_breakpoint_frame =
        find_prev_breakpoint_frame(frames, current, &next.breakpoints, &next.folded_lines);
    next.next_breakpoint_frame =
        find_next_breakpoint_frame(frames, current, &next.breakpoints, &next.folded_lines);
}

fn clear_selection(next: &mut OrchestratorState) {
    next.current_test_time = 0;
    next.current_frame = None;
    next.highlighted_line = 0;
    next.prev_frame = None;
    next.next_frame = None;
    next.prev_breakpoint_frame = None;
    next.next_breakpoint_frame = None;
    next.information_widget = InformationWidget::default();
}

impl Orchestrator {
    pub fn new(language: Language, code: impl Into<String>) -> Self {
        Orchestrator {
            store: Store::new(OrchestratorState::new(language, code.into())),
            definition: None,
            tasks: None,
            features: LanguageFeatures::default(),
            results: TestSuiteResult::default(),
            auto_play: true,
            speed: 1.0,
            clock_events: Rc::new(RefCell::new(Vec::new())),
            sounds: Box::new(Silent),
            modals: Box::new(Silent),
        }
    }

    pub fn with_exercise(mut self, definition: ExerciseDefinition) -> Self {
        let mut next = self.store.draft();
        next.exercise_slug = Some(definition.slug.to_string());
        self.tasks = Some(TaskManager::new(&definition));
        self.definition = Some(definition);
        self.sync_tasks(&mut next);
        self.store.commit(next);
        self
    }

    pub fn with_language_features(mut self, features: LanguageFeatures) -> Self {
        self.features = features;
        self
    }

    /// `auto_play` decides whether a fresh run starts playing its first
    /// test; `speed` scales the wall time fed to [`tick`](Self::tick).
    pub fn with_playback(mut self, auto_play: bool, speed: f64) -> Self {
        self.auto_play = auto_play;
        self.speed = if speed > 0.0 { speed } else { 1.0 };
        self.store
            .update(|state| state.should_play_on_test_change = auto_play);
        self
    }

    pub fn with_sound_player(mut self, sounds: Box<dyn SoundPlayer>) -> Self {
        self.sounds = sounds;
        self
    }

    pub fn with_modal_presenter(mut self, modals: Box<dyn ModalPresenter>) -> Self {
        self.modals = modals;
        self
    }

    pub fn state(&self) -> &OrchestratorState {
        self.store.get()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&OrchestratorState) + 'static) {
        self.store.subscribe(subscriber);
    }

    pub fn definition(&self) -> Option<&ExerciseDefinition> {
        self.definition.as_ref()
    }

    pub fn results(&self) -> &TestSuiteResult {
        &self.results
    }

    pub fn current_test(&self) -> Option<&ScenarioResult> {
        let slug = self.state().current_test_slug.as_deref()?;
        self.results.get(slug)
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        let index = self.state().current_frame?;
        self.current_test()?.frames.get(index)
    }

    fn frames_of(&self, slug: &str) -> &[Frame] {
        self.results
            .get(slug)
            .map(|test| test.frames.frames())
            .unwrap_or(&[])
    }

    fn current_frames(&self, next: &OrchestratorState) -> &[Frame] {
        next.current_test_slug
            .as_deref()
            .map(|slug| self.frames_of(slug))
            .unwrap_or(&[])
    }

    fn current_result_mut(&mut self, next: &OrchestratorState) -> Option<&mut ScenarioResult> {
        let slug = next.current_test_slug.as_deref()?;
        self.results.get_mut(slug)
    }

    pub fn set_code(&mut self, code: &str) {
        self.store.update(|state| {
            if state.code != code {
                state.code = code.to_string();
                state.has_code_been_edited = true;
            }
        });
    }

    /// Run the code against every scenario of the exercise, or as a plain
    /// program when there is no exercise, then show the results.
    pub fn run_code(&mut self) -> &TestSuiteResult {
        self.store.update(|state| state.status = RunStatus::Running);
        let (code, language) = {
            let state = self.state();
            (state.code.clone(), state.language)
        };

        let results = match &self.definition {
            Some(definition) => TestSuiteResult {
                tests: definition
                    .scenarios
                    .iter()
                    .map(|scenario| run_scenario(definition, scenario, &code, language, &self.features))
                    .collect(),
            },
            None => TestSuiteResult {
                tests: vec![run_program(&code, language, &self.features)],
            },
        };
        info!(
            tests = results.tests.len(),
            passed = results.tests.iter().filter(|test| test.passed()).count(),
            "run finished"
        );

        let newly_completed = match (&mut self.tasks, &self.definition) {
            (Some(tasks), Some(definition)) => tasks.update(&results, definition, Utc::now()),
            _ => Vec::new(),
        };

        let mut next = self.store.draft();
        self.apply_results(&mut next, results);
        self.sync_tasks(&mut next);
        self.store.commit(next);

        for _ in &newly_completed {
            self.sounds.play(TASK_COMPLETED_SOUND);
        }
        &self.results
    }

    /// Replace the shown results and select their first test.
    pub fn set_test_suite_result(&mut self, results: TestSuiteResult) {
        let mut next = self.store.draft();
        self.apply_results(&mut next, results);
        self.store.commit(next);
    }

    fn apply_results(&mut self, next: &mut OrchestratorState, results: TestSuiteResult) {
        self.detach_clock(next);
        self.results = results;

        let all_passed = self.results.all_passed();
        next.tests = self
            .results
            .tests
            .iter()
            .map(|test| TestSummary {
                slug: test.slug.clone(),
                name: test.name.clone(),
                status: test.status,
                frame_count: test.frames.len(),
            })
            .collect();
        next.status = if all_passed {
            RunStatus::Success
        } else {
            RunStatus::Failure
        };
        next.current_test_slug = None;
        clear_selection(next);
        next.test_current_times.clear();
        next.has_code_been_edited = false;
        next.should_play_on_test_change = self.auto_play;
        next.is_playing = false;
        next.is_spotlight_active = all_passed && !next.has_ever_had_successful_run;
        next.has_ever_had_successful_run |= all_passed;
        debug!(status = ?next.status, spotlight = next.is_spotlight_active, "results applied");

        if let Some(first) = self.results.tests.first().map(|test| test.slug.clone()) {
            self.switch_test(next, &first);
        }
    }

    fn sync_tasks(&self, next: &mut OrchestratorState) {
        let (Some(tasks), Some(definition)) = (&self.tasks, &self.definition) else {
            return;
        };
        next.task_progress = definition
            .tasks
            .iter()
            .filter_map(|task| tasks.progress(&task.id).cloned())
            .collect();
        next.completed_tasks = tasks.completed_task_ids();
        next.current_task_id = tasks.current_task_id().map(str::to_string);
    }

    pub fn set_current_task(&mut self, task_id: &str) {
        let changed = self
            .tasks
            .as_mut()
            .is_some_and(|tasks| tasks.set_current_task(task_id));
        if changed {
            let mut next = self.store.draft();
            self.sync_tasks(&mut next);
            self.store.commit(next);
        }
    }

    /// Stop listening to the selected test's clock.
    fn detach_clock(&mut self, next: &OrchestratorState) {
        if let Some(test) = self.current_result_mut(next) {
            test.animation_timeline.clear_update_callbacks();
            test.animation_timeline.clear_complete_callbacks();
            test.animation_timeline.pause();
        }
        self.clock_events.borrow_mut().clear();
    }

    pub fn set_current_test(&mut self, slug: &str) {
        let mut next = self.store.draft();
        if self.switch_test(&mut next, slug) {
            self.store.commit(next);
        }
    }

    fn switch_test(&mut self, next: &mut OrchestratorState, slug: &str) -> bool {
        if next.current_test_slug.as_deref() == Some(slug) {
            return false;
        }
        if self.results.get(slug).is_none() {
            warn!(slug, "no such test");
            return false;
        }

        self.detach_clock(next);
        next.current_test_slug = Some(slug.to_string());
        next.is_playing = false;
        clear_selection(next);

        let first_frame_time = self.frames_of(slug).first().map_or(0, Frame::time);
        let time = next
            .test_current_times
            .get(slug)
            .copied()
            .unwrap_or(first_frame_time);

        if let Some(test) = self.results.get_mut(slug) {
            let updates = Rc::clone(&self.clock_events);
            test.animation_timeline
                .on_update(move |ms| updates.borrow_mut().push(ClockEvent::Update(ms)));
            let completes = Rc::clone(&self.clock_events);
            test.animation_timeline
                .on_complete(move |_| completes.borrow_mut().push(ClockEvent::Complete));
            test.animation_timeline.seek(time);
        }
        self.apply_time(next, time, FrameLookup::Nearest, true);

        if next.should_play_on_test_change {
            self.start_playing(next);
        }
        debug!(slug, time, playing = next.is_playing, "test selected");
        true
    }

    /// Move the selected test to `time` (µs) and seek its clock there.
    pub fn set_current_test_time(&mut self, time: u64, lookup: FrameLookup, force: bool) {
        let mut next = self.store.draft();
        if !self.apply_time(&mut next, time, lookup, force) {
            return;
        }
        if let Some(test) = self.current_result_mut(&next) {
            test.animation_timeline.seek(time);
        }
        self.store.commit(next);
    }

    fn apply_time(&self, next: &mut OrchestratorState, time: u64, lookup: FrameLookup, force: bool) -> bool {
        let Some(slug) = next.current_test_slug.clone() else {
            return false;
        };
        if next.current_test_time == time && !force {
            return false;
        }

        next.current_test_time = time;
        next.test_current_times.insert(slug, time);

        let frames = self.current_frames(next);
        let index = match lookup {
            FrameLookup::Nearest => find_nearest_frame(frames, time, &next.folded_lines),
            FrameLookup::Exact => frames.iter().position(|frame| frame.time() == time),
        };
        if let Some(index) = index {
            select_frame(frames, next, index);
        }
        true
    }

    pub fn set_is_playing(&mut self, playing: bool) {
        let mut next = self.store.draft();
        if playing {
            self.start_playing(&mut next);
        } else {
            self.stop_playing(&mut next);
        }
        self.store.commit(next);
    }

    fn start_playing(&mut self, next: &mut OrchestratorState) {
        if next.is_playing {
            return;
        }
        let completed = self
            .current_result_mut(next)
            .is_some_and(|test| test.animation_timeline.completed());
        if completed {
            self.apply_time(next, 0, FrameLookup::Exact, false);
        }

        next.is_playing = true;
        next.information_widget.visible = false;
        if let Some(test) = self.current_result_mut(next) {
            test.animation_timeline.play();
        }
    }

    fn stop_playing(&mut self, next: &mut OrchestratorState) {
        next.is_playing = false;
        if let Some(test) = self.current_result_mut(next) {
            test.animation_timeline.pause();
        }
    }

    pub fn play(&mut self) {
        if self.state().current_test_slug.is_none() {
            return;
        }
        self.set_is_playing(true);
    }

    /// Pause on the learner's behalf: later test switches stay paused and
    /// the position snaps to the nearest frame.
    pub fn pause(&mut self) {
        let mut next = self.store.draft();
        if next.current_test_slug.is_none() {
            return;
        }
        self.stop_playing(&mut next);
        next.should_play_on_test_change = false;

        let frames = self.current_frames(&next);
        let snapped = find_nearest_frame(frames, next.current_test_time, &next.folded_lines)
            .and_then(|index| frames.get(index))
            .map(Frame::time);
        if let Some(time) = snapped {
            self.apply_time(&mut next, time, FrameLookup::Exact, true);
            if let Some(test) = self.current_result_mut(&next) {
                test.animation_timeline.seek(time);
            }
        }
        next.information_widget.visible = next.current_frame.is_some();
        self.store.commit(next);
    }

    /// Feed `elapsed_ms` of wall time to the selected test's clock.
    pub fn tick(&mut self, elapsed_ms: f64) {
        let speed = self.speed;
        let next = self.store.draft();
        if let Some(test) = self.current_result_mut(&next) {
            test.animation_timeline.advance(elapsed_ms * speed);
        }

        let events = std::mem::take(&mut *self.clock_events.borrow_mut());
        for event in events {
            match event {
                ClockEvent::Update(ms) => {
                    let time = (ms * TIME_SCALE_FACTOR as f64).round() as u64;
                    let mut next = self.store.draft();
                    if self.apply_time(&mut next, time, FrameLookup::Exact, false) {
                        self.store.commit(next);
                    }
                }
                ClockEvent::Complete => self.complete_playback(),
            }
        }
    }

    fn complete_playback(&mut self) {
        let mut next = self.store.draft();
        self.stop_playing(&mut next);
        if next.all_tests_passed() && !next.was_success_modal_shown {
            info!("every test passed");
            self.modals.show(SUCCESS_MODAL);
            next.was_success_modal_shown = true;
            next.is_spotlight_active = false;
        }
        self.store.commit(next);
    }

    fn update_lines(&mut self, f: impl FnOnce(&mut OrchestratorState)) {
        let mut next = self.store.draft();
        f(&mut next);
        let frames = self.current_frames(&next);
        recalculate_navigation(frames, &mut next);
        self.store.commit(next);
    }

    pub fn set_breakpoints(&mut self, lines: BTreeSet<usize>) {
        self.update_lines(|next| next.breakpoints = lines);
    }

    pub fn toggle_breakpoint(&mut self, line: usize) {
        self.update_lines(|next| {
            toggle_line(&mut next.breakpoints, line);
        });
    }

    pub fn set_folded_lines(&mut self, lines: BTreeSet<usize>) {
        self.update_lines(|next| next.folded_lines = lines);
    }

    pub fn toggle_fold(&mut self, line: usize) {
        self.update_lines(|next| {
            toggle_line(&mut next.folded_lines, line);
        });
    }

    fn go_to_frame(&mut self, index: Option<usize>) {
        let time = index
            .and_then(|index| self.current_frames(self.state()).get(index))
            .map(Frame::time);
        if let Some(time) = time {
            self.set_current_test_time(time, FrameLookup::Exact, false);
        }
    }

    pub fn go_to_next_frame(&mut self) {
        self.go_to_frame(self.state().next_frame);
    }

    pub fn go_to_prev_frame(&mut self) {
        self.go_to_frame(self.state().prev_frame);
    }

    pub fn go_to_next_breakpoint(&mut self) {
        self.go_to_frame(self.state().next_breakpoint_frame);
    }

    pub fn go_to_prev_breakpoint(&mut self) {
        self.go_to_frame(self.state().prev_breakpoint_frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{maze, raindrops};
    use maplit::btreeset;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl SoundPlayer for Recorder {
        fn play(&self, sound: &str) {
            self.0.borrow_mut().push(sound.to_string());
        }
    }

    impl ModalPresenter for Recorder {
        fn show(&self, modal: &str) {
            self.0.borrow_mut().push(modal.to_string());
        }
    }

    fn corner_maze() -> ExerciseDefinition {
        let mut definition = maze::definition();
        definition.scenarios.retain(|scenario| scenario.slug == "corner");
        definition.tasks.retain(|task| task.id == "corner");
        definition
    }

    const CORNER_SOLUTION: &str = "move()\nmove()\nturn_right()\nmove()\nmove()";

    const RAINDROPS: &str = "function raindrops(n) {\n  if (n % 3 === 0) {\n    return \"Pling\";\n  }\n  return \"Plong\";\n}";

    const SEVEN_LINES: &str = "set a to 1\nset b to 2\nset c to 3\nset d to 4\nset e to 5\nset f to 6\nset g to 7";

    #[test]
    fn test_successful_run_auto_plays_first_test() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, CORNER_SOLUTION)
            .with_exercise(corner_maze());
        orchestrator.run_code();

        let state = orchestrator.state();
        assert_eq!(state.status, RunStatus::Success);
        assert_eq!(state.current_test_slug.as_deref(), Some("corner"));
        assert!(state.is_playing);
        assert!(state.is_spotlight_active);
        assert!(state.has_ever_had_successful_run);
        assert_eq!(state.current_frame, Some(0));
        assert_eq!(state.highlighted_line, 1);
        assert_eq!(state.completed_tasks, vec!["corner"]);
    }

    #[test]
    fn test_success_modal_fires_once() {
        let recorder = Recorder::default();
        let mut orchestrator = Orchestrator::new(Language::JikiScript, CORNER_SOLUTION)
            .with_exercise(corner_maze())
            .with_modal_presenter(Box::new(recorder.clone()))
            .with_sound_player(Box::new(recorder.clone()));

        orchestrator.run_code();
        assert_eq!(*recorder.0.borrow(), vec![TASK_COMPLETED_SOUND]);

        orchestrator.tick(500.0);
        assert!(orchestrator.state().is_playing);
        orchestrator.tick(10_000.0);
        let state = orchestrator.state();
        assert!(!state.is_playing);
        assert!(state.was_success_modal_shown);
        assert!(!state.is_spotlight_active);
        assert_eq!(state.current_frame, Some(4));
        assert_eq!(
            *recorder.0.borrow(),
            vec![TASK_COMPLETED_SOUND, SUCCESS_MODAL]
        );

        orchestrator.run_code();
        assert!(!orchestrator.state().is_spotlight_active);
        orchestrator.tick(10_000.0);
        assert_eq!(recorder.0.borrow().len(), 2);
    }

    #[test]
    fn test_ticks_land_on_exact_frames() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, "move()\nmove()")
            .with_exercise(corner_maze());
        orchestrator.run_code();
        // playback starts at the first frame, which ends the first move
        assert_eq!(orchestrator.state().current_test_time, 200_000);
        assert_eq!(orchestrator.state().current_frame, Some(0));

        orchestrator.tick(150.0);
        assert_eq!(orchestrator.state().current_test_time, 350_000);
        assert_eq!(orchestrator.state().current_frame, Some(0));

        orchestrator.tick(1_000.0);
        assert_eq!(orchestrator.state().current_test_time, 400_001);
        assert_eq!(orchestrator.current_frame().map(Frame::line), Some(2));
        assert!(!orchestrator.state().is_playing);
        assert_eq!(orchestrator.state().status, RunStatus::Failure);
    }

    #[test]
    fn test_same_time_without_force_is_silent() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, SEVEN_LINES)
            .with_playback(false, 1.0);
        orchestrator.run_code();

        let notifications = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&notifications);
        orchestrator.subscribe(move |_| *counter.borrow_mut() += 1);

        orchestrator.set_current_test_time(3, FrameLookup::Exact, false);
        assert_eq!(*notifications.borrow(), 1);
        assert_eq!(orchestrator.state().current_frame, Some(3));
        orchestrator.set_current_test_time(3, FrameLookup::Exact, false);
        assert_eq!(*notifications.borrow(), 1);
    }

    #[test]
    fn test_manual_pause_stops_auto_play_on_test_change() {
        let mut orchestrator = Orchestrator::new(Language::JavaScript, RAINDROPS)
            .with_exercise(raindrops::definition());
        orchestrator.run_code();
        assert!(orchestrator.state().is_playing);

        orchestrator.set_current_test("raindrops-5");
        assert!(orchestrator.state().is_playing);

        orchestrator.pause();
        assert!(!orchestrator.state().should_play_on_test_change);
        assert!(orchestrator.state().information_widget.visible);
        orchestrator.set_current_test("raindrops-7");
        assert!(!orchestrator.state().is_playing);

        orchestrator.run_code();
        assert!(orchestrator.state().should_play_on_test_change);
        assert!(orchestrator.state().is_playing);
    }

    #[test]
    fn test_switching_back_restores_saved_time() {
        let mut orchestrator = Orchestrator::new(Language::JavaScript, RAINDROPS)
            .with_exercise(raindrops::definition())
            .with_playback(false, 1.0);
        orchestrator.run_code();

        orchestrator.go_to_next_frame();
        let saved = orchestrator.state().current_test_time;
        assert!(saved > 0);

        orchestrator.set_current_test("raindrops-5");
        let first = orchestrator.current_test().unwrap().frames[0].time();
        assert_eq!(orchestrator.state().current_test_time, first);
        orchestrator.set_current_test("raindrops-3");
        assert_eq!(orchestrator.state().current_test_time, saved);

        orchestrator.run_code();
        assert_eq!(orchestrator.state().current_test_slug.as_deref(), Some("raindrops-3"));
        let first = orchestrator.current_test().unwrap().frames[0].time();
        assert_eq!(orchestrator.state().current_test_time, first);
        assert!(orchestrator.state().test_current_times.len() <= 1);
    }

    #[test]
    fn test_breakpoint_navigation_skips_folded_lines() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, SEVEN_LINES)
            .with_playback(false, 1.0);
        orchestrator.run_code();
        orchestrator.set_breakpoints(btreeset! {2, 4, 6});
        orchestrator.toggle_fold(2);
        assert_eq!(orchestrator.state().current_frame, Some(0));
        assert_eq!(orchestrator.state().next_breakpoint_frame, Some(3));

        orchestrator.go_to_next_breakpoint();
        assert_eq!(orchestrator.state().highlighted_line, 4);
        orchestrator.go_to_next_breakpoint();
        assert_eq!(orchestrator.state().highlighted_line, 6);
        assert_eq!(orchestrator.state().next_breakpoint_frame, None);

        orchestrator.go_to_prev_breakpoint();
        assert_eq!(orchestrator.state().highlighted_line, 4);
        assert_eq!(orchestrator.state().prev_breakpoint_frame, None);

        orchestrator.go_to_prev_frame();
        assert_eq!(orchestrator.state().highlighted_line, 3);
        orchestrator.go_to_prev_frame();
        assert_eq!(orchestrator.state().highlighted_line, 1);
    }

    #[test]
    fn test_folding_does_not_move_current_frame() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, SEVEN_LINES)
            .with_playback(false, 1.0);
        orchestrator.run_code();
        orchestrator.go_to_next_frame();
        assert_eq!(orchestrator.state().highlighted_line, 2);

        orchestrator.toggle_fold(2);
        assert_eq!(orchestrator.state().current_frame, Some(1));
        assert_eq!(orchestrator.state().next_frame, Some(2));
        assert_eq!(orchestrator.state().prev_frame, Some(0));
    }

    #[test]
    fn test_editing_code_is_cleared_by_a_run() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, "log 1");
        orchestrator.set_code("log 2");
        assert!(orchestrator.state().has_code_been_edited);
        orchestrator.run_code();
        assert!(!orchestrator.state().has_code_been_edited);
        assert_eq!(orchestrator.results().tests[0].log_lines[0].output, "2");
    }

    #[test]
    fn test_unknown_test_is_ignored() {
        let mut orchestrator = Orchestrator::new(Language::JikiScript, "log 1");
        orchestrator.run_code();
        orchestrator.set_current_test("missing");
        assert_eq!(orchestrator.state().current_test_slug.as_deref(), Some("program"));
    }
}
