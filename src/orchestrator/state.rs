use crate::exercise::{ScenarioStatus, TaskProgress};
use crate::interpreter::Language;
use crate::runtime::FrameStatus;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failure,
}

/// How a requested time picks its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLookup {
    /// Closest visible frame.
    Nearest,
    /// Only a frame at exactly this time; otherwise the current frame stays.
    Exact,
}

/// One test of the latest run, as shown in the test list.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub slug: String,
    pub name: String,
    pub status: ScenarioStatus,
    pub frame_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InformationWidget {
    pub visible: bool,
    pub line: usize,
    pub status: FrameStatus,
    pub html: String,
}

impl Default for InformationWidget {
    fn default() -> Self {
        InformationWidget {
            visible: false,
            line: 0,
            status: FrameStatus::Success,
            html: String::new(),
        }
    }
}

/// Everything a view needs to render a run. Frame positions are indices
/// into the current test's trace.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorState {
    pub exercise_slug: Option<String>,
    pub code: String,
    pub language: Language,
    pub status: RunStatus,
    pub tests: Vec<TestSummary>,
    pub current_test_slug: Option<String>,
    /// Microseconds.
    pub current_test_time: u64,
    pub current_frame: Option<usize>,
    /// 0 when no frame is selected.
    pub highlighted_line: usize,
    pub is_playing: bool,
    pub should_play_on_test_change: bool,
    pub test_current_times: BTreeMap<String, u64>,
    pub has_code_been_edited: bool,
    pub has_ever_had_successful_run: bool,
    pub was_success_modal_shown: bool,
    pub is_spotlight_active: bool,
    pub breakpoints: BTreeSet<usize>,
    pub folded_lines: BTreeSet<usize>,
    pub prev_frame: Option<usize>,
    pub next_frame: Option<usize>,
    pub prev_breakpoint_frame: Option<usize>,
    pub next_breakpoint_frame: Option<usize>,
    pub information_widget: InformationWidget,
    pub task_progress: Vec<TaskProgress>,
    pub completed_tasks: Vec<String>,
    pub current_task_id: Option<String>,
}

impl OrchestratorState {
    pub fn new(language: Language, code: String) -> Self {
        OrchestratorState {
            exercise_slug: None,
            code,
            language,
            status: RunStatus::Idle,
            tests: Vec::new(),
            current_test_slug: None,
            current_test_time: 0,
            current_frame: None,
            highlighted_line: 0,
            is_playing: false,
            should_play_on_test_change: true,
            test_current_times: BTreeMap::new(),
            has_code_been_edited: false,
            has_ever_had_successful_run: false,
            was_success_modal_shown: false,
            is_spotlight_active: false,
            breakpoints: BTreeSet::new(),
            folded_lines: BTreeSet::new(),
            prev_frame: None,
            next_frame: None,
            prev_breakpoint_frame: None,
            next_breakpoint_frame: None,
            information_widget: InformationWidget::default(),
            task_progress: Vec::new(),
            completed_tasks: Vec::new(),
            current_task_id: None,
        }
    }

    pub fn all_tests_passed(&self) -> bool {
        !self.tests.is_empty()
            && self
                .tests
                .iter()
                .all(|test| test.status == ScenarioStatus::Pass)
    }
}
