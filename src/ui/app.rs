//! Main TUI application state and logic

use crate::orchestrator::{FrameLookup, Orchestrator};
use crate::runtime::Frame as TraceFrame;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::panes::{
    render_scenarios_pane, render_source_pane, render_status_bar, render_terminal_pane,
    render_variables_pane, ScenariosRenderData, SourceRenderData, SourceScrollState,
    StatusRenderData, VariablesRenderData, VariablesScrollState,
};

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Scenarios,
    Variables,
    Terminal,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> terminal -> scenarios -> variables)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Scenarios,
            FocusedPane::Scenarios => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Variables,
            FocusedPane::Terminal => FocusedPane::Source,
            FocusedPane::Scenarios => FocusedPane::Terminal,
            FocusedPane::Variables => FocusedPane::Scenarios,
        }
    }
}

/// The main application state
pub struct App {
    pub orchestrator: Orchestrator,

    pub focused_pane: FocusedPane,

    /// Line the `b`/`f` toggles act on.
    pub cursor_line: usize,

    pub source_scroll: SourceScrollState,
    pub variables_scroll: VariablesScrollState,
    pub terminal_scroll: usize,

    pub should_quit: bool,

    pub status_message: String,

    last_tick: Instant,

    /// Set by the orchestrator subscription; cleared after each draw.
    needs_redraw: Rc<Cell<bool>>,
}

impl App {
    pub fn new(mut orchestrator: Orchestrator) -> Self {
        let needs_redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&needs_redraw);
        orchestrator.subscribe(move |_| flag.set(true));

        App {
            orchestrator,
            focused_pane: FocusedPane::Source,
            cursor_line: 1,
            source_scroll: SourceScrollState {
                offset: 0,
                target_line_row: None,
            },
            variables_scroll: VariablesScrollState { offset: 0 },
            terminal_scroll: usize::MAX,
            should_quit: false,
            status_message: String::from("Ready!"),
            last_tick: Instant::now(),
            needs_redraw,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.last_tick = Instant::now();
        loop {
            if self.needs_redraw.replace(false) {
                terminal.draw(|f| self.render(f))?;
            }

            if self.should_quit {
                break;
            }

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
                    Event::Resize(..) => self.needs_redraw.set(true),
                    _ => {}
                }
            }

            let now = Instant::now();
            let elapsed = now.duration_since(self.last_tick);
            self.last_tick = now;
            if self.orchestrator.state().is_playing {
                self.orchestrator.tick(elapsed.as_secs_f64() * 1000.0);
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Scenarios (top) | Frame (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(columns[1]);

        let state = self.orchestrator.state();
        let test = self.orchestrator.current_test();
        let current = self.orchestrator.current_frame();

        render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source: &state.code,
                language: state.language,
                highlighted_line: state.highlighted_line,
                cursor_line: self.cursor_line,
                is_error: current.is_some_and(TraceFrame::is_error),
                breakpoints: &state.breakpoints,
                folded_lines: &state.folded_lines,
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        render_terminal_pane(
            frame,
            left_rows[1],
            test.map(|test| &test.log_lines[..]).unwrap_or(&[]),
            state.current_test_time,
            self.focused_pane == FocusedPane::Terminal,
            &mut self.terminal_scroll,
        );

        render_scenarios_pane(
            frame,
            right_rows[0],
            ScenariosRenderData {
                tests: &state.tests,
                current_test: state.current_test_slug.as_deref(),
                failures: test
                    .map(|test| {
                        test.expects
                            .iter()
                            .filter(|expect| !expect.pass)
                            .map(|expect| expect.error_html.as_str())
                            .collect()
                    })
                    .unwrap_or_default(),
                tasks: &state.task_progress,
                current_task: state.current_task_id.as_deref(),
            },
            self.focused_pane == FocusedPane::Scenarios,
        );

        render_variables_pane(
            frame,
            right_rows[1],
            VariablesRenderData {
                frame: current,
                index: state.current_frame,
                frame_count: test.map_or(0, |test| test.frames.len()),
            },
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                run_status: state.status,
                time_ms: state.current_test_time as f64 / 1000.0,
                duration_ms: test.map_or(0.0, |test| test.animation_timeline.duration_ms()),
                is_playing: state.is_playing,
                is_error: current.is_some_and(TraceFrame::is_error),
            },
        );
    }

    /// Stop playback before a manual jump so the clock does not move on.
    fn take_control(&mut self) {
        if self.orchestrator.state().is_playing {
            self.orchestrator.pause();
        }
    }

    fn select_test(&mut self, offset: isize) {
        let state = self.orchestrator.state();
        let Some(position) = state
            .tests
            .iter()
            .position(|test| Some(test.slug.as_str()) == state.current_test_slug.as_deref())
        else {
            return;
        };
        let target = position.saturating_add_signed(offset);
        if let Some(slug) = state.tests.get(target).map(|test| test.slug.clone()) {
            self.orchestrator.set_current_test(&slug);
            self.status_message = format!("Selected {}", slug);
        }
    }

    fn line_count(&self) -> usize {
        self.orchestrator.state().code.lines().count().max(1)
    }

    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) {
        self.needs_redraw.set(true);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char(' ') => {
                if self.orchestrator.state().is_playing {
                    self.orchestrator.pause();
                    self.status_message = "Paused".to_string();
                } else {
                    self.orchestrator.play();
                    self.status_message = "Playing...".to_string();
                }
            }
            KeyCode::Char('r') => {
                let results = self.orchestrator.run_code();
                let passed = results.tests.iter().filter(|test| test.passed()).count();
                self.status_message = format!("{}/{} passed", passed, results.tests.len());
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Left => {
                self.take_control();
                self.orchestrator.go_to_prev_frame();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Right => {
                self.take_control();
                self.orchestrator.go_to_next_frame();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Char('[') => {
                self.take_control();
                self.orchestrator.go_to_prev_breakpoint();
            }
            KeyCode::Char(']') => {
                self.take_control();
                self.orchestrator.go_to_next_breakpoint();
            }
            KeyCode::Char('b') => {
                self.orchestrator.toggle_breakpoint(self.cursor_line);
                self.status_message = format!("Toggled breakpoint on line {}", self.cursor_line);
            }
            KeyCode::Char('f') => {
                self.orchestrator.toggle_fold(self.cursor_line);
                self.status_message = format!("Toggled fold on line {}", self.cursor_line);
            }
            KeyCode::Backspace | KeyCode::Home => {
                self.take_control();
                self.orchestrator
                    .set_current_test_time(0, FrameLookup::Nearest, true);
                self.status_message = "Jumped to start".to_string();
            }
            KeyCode::Enter | KeyCode::End => {
                self.take_control();
                let last = self
                    .orchestrator
                    .current_test()
                    .and_then(|test| test.frames.last())
                    .map(TraceFrame::time);
                if let Some(time) = last {
                    self.orchestrator
                        .set_current_test_time(time, FrameLookup::Nearest, true);
                }
                self.status_message = "Jumped to end".to_string();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => self.cursor_line = self.cursor_line.saturating_sub(1).max(1),
                FocusedPane::Scenarios => self.select_test(-1),
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_sub(1)
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1)
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    self.cursor_line = (self.cursor_line + 1).min(self.line_count())
                }
                FocusedPane::Scenarios => self.select_test(1),
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_add(1)
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1)
                }
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Language;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
        let orchestrator = Orchestrator::new(Language::JikiScript, "set a to 1\nset b to 2\nset c to 3")
            .with_playback(false, 1.0);
        let mut app = App::new(orchestrator);
        press(&mut app, KeyCode::Char('r'));
        app
    }

    #[test]
    fn test_run_and_step() {
        let mut app = app();
        assert_eq!(app.status_message, "1/1 passed");
        assert_eq!(app.orchestrator.state().highlighted_line, 1);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.orchestrator.state().highlighted_line, 3);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.orchestrator.state().highlighted_line, 1);
        press(&mut app, KeyCode::End);
        assert_eq!(app.orchestrator.state().highlighted_line, 3);
    }

    #[test]
    fn test_cursor_toggles_breakpoints() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('b'));
        assert!(app.orchestrator.state().breakpoints.contains(&2));

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.orchestrator.state().highlighted_line, 2);
        press(&mut app, KeyCode::Char('b'));
        assert!(app.orchestrator.state().breakpoints.is_empty());
    }

    #[test]
    fn test_cursor_stays_in_source() {
        let mut app = app();
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.cursor_line, 3);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor_line, 1);
    }
}
