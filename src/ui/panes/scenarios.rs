//! Test list pane: one row per scenario, then the selected test's failures
//! and the exercise's task progress.

use super::utils::border_style;
use crate::exercise::{ScenarioStatus, TaskProgress, TaskStatus};
use crate::orchestrator::TestSummary;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Data needed to render the test list
pub struct ScenariosRenderData<'a> {
    pub tests: &'a [TestSummary],
    pub current_test: Option<&'a str>,
    /// Messages of the selected test's failed expectations.
    pub failures: Vec<&'a str>,
    pub tasks: &'a [TaskProgress],
    pub current_task: Option<&'a str>,
}

fn task_line(task: &TaskProgress, is_current: bool) -> Line<'static> {
    let (icon, color) = match task.status {
        TaskStatus::Completed => ("✔", DEFAULT_THEME.success),
        TaskStatus::InProgress => ("◐", DEFAULT_THEME.secondary),
        TaskStatus::NotStarted => ("○", DEFAULT_THEME.comment),
    };
    let mut name_style = Style::default().fg(DEFAULT_THEME.fg);
    if is_current {
        name_style = name_style.add_modifier(Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(format!(" {} ", icon), Style::default().fg(color)),
        Span::styled(task.task_id.clone(), name_style),
        Span::styled(
            format!(" {}/{}", task.passed_scenarios.len(), task.total_scenarios),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ])
}

/// Render the test list pane
pub fn render_scenarios_pane(
    frame: &mut Frame,
    area: Rect,
    data: ScenariosRenderData,
    is_focused: bool,
) {
    let block = Block::default()
        .title(" Tests ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if data.tests.is_empty() {
        let paragraph = Paragraph::new("(press r to run)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut items: Vec<ListItem> = data
        .tests
        .iter()
        .map(|test| {
            let (icon, color) = match test.status {
                ScenarioStatus::Pass => ("✔", DEFAULT_THEME.success),
                ScenarioStatus::Fail => ("✘", DEFAULT_THEME.error),
            };
            let selected = data.current_test == Some(test.slug.as_str());
            let name_style = if selected {
                Style::default()
                    .fg(DEFAULT_THEME.fg)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", icon), Style::default().fg(color)),
                Span::styled(test.name.clone(), name_style),
            ]))
        })
        .collect();

    for failure in &data.failures {
        items.push(ListItem::new(Line::styled(
            format!("   {}", failure),
            Style::default().fg(DEFAULT_THEME.error),
        )));
    }

    if !data.tasks.is_empty() {
        items.push(ListItem::new(Line::styled(
            " Tasks",
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        )));
        for task in data.tasks {
            let is_current = data.current_task == Some(task.task_id.as_str());
            items.push(ListItem::new(task_line(task, is_current)));
        }
    }

    frame.render_widget(List::new(items).block(block), area);
}
