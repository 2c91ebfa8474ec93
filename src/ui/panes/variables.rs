//! Frame pane: what the current step did and the bindings it saw
//!
//! The top of the pane is the frame's description (or its error), the rest
//! lists every variable visible at that step with its frozen value.

use super::utils::{border_style, highlight_value};
use crate::runtime::Frame;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame as TerminalFrame,
};

/// Scroll state for the frame pane
pub struct VariablesScrollState {
    pub offset: usize,
}

/// Data needed to render the frame pane
pub struct VariablesRenderData<'a> {
    pub frame: Option<&'a Frame>,
    pub index: Option<usize>,
    pub frame_count: usize,
}

/// Render the frame pane
pub fn render_variables_pane(
    frame: &mut TerminalFrame,
    area: Rect,
    data: VariablesRenderData,
    is_focused: bool,
    scroll_state: &mut VariablesScrollState,
) {
    let title = match data.index {
        Some(index) => format!(" Frame {}/{} ", index + 1, data.frame_count),
        None => " Frame ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let Some(current) = data.frame else {
        let paragraph = Paragraph::new("(no frame selected)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let description = match current.error() {
        Some(error) => Line::from(vec![
            Span::styled(
                format!("{}: ", error.kind),
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.message.clone(), Style::default().fg(DEFAULT_THEME.error)),
        ]),
        None => Line::styled(
            current.generate_description(),
            Style::default().fg(DEFAULT_THEME.fg),
        ),
    };
    let description_height = (inner.height / 3).max(2);
    let description_area = Rect {
        height: description_height.min(inner.height),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(description).wrap(Wrap { trim: true }),
        description_area,
    );

    let list_area = Rect {
        y: inner.y + description_area.height,
        height: inner.height.saturating_sub(description_area.height),
        ..inner
    };
    let items: Vec<ListItem> = current
        .variables()
        .iter()
        .map(|(name, value)| {
            let mut spans = vec![
                Span::styled(
                    name.clone(),
                    Style::default()
                        .fg(DEFAULT_THEME.primary)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
            ];
            spans.extend(highlight_value(value));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let visible_height = list_area.height.max(1) as usize;
    scroll_state.offset = scroll_state
        .offset
        .min(items.len().saturating_sub(visible_height));
    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();
    frame.render_widget(List::new(visible), list_area);
}
