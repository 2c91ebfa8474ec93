//! Source code pane rendering with syntax highlighting
//!
//! Shows the program with the current frame's line highlighted, a gutter
//! for breakpoints and folds, and the editing cursor used to toggle them.
//! Highlighting is a character tokenizer shared by both languages.

use super::utils::border_style;
use crate::interpreter::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::collections::BTreeSet;

fn is_keyword(language: Language, word: &str) -> bool {
    match language {
        Language::JikiScript => matches!(
            word,
            "set" | "to" | "change" | "log" | "if" | "else" | "repeat" | "times" | "do" | "end"
                | "function" | "with" | "return" | "for" | "each" | "in" | "indexed" | "by"
                | "while" | "and" | "or" | "not" | "is" | "equals" | "break" | "continue"
                | "next" | "repeat_until_game_over"
        ),
        Language::JavaScript => matches!(
            word,
            "let" | "const" | "function" | "return" | "if" | "else" | "for" | "of" | "while"
                | "break" | "continue"
        ),
    }
}

/// Simple syntax highlighting for either front-end
fn highlight_source_code(line: &str, language: Language) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (at, c) = chars[i];

        if c == '/' && chars.get(i + 1).is_some_and(|(_, next)| *next == '/') {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            spans.push(Span::styled(
                &line[at..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != '"' {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            let stop = chars.get(end + 1).map_or(line.len(), |(byte, _)| *byte);
            spans.push(Span::styled(
                &line[at..stop.min(line.len())],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end + 1;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            if !current_word.is_empty() {
                let style = word_style(&current_word, c == '(', language);
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = word_style(&current_word, false, language);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn word_style(word: &str, is_call: bool, language: Language) -> Style {
    if is_keyword(language, word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if matches!(word, "true" | "false" | "null" | "undefined") || word.parse::<f64>().is_ok()
    {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_call {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Scroll state for the source pane
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the highlighted line is pinned to while stepping.
    pub target_line_row: Option<usize>,
}

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source: &'a str,
    pub language: Language,
    /// 1-based; 0 when no frame is selected.
    pub highlighted_line: usize,
    pub cursor_line: usize,
    pub is_error: bool,
    pub breakpoints: &'a BTreeSet<usize>,
    pub folded_lines: &'a BTreeSet<usize>,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = Block::default()
        .title(format!(" Source ({}) ", data.language))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = data.source.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Follow the cursor when focused, the running line otherwise
    let anchor = if is_focused {
        data.cursor_line
    } else {
        data.highlighted_line
    };
    if anchor > 0 && anchor <= total_lines {
        scroll_state.offset = (anchor - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == data.highlighted_line;
            let is_folded = data.folded_lines.contains(&line_num);

            let marker = if data.breakpoints.contains(&line_num) {
                Span::styled("●", Style::default().fg(DEFAULT_THEME.breakpoint))
            } else if is_folded {
                Span::styled("▸", Style::default().fg(DEFAULT_THEME.comment))
            } else {
                Span::raw(" ")
            };

            let mut num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            if is_focused && line_num == data.cursor_line {
                num_style = num_style.add_modifier(Modifier::REVERSED);
            }

            let mut content = highlight_source_code(line, data.language);
            if is_folded {
                for span in &mut content.spans {
                    span.style = Style::default().fg(DEFAULT_THEME.folded);
                }
            } else if is_current && data.is_error {
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content.spans {
                    span.style = error_style;
                }
            } else if is_current {
                let current_style = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content.spans {
                    span.style = span.style.patch(current_style);
                }
            }

            let mut spans = vec![marker, Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_strings_and_comments_are_single_spans() {
        let line = highlight_source_code("log \"a b\" // note", Language::JikiScript);
        let texts = texts(&line);
        assert_eq!(texts[0], "log");
        assert!(texts.contains(&"\"a b\"".to_string()));
        assert_eq!(texts.last().map(String::as_str), Some("// note"));
    }

    #[test]
    fn test_keywords_depend_on_language() {
        let bold = |line: &Line| line.spans[0].style.add_modifier.contains(Modifier::BOLD);
        assert!(bold(&highlight_source_code("let x", Language::JavaScript)));
        assert!(!bold(&highlight_source_code("let x", Language::JikiScript)));
    }
}
