//! Helpers shared by several panes

use crate::runtime::FrozenValue;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

pub(super) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Colour a frozen value's display text token by token.
pub(super) fn highlight_value(value: &FrozenValue) -> Vec<Span<'static>> {
    highlight_value_string(&value.to_string())
}

/// Highlight a value string (simple lexer)
fn highlight_value_string(s: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current_token = String::new();
    let mut in_string = false;

    for c in s.chars() {
        if c == '"' {
            current_token.push(c);
            if in_string {
                spans.push(style_token(&current_token));
                current_token.clear();
            }
            in_string = !in_string;
            continue;
        }

        if !in_string && matches!(c, '[' | ']' | '{' | '}' | ',' | ':' | ' ') {
            if !current_token.is_empty() {
                spans.push(style_token(&current_token));
                current_token.clear();
            }
            spans.push(Span::styled(
                c.to_string(),
                Style::default().fg(DEFAULT_THEME.fg),
            ));
            continue;
        }

        current_token.push(c);
    }

    if !current_token.is_empty() {
        spans.push(style_token(&current_token));
    }

    spans
}

fn style_token(token: &str) -> Span<'static> {
    let style = if token.starts_with('"') {
        Style::default().fg(DEFAULT_THEME.string)
    } else if matches!(token, "true" | "false" | "null") {
        Style::default().fg(DEFAULT_THEME.keyword)
    } else if token.parse::<f64>().is_ok() || matches!(token, "NaN" | "Infinity" | "-Infinity") {
        Style::default().fg(DEFAULT_THEME.number)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };
    Span::styled(token.to_string(), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_with_delimiters_stay_whole() {
        let value = FrozenValue::List(vec![
            FrozenValue::String("a, b".into()),
            FrozenValue::Number(2.0),
        ]);
        let texts: Vec<String> = highlight_value(&value)
            .into_iter()
            .map(|span| span.content.into_owned())
            .collect();
        assert!(texts.contains(&"\"a, b\"".to_string()));
        assert!(texts.contains(&"2".to_string()));
    }
}
