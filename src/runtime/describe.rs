//! Plain-text frame descriptions
//!
//! A [`Step`] is the frozen record of what a single statement did. It is built
//! at frame-construction time from [`FrozenValue`]s only, so rendering it later
//! always yields the same text no matter what the program did afterwards.

use super::value::FrozenValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Log {
        value: FrozenValue,
    },
    Declare {
        name: String,
        value: FrozenValue,
    },
    Assign {
        name: String,
        value: FrozenValue,
    },
    ChangeElement {
        name: String,
        index: FrozenValue,
        value: FrozenValue,
    },
    Call {
        name: String,
        args: Vec<FrozenValue>,
        result: FrozenValue,
    },
    Return {
        value: Option<FrozenValue>,
    },
    Condition {
        kind: &'static str,
        value: bool,
    },
    Repeat {
        iteration: usize,
        total: usize,
    },
    Foreach {
        name: String,
        value: FrozenValue,
        index: usize,
    },
    /// A loop whose body never ran (`repeat 0 times`, an empty list).
    SkippedLoop {
        kind: &'static str,
    },
    Expression {
        value: FrozenValue,
    },
    Break,
    Continue,
    Error {
        message: String,
    },
}

impl Step {
    /// Render the "what happened" summary followed by the detailed steps.
    pub fn render(&self) -> String {
        let (summary, steps) = self.describe();
        if steps.is_empty() {
            return summary;
        }
        let mut text = summary;
        for step in steps {
            text.push_str("\n  - ");
            text.push_str(&step);
        }
        text
    }

    fn describe(&self) -> (String, Vec<String>) {
        match self {
            Step::Log { value } => (
                format!("This line wrote {} to the console.", value),
                vec![format!("Jiki evaluated the expression, getting {}.", value)],
            ),
            Step::Declare { name, value } => (
                format!("This line created a new variable called {} with the value {}.", name, value),
                vec![
                    format!("Jiki evaluated the expression, getting {}.", value),
                    format!("Jiki created a new box called {} and put {} in it.", name, value),
                ],
            ),
            Step::Assign { name, value } => (
                format!("This line updated the variable {} to {}.", name, value),
                vec![format!("Jiki replaced the contents of the {} box with {}.", name, value)],
            ),
            Step::ChangeElement { name, index, value } => (
                format!("This line changed element {} of {} to {}.", index, name, value),
                vec![format!("Jiki put {} into position {} of {}.", value, index, name)],
            ),
            Step::Call { name, args, result } => {
                let args = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let summary = if matches!(result, FrozenValue::None) {
                    format!("This line used the {} function.", name)
                } else {
                    format!("This line used the {} function, which returned {}.", name, result)
                };
                (summary, vec![format!("Jiki called {}({}).", name, args)])
            }
            Step::Return { value } => match value {
                Some(value) => (
                    format!("This line returned {} from the function.", value),
                    vec![format!("Jiki evaluated the expression, getting {}.", value)],
                ),
                None => ("This line returned from the function.".to_string(), Vec::new()),
            },
            Step::Condition { kind, value } => (
                format!(
                    "This {} condition evaluated to {}.",
                    kind,
                    if *value { "true" } else { "false" }
                ),
                vec![if *value {
                    "Jiki ran the code in the block.".to_string()
                } else {
                    "Jiki skipped the code in the block.".to_string()
                }],
            ),
            Step::Repeat { iteration, total } => (
                format!("This line repeats its body {} times.", total),
                vec![format!("This is iteration {} of {}.", iteration, total)],
            ),
            Step::Foreach { name, value, index } => (
                format!("This loop set {} to {}.", name, value),
                vec![format!("This is iteration {}.", index)],
            ),
            Step::SkippedLoop { kind } => (
                format!("This {} loop did not run its body.", kind),
                vec!["There was nothing to iterate over, so Jiki moved on.".to_string()],
            ),
            Step::Expression { value } => (
                format!("This line evaluated to {}.", value),
                Vec::new(),
            ),
            Step::Break => ("This line stopped the loop.".to_string(), Vec::new()),
            Step::Continue => (
                "This line skipped to the next iteration of the loop.".to_string(),
                Vec::new(),
            ),
            Step::Error { message } => (format!("Something went wrong: {}", message), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_description_mentions_value() {
        let step = Step::Log {
            value: FrozenValue::String("hello".into()),
        };
        assert!(step.render().contains("\"hello\""));
    }

    #[test]
    fn call_without_result_omits_return_clause() {
        let step = Step::Call {
            name: "move".into(),
            args: vec![],
            result: FrozenValue::None,
        };
        assert_eq!(
            step.render(),
            "This line used the move function.\n  - Jiki called move()."
        );
    }
}
