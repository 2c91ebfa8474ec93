//! Language-neutral interpreter entry points
//!
//! Every front-end exposes the same two operations:
//! - `interpret`: run a whole program and return its frame trace
//! - `evaluate_function`: run a program, then call one of its functions
//!   with host-supplied arguments and return the value
//!
//! [`Language`] dispatches to the right front-end. A parse failure yields a
//! result with exactly one [`SyntaxError`] and no frames; runtime failures
//! are recorded as the trace's final ERROR frame instead.

use crate::runtime::{
    ExecutionContext, ExternalFunction, FrameTrace, FrozenValue, FunctionCallLog,
    LanguageFeatures, LogLine, RunOutput,
};
use crate::syntax::SyntaxError;
use crate::{javascript, jikiscript};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[value(name = "jikiscript")]
    JikiScript,
    #[value(name = "javascript")]
    JavaScript,
}

impl Language {
    /// Guess from a file extension: `.js` is JavaScript, anything else
    /// JikiScript.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "js" | "mjs" => Language::JavaScript,
            _ => Language::JikiScript,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::JikiScript => write!(f, "jikiscript"),
            Language::JavaScript => write!(f, "javascript"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterpretOptions {
    pub language_features: LanguageFeatures,
    pub external_functions: Vec<ExternalFunction>,
    pub random_seed: Option<u64>,
}

impl InterpretOptions {
    pub(crate) fn context(&self, source: &str) -> ExecutionContext {
        ExecutionContext::new(source, self.language_features.clone(), self.random_seed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub function_call_log: FunctionCallLog,
}

#[derive(Debug, Clone)]
pub struct InterpretResult {
    pub frames: FrameTrace,
    pub log_lines: Vec<LogLine>,
    pub error: Option<SyntaxError>,
    pub success: bool,
    pub meta: Meta,
}

impl InterpretResult {
    pub(crate) fn from_run(output: RunOutput) -> Self {
        InterpretResult {
            success: !output.frames.has_errors(),
            frames: output.frames,
            log_lines: output.log_lines,
            error: None,
            meta: Meta {
                function_call_log: output.function_call_log,
            },
        }
    }

    pub(crate) fn syntax_error(error: SyntaxError) -> Self {
        InterpretResult {
            frames: FrameTrace::empty(),
            log_lines: Vec::new(),
            error: Some(error),
            success: false,
            meta: Meta::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationResult {
    /// Frozen return value; `None` when the program or the call failed.
    pub value: Option<FrozenValue>,
    pub frames: FrameTrace,
    pub log_lines: Vec<LogLine>,
    pub error: Option<SyntaxError>,
    pub success: bool,
    pub meta: Meta,
}

impl EvaluationResult {
    pub(crate) fn from_run(output: RunOutput, value: Option<FrozenValue>) -> Self {
        let run = InterpretResult::from_run(output);
        EvaluationResult {
            value: if run.success { value } else { None },
            frames: run.frames,
            log_lines: run.log_lines,
            error: None,
            success: run.success,
            meta: run.meta,
        }
    }

    pub(crate) fn syntax_error(error: SyntaxError) -> Self {
        let run = InterpretResult::syntax_error(error);
        EvaluationResult {
            value: None,
            frames: run.frames,
            log_lines: run.log_lines,
            error: run.error,
            success: false,
            meta: run.meta,
        }
    }
}

impl From<EvaluationResult> for InterpretResult {
    fn from(result: EvaluationResult) -> Self {
        InterpretResult {
            frames: result.frames,
            log_lines: result.log_lines,
            error: result.error,
            success: result.success,
            meta: result.meta,
        }
    }
}

pub fn interpret(language: Language, source: &str, options: &InterpretOptions) -> InterpretResult {
    match language {
        Language::JikiScript => jikiscript::interpret(source, options),
        Language::JavaScript => javascript::interpret(source, options),
    }
}

pub fn evaluate_function(
    language: Language,
    source: &str,
    options: &InterpretOptions,
    function_name: &str,
    args: &[serde_json::Value],
) -> EvaluationResult {
    match language {
        Language::JikiScript => jikiscript::evaluate_function(source, options, function_name, args),
        Language::JavaScript => javascript::evaluate_function(source, options, function_name, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reports_syntax_errors_per_language() {
        let options = InterpretOptions::default();

        let jiki = interpret(Language::JikiScript, "set x 5", &options);
        assert!(jiki.error.is_some());
        assert!(jiki.frames.is_empty());

        let js = interpret(Language::JavaScript, "let = 5;", &options);
        assert!(js.error.is_some());
        assert!(js.frames.is_empty());
    }

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_extension("js"), Language::JavaScript);
        assert_eq!(Language::from_extension("jiki"), Language::JikiScript);
    }
}
