//! Per-run execution context
//!
//! [`ExecutionContext`] owns everything about a run that is not the program's
//! own bindings: virtual time, language feature flags, seeded randomness, the
//! console log and the frames recorded so far. Executors record frames through
//! it and external functions receive it to advance time or signal a logic
//! error.

use super::external::LogicError;
use super::frame::{time_to_ms, Frame, FrameError, FrameResult, FrameTrace, LogLine, TIME_SCALE_FACTOR};
use super::describe::Step;
use super::errors::{RuntimeError, RuntimeErrorKind};
use super::value::{FrozenValue, Value};
use crate::syntax::{line_text, SourceLocation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature flags that tune how strict a language is for a given exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageFeatures {
    pub allow_shadowing: bool,
    pub allow_type_coercion: bool,
    pub allow_truthiness: bool,
    pub enforce_strict_equality: bool,
    /// Virtual microseconds each frame costs.
    pub time_per_frame: u64,
    pub max_total_loop_iterations: u64,
    /// Upper bound on virtual time, in microseconds.
    pub max_total_execution_time: u64,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        LanguageFeatures {
            allow_shadowing: false,
            allow_type_coercion: false,
            allow_truthiness: false,
            enforce_strict_equality: true,
            time_per_frame: 1,
            max_total_loop_iterations: 10_000,
            max_total_execution_time: 10_000_000,
        }
    }
}

/// External function name → (arguments as JSON → number of calls).
pub type FunctionCallLog = BTreeMap<String, BTreeMap<String, usize>>;

/// Everything a finished run hands back besides its result value.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub frames: FrameTrace,
    pub log_lines: Vec<LogLine>,
    pub function_call_log: FunctionCallLog,
}

pub struct ExecutionContext {
    source: String,
    time: u64,
    features: LanguageFeatures,
    rng: StdRng,
    frames: Vec<Frame>,
    log_lines: Vec<LogLine>,
    total_loop_iterations: u64,
    function_call_log: FunctionCallLog,
}

impl ExecutionContext {
    pub fn new(source: &str, features: LanguageFeatures, random_seed: Option<u64>) -> Self {
        let rng = match random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ExecutionContext {
            source: source.to_string(),
            time: 0,
            features,
            rng,
            frames: Vec::new(),
            log_lines: Vec::new(),
            total_loop_iterations: 0,
            function_call_log: BTreeMap::new(),
        }
    }

    pub fn features(&self) -> &LanguageFeatures {
        &self.features
    }

    /// Current virtual time in microseconds.
    pub fn current_time(&self) -> u64 {
        self.time
    }

    pub fn current_time_in_ms(&self) -> f64 {
        time_to_ms(self.time)
    }

    /// Advance virtual time without recording a frame, typically to make room
    /// for an animation that starts now.
    pub fn fast_forward(&mut self, ms: u64) {
        self.time += ms * TIME_SCALE_FACTOR;
    }

    /// Build the error an external function returns to report an expected,
    /// learner-facing failure. The message is shown verbatim.
    pub fn logic_error(&self, message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(LogicError(message.into()))
    }

    /// Uniform integer in `min..=max`, reproducible for a given seed.
    pub fn random_number(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    pub fn log(&mut self, output: impl Into<String>) {
        self.log_lines.push(LogLine {
            time: self.time,
            time_in_ms: time_to_ms(self.time),
            output: output.into(),
        });
    }

    pub fn log_lines(&self) -> &[LogLine] {
        &self.log_lines
    }

    pub(crate) fn record_call(&mut self, name: &str, args: &[Value]) {
        let key = serde_json::Value::Array(args.iter().map(Value::to_json).collect()).to_string();
        *self
            .function_call_log
            .entry(name.to_string())
            .or_default()
            .entry(key)
            .or_insert(0) += 1;
    }

    pub(crate) fn guard_loop_iteration(&mut self) -> Result<(), RuntimeErrorKind> {
        self.total_loop_iterations += 1;
        if self.total_loop_iterations > self.features.max_total_loop_iterations {
            return Err(RuntimeErrorKind::MaxIterationsReached {
                max: self.features.max_total_loop_iterations,
            });
        }
        Ok(())
    }

    pub(crate) fn guard_execution_time(&self) -> Result<(), RuntimeErrorKind> {
        if self.time > self.features.max_total_execution_time {
            return Err(RuntimeErrorKind::MaxTotalExecutionTimeReached {
                max: self.features.max_total_execution_time,
            });
        }
        Ok(())
    }

    pub(crate) fn add_success_frame(
        &mut self,
        location: SourceLocation,
        result: FrameResult,
        step: Step,
        variables: BTreeMap<String, FrozenValue>,
    ) {
        let code = line_text(&self.source, location.line);
        let frame = Frame::success(self.time, location.line, code, result, step, variables);
        self.push_frame(frame);
    }

    pub(crate) fn add_error_frame(
        &mut self,
        error: &RuntimeError,
        variables: BTreeMap<String, FrozenValue>,
    ) {
        let code = line_text(&self.source, error.location.line);
        let frame = Frame::failure(
            self.time,
            error.location.line,
            code,
            FrameError::from(error),
            variables,
        );
        self.push_frame(frame);
    }

    fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        self.time += self.features.time_per_frame;
    }

    pub(crate) fn finish(self) -> RunOutput {
        RunOutput {
            frames: FrameTrace::from_monotonic(self.frames),
            log_lines: self.log_lines,
            function_call_log: self.function_call_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_forward_converts_milliseconds() {
        let mut ctx = ExecutionContext::new("", LanguageFeatures::default(), Some(1));
        ctx.fast_forward(200);
        assert_eq!(ctx.current_time(), 200_000);
        assert_eq!(ctx.current_time_in_ms(), 200.0);
    }

    #[test]
    fn seeded_random_numbers_repeat() {
        let mut a = ExecutionContext::new("", LanguageFeatures::default(), Some(42));
        let mut b = ExecutionContext::new("", LanguageFeatures::default(), Some(42));
        let xs: Vec<i64> = (0..5).map(|_| a.random_number(1, 100)).collect();
        let ys: Vec<i64> = (0..5).map(|_| b.random_number(1, 100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn loop_guard_trips_after_limit() {
        let features = LanguageFeatures {
            max_total_loop_iterations: 2,
            ..LanguageFeatures::default()
        };
        let mut ctx = ExecutionContext::new("", features, None);
        assert!(ctx.guard_loop_iteration().is_ok());
        assert!(ctx.guard_loop_iteration().is_ok());
        assert_eq!(
            ctx.guard_loop_iteration(),
            Err(RuntimeErrorKind::MaxIterationsReached { max: 2 })
        );
    }

    #[test]
    fn log_lines_carry_time() {
        let mut ctx = ExecutionContext::new("", LanguageFeatures::default(), None);
        ctx.fast_forward(1);
        ctx.log("hi");
        assert_eq!(ctx.log_lines()[0].time, 1000);
        assert_eq!(ctx.log_lines()[0].output, "hi");
    }
}
