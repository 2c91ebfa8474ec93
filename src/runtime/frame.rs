//! Frames and frame traces
//!
//! A [`Frame`] is the immutable record of one observable execution step. All
//! of its data (result, error, variable snapshot and description source) is
//! frozen when it is built; fields are private and only readable through
//! accessors, so a frame handed out by a [`FrameTrace`] can never change.
//!
//! A [`FrameTrace`] is the ordered sequence of frames from one run. Its
//! constructor rejects traces whose time goes backwards.

use super::describe::Step;
use super::errors::{ErrorCategory, RuntimeError};
use super::value::FrozenValue;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::ops::Deref;
use thiserror::Error;

/// Microseconds per millisecond. Frame times are stored in microseconds and
/// projected onto the millisecond animation clock.
pub const TIME_SCALE_FACTOR: u64 = 1000;

pub fn time_to_ms(time: u64) -> f64 {
    time as f64 / TIME_SCALE_FACTOR as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameStatus {
    Success,
    Error,
}

/// What a successful step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// Node kind, e.g. `LogStatement` or `CallExpression`.
    pub kind: &'static str,
    pub value: Option<FrozenValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    pub category: ErrorCategory,
    pub kind: &'static str,
    pub message: String,
    pub context: serde_json::Value,
}

impl From<&RuntimeError> for FrameError {
    fn from(error: &RuntimeError) -> Self {
        FrameError {
            category: ErrorCategory::RuntimeError,
            kind: error.kind.kind(),
            message: error.kind.to_string(),
            context: error.kind.context(),
        }
    }
}

/// One immutable, time-stamped execution step.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    time: u64,
    line: usize,
    code: String,
    status: FrameStatus,
    result: Option<FrameResult>,
    error: Option<FrameError>,
    variables: BTreeMap<String, FrozenValue>,
    step: Step,
}

impl Frame {
    pub fn success(
        time: u64,
        line: usize,
        code: String,
        result: FrameResult,
        step: Step,
        variables: BTreeMap<String, FrozenValue>,
    ) -> Self {
        Frame {
            time,
            line,
            code,
            status: FrameStatus::Success,
            result: Some(result),
            error: None,
            variables,
            step,
        }
    }

    pub fn failure(
        time: u64,
        line: usize,
        code: String,
        error: FrameError,
        variables: BTreeMap<String, FrozenValue>,
    ) -> Self {
        let step = Step::Error {
            message: error.message.clone(),
        };
        Frame {
            time,
            line,
            code,
            status: FrameStatus::Error,
            result: None,
            error: Some(error),
            variables,
            step,
        }
    }

    /// Virtual time in microseconds.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn time_in_ms(&self) -> f64 {
        time_to_ms(self.time)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> FrameStatus {
        self.status
    }

    pub fn is_error(&self) -> bool {
        self.status == FrameStatus::Error
    }

    pub fn result(&self) -> Option<&FrameResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&FrameError> {
        self.error.as_ref()
    }

    /// Visible bindings as they were when this frame was recorded.
    pub fn variables(&self) -> &BTreeMap<String, FrozenValue> {
        &self.variables
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Human-readable explanation of this step, rendered from frozen data.
    pub fn generate_description(&self) -> String {
        self.step.render()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "time": self.time,
            "timeInMs": self.time_in_ms(),
            "line": self.line,
            "code": self.code,
            "status": self.status,
            "result": self.result.as_ref().map(|r| json!({
                "type": r.kind,
                "value": r.value.as_ref().map(FrozenValue::to_json),
            })),
            "error": self.error.as_ref().map(|e| json!({
                "category": e.category,
                "type": e.kind,
                "message": e.message,
                "context": e.context,
            })),
            "variables": self
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<serde_json::Map<_, _>>(),
            "description": self.generate_description(),
        })
    }
}

/// A line written by `log` or `console.log`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub time: u64,
    #[serde(rename = "timeInMs")]
    pub time_in_ms: f64,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("frame {index} at time {time} precedes the previous frame at {previous}")]
    TimeWentBackwards { index: usize, time: u64, previous: u64 },
}

/// The complete, ordered frame sequence of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameTrace {
    frames: Vec<Frame>,
}

impl FrameTrace {
    pub fn new(frames: Vec<Frame>) -> Result<Self, TraceError> {
        for (index, pair) in frames.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(TraceError::TimeWentBackwards {
                    index: index + 1,
                    time: pair[1].time,
                    previous: pair[0].time,
                });
            }
        }
        Ok(FrameTrace { frames })
    }

    /// Wrap frames recorded by an [`ExecutionContext`], whose clock only
    /// moves forward.
    ///
    /// [`ExecutionContext`]: super::context::ExecutionContext
    pub(crate) fn from_monotonic(frames: Vec<Frame>) -> Self {
        debug_assert!(frames.windows(2).all(|pair| pair[0].time <= pair[1].time));
        FrameTrace { frames }
    }

    pub fn empty() -> Self {
        FrameTrace::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn has_errors(&self) -> bool {
        self.frames.iter().any(Frame::is_error)
    }
}

impl Deref for FrameTrace {
    type Target = [Frame];

    fn deref(&self) -> &[Frame] {
        &self.frames
    }
}

impl<'a> IntoIterator for &'a FrameTrace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(time: u64) -> Frame {
        Frame::success(
            time,
            1,
            String::new(),
            FrameResult {
                kind: "ExpressionStatement",
                value: None,
            },
            Step::Break,
            BTreeMap::new(),
        )
    }

    #[test]
    fn trace_accepts_equal_times() {
        let trace = FrameTrace::new(vec![frame_at(1), frame_at(1), frame_at(3)]);
        assert!(trace.is_ok());
    }

    #[test]
    fn trace_rejects_time_going_backwards() {
        let trace = FrameTrace::new(vec![frame_at(5), frame_at(2)]);
        assert!(matches!(
            trace,
            Err(TraceError::TimeWentBackwards { index: 1, .. })
        ));
    }

    #[test]
    fn time_in_ms_uses_scale_factor() {
        assert_eq!(frame_at(2500).time_in_ms(), 2.5);
    }
}
