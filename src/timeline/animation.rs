//! Animation clock
//!
//! An [`AnimationTimeline`] is a millisecond clock spanning every animation
//! an exercise queued during a run and every frame the run recorded. The
//! host drives it with [`advance`](AnimationTimeline::advance); listeners
//! registered with `on_update`/`on_complete` hear about it. It only reads
//! frame times and never touches frame data.

use crate::runtime::{Frame, TIME_SCALE_FACTOR};
use serde::Serialize;

/// One visual change queued by an exercise, e.g. moving a character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub targets: String,
    pub offset_ms: f64,
    pub duration_ms: f64,
    pub transformations: serde_json::Value,
}

impl Animation {
    pub fn end_ms(&self) -> f64 {
        self.offset_ms + self.duration_ms
    }
}

type Listener = Box<dyn FnMut(f64)>;

pub struct AnimationTimeline {
    animations: Vec<Animation>,
    duration_ms: f64,
    current_ms: f64,
    paused: bool,
    completed: bool,
    update_callbacks: Vec<Listener>,
    complete_callbacks: Vec<Listener>,
}

impl std::fmt::Debug for AnimationTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationTimeline")
            .field("animations", &self.animations.len())
            .field("duration_ms", &self.duration_ms)
            .field("current_ms", &self.current_ms)
            .field("paused", &self.paused)
            .field("completed", &self.completed)
            .finish()
    }
}

impl AnimationTimeline {
    /// The clock lasts until the later of the last animation's end and the
    /// last frame, so the final frame is always reachable.
    pub fn new(animations: Vec<Animation>, frames: &[Frame]) -> Self {
        let animations_end = animations.iter().map(Animation::end_ms).fold(0.0, f64::max);
        let last_frame = frames.last().map(Frame::time_in_ms).unwrap_or(0.0);

        AnimationTimeline {
            animations,
            duration_ms: animations_end.max(last_frame),
            current_ms: 0.0,
            paused: true,
            completed: false,
            update_callbacks: Vec::new(),
            complete_callbacks: Vec::new(),
        }
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Duration on the frame clock, in microseconds.
    pub fn duration(&self) -> u64 {
        (self.duration_ms * TIME_SCALE_FACTOR as f64).round() as u64
    }

    /// Current position in milliseconds.
    pub fn current_time(&self) -> f64 {
        self.current_ms
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Jump to `time` (µs), rounded to the nearest millisecond. Listeners are
    /// not notified.
    pub fn seek(&mut self, time: u64) {
        let ms = (time as f64 / TIME_SCALE_FACTOR as f64).round();
        self.current_ms = ms.clamp(0.0, self.duration_ms);
        self.completed = self.duration_ms > 0.0 && self.current_ms >= self.duration_ms;
    }

    /// Start the clock, rewinding first when it already ran to the end.
    pub fn play(&mut self) {
        if self.completed {
            self.current_ms = 0.0;
            self.completed = false;
        }
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Move the clock forward by `elapsed_ms` of playback. Fires the update
    /// listeners, then the complete listeners if this step reached the end.
    pub fn advance(&mut self, elapsed_ms: f64) {
        if self.paused || self.completed {
            return;
        }

        self.current_ms = (self.current_ms + elapsed_ms.max(0.0)).min(self.duration_ms);
        let now = self.current_ms;
        for callback in &mut self.update_callbacks {
            callback(now);
        }

        if self.current_ms >= self.duration_ms {
            self.completed = true;
            self.paused = true;
            for callback in &mut self.complete_callbacks {
                callback(now);
            }
        }
    }

    /// Register a listener called with the current time (ms) on every step.
    pub fn on_update(&mut self, callback: impl FnMut(f64) + 'static) {
        self.update_callbacks.push(Box::new(callback));
    }

    pub fn on_complete(&mut self, callback: impl FnMut(f64) + 'static) {
        self.complete_callbacks.push(Box::new(callback));
    }

    pub fn clear_update_callbacks(&mut self) {
        self.update_callbacks.clear();
    }

    pub fn clear_complete_callbacks(&mut self) {
        self.complete_callbacks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::tests::frames;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn slide(offset_ms: f64, duration_ms: f64) -> Animation {
        Animation {
            targets: ".character".into(),
            offset_ms,
            duration_ms,
            transformations: json!({ "left": 10 }),
        }
    }

    #[test]
    fn test_duration_covers_last_frame() {
        let timeline = AnimationTimeline::new(vec![slide(0.0, 60.0)], &frames(&[(0, 1), (61_000, 2)]));
        assert_eq!(timeline.duration_ms(), 61.0);
        assert_eq!(timeline.duration(), 61_000);
    }

    #[test]
    fn test_duration_covers_last_animation() {
        let timeline = AnimationTimeline::new(vec![slide(100.0, 200.0)], &frames(&[(0, 1), (1, 2)]));
        assert_eq!(timeline.duration_ms(), 300.0);
    }

    #[test]
    fn test_seek_rounds_to_milliseconds() {
        let mut timeline = AnimationTimeline::new(vec![slide(0.0, 100.0)], &[]);
        timeline.seek(12_600);
        assert_eq!(timeline.current_time(), 13.0);
        timeline.seek(500_000);
        assert_eq!(timeline.current_time(), 100.0);
        assert!(timeline.completed());
    }

    #[test]
    fn test_advance_fires_update_then_complete() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut timeline = AnimationTimeline::new(vec![slide(0.0, 50.0)], &[]);

        let updates = Rc::clone(&events);
        timeline.on_update(move |ms| updates.borrow_mut().push(format!("update {}", ms)));
        let completes = Rc::clone(&events);
        timeline.on_complete(move |_| completes.borrow_mut().push("complete".to_string()));

        timeline.advance(30.0);
        assert!(events.borrow().is_empty(), "paused clocks do not move");

        timeline.play();
        timeline.advance(30.0);
        timeline.advance(30.0);
        assert_eq!(
            *events.borrow(),
            vec!["update 30", "update 50", "complete"]
        );
        assert!(timeline.paused());
        assert!(timeline.completed());
    }

    #[test]
    fn test_play_after_completion_restarts() {
        let mut timeline = AnimationTimeline::new(vec![slide(0.0, 10.0)], &[]);
        timeline.play();
        timeline.advance(20.0);
        assert!(timeline.completed());

        timeline.play();
        assert_eq!(timeline.current_time(), 0.0);
        assert!(!timeline.completed());
        assert!(!timeline.paused());
    }

    #[test]
    fn test_cleared_callbacks_stay_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut timeline = AnimationTimeline::new(vec![slide(0.0, 10.0)], &[]);
        let counter = Rc::clone(&count);
        timeline.on_update(move |_| *counter.borrow_mut() += 1);
        timeline.clear_update_callbacks();
        timeline.play();
        timeline.advance(5.0);
        assert_eq!(*count.borrow(), 0);
    }
}
