//! Scrubbing support for a finished run
//!
//! - [`navigation`]: nearest / previous / next frame, skipping folded lines
//! - [`breakpoints`]: breakpoint jumps and line-set toggling
//! - [`animation`]: the playback clock frame times are projected onto

pub mod animation;
pub mod breakpoints;
pub mod navigation;

pub use animation::{Animation, AnimationTimeline};
pub use breakpoints::{find_next_breakpoint_frame, find_prev_breakpoint_frame, toggle_line};
pub use navigation::{find_nearest_frame, find_next_frame, find_prev_frame};

#[cfg(test)]
pub(crate) mod tests {
    use crate::runtime::describe::Step;
    use crate::runtime::frame::FrameResult;
    use crate::runtime::Frame;
    use std::collections::BTreeMap;

    /// One frame per `(time, line)` pair.
    pub(crate) fn frames(layout: &[(u64, usize)]) -> Vec<Frame> {
        layout.iter()
            .map(|&(time, line)| {
                Frame::success(
                    time,
                    line,
                    String::new(),
                    FrameResult {
                        kind: "ExpressionStatement",
                        value: None,
                    },
                    Step::Break,
                    BTreeMap::new(),
                )
            })
            .collect()
    }

    /// Lines 1 to 7, one frame each, one microsecond apart.
    pub(crate) fn seven_lines() -> Vec<Frame> {
        frames(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)])
    }
}
