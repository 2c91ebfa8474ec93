//! Frame navigation over a finished trace
//!
//! Every function here is pure: it takes the frames of one trace and the
//! lines the learner has folded, and returns the index of the frame to move
//! to. Frames on folded lines are
//! never landed on. The current frame itself may sit on a folded line; both
//! directions still work from there.

use crate::runtime::Frame;
use std::collections::BTreeSet;

pub(crate) fn visible(frame: &Frame, folded: &BTreeSet<usize>) -> bool {
    !folded.contains(&frame.line())
}

/// The visible frame closest in time to `time` (µs).
///
/// Times at or before the first frame give the first frame, times past the
/// end give the last one. When two candidates are equally close the earlier
/// frame wins.
pub fn find_nearest_frame(frames: &[Frame], time: u64, folded: &BTreeSet<usize>) -> Option<usize> {
    let last = frames.len().checked_sub(1)?;
    if time == 0 {
        return Some(0);
    }
    if time > frames[last].time() {
        return Some(last);
    }

    // first visible frame at or after `time`
    let Some(after) = frames
        .iter()
        .position(|frame| frame.time() >= time && visible(frame, folded))
    else {
        return Some(last);
    };
    if after == 0 {
        return Some(0);
    }

    let before = frames[..after]
        .iter()
        .rposition(|frame| visible(frame, folded));
    match before {
        Some(before) => {
            let before_distance = time - frames[before].time();
            let after_distance = frames[after].time() - time;
            Some(if before_distance <= after_distance {
                before
            } else {
                after
            })
        }
        None => Some(after),
    }
}

/// The next visible frame strictly after `current` in time.
pub fn find_next_frame(frames: &[Frame], current: &Frame, folded: &BTreeSet<usize>) -> Option<usize> {
    frames
        .iter()
        .position(|frame| frame.time() > current.time() && visible(frame, folded))
}

/// The previous visible frame strictly before `current` in time.
pub fn find_prev_frame(frames: &[Frame], current: &Frame, folded: &BTreeSet<usize>) -> Option<usize> {
    frames
        .iter()
        .rposition(|frame| frame.time() < current.time() && visible(frame, folded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::tests::{frames, seven_lines};
    use maplit::btreeset;

    #[test]
    fn test_nearest_frame_edges() {
        let trace = frames(&[(0, 1), (10, 2), (20, 3)]);
        let none = BTreeSet::new();
        assert_eq!(find_nearest_frame(&trace, 0, &none), Some(0));
        assert_eq!(find_nearest_frame(&trace, 500, &none), Some(2));
        assert_eq!(find_nearest_frame(&[], 5, &none), None);
    }

    #[test]
    fn test_nearest_frame_picks_closest() {
        let trace = frames(&[(0, 1), (10, 2), (20, 3)]);
        let none = BTreeSet::new();
        assert_eq!(find_nearest_frame(&trace, 3, &none), Some(0));
        assert_eq!(find_nearest_frame(&trace, 8, &none), Some(1));
        assert_eq!(find_nearest_frame(&trace, 10, &none), Some(1));
    }

    #[test]
    fn test_nearest_frame_tie_goes_to_earlier() {
        let trace = frames(&[(0, 1), (10, 2), (20, 3)]);
        assert_eq!(find_nearest_frame(&trace, 15, &BTreeSet::new()), Some(1));
    }

    #[test]
    fn test_nearest_frame_skips_folded_lines() {
        let trace = frames(&[(0, 1), (10, 2), (20, 3)]);
        assert_eq!(find_nearest_frame(&trace, 9, &btreeset! {2}), Some(0));
        assert_eq!(find_nearest_frame(&trace, 16, &btreeset! {2}), Some(2));
    }

    #[test]
    fn test_prev_and_next_skip_folded() {
        let trace = seven_lines();
        let folded = btreeset! {3, 4};
        assert_eq!(find_next_frame(&trace, &trace[1], &folded), Some(4));
        assert_eq!(find_prev_frame(&trace, &trace[4], &folded), Some(1));
        assert_eq!(find_next_frame(&trace, &trace[6], &folded), None);
        assert_eq!(find_prev_frame(&trace, &trace[0], &folded), None);
    }

    #[test]
    fn test_navigation_works_from_a_folded_frame() {
        let trace = seven_lines();
        let folded = btreeset! {3};
        assert_eq!(find_next_frame(&trace, &trace[2], &folded), Some(3));
        assert_eq!(find_prev_frame(&trace, &trace[2], &folded), Some(1));
    }
}
