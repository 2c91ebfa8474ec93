//! Breakpoint jumps and line sets
//!
//! Breakpoints and folded lines are independent sets of 1-based line
//! numbers. Toggling either never moves the current frame; callers simply
//! recompute the jump targets afterwards.

use super::navigation::visible;
use crate::runtime::Frame;
use std::collections::BTreeSet;

/// Add `line` if absent, remove it otherwise. Returns whether the line is now
/// in the set.
pub fn toggle_line(lines: &mut BTreeSet<usize>, line: usize) -> bool {
    if lines.remove(&line) {
        false
    } else {
        lines.insert(line);
        true
    }
}

/// The next visible frame after `current` whose line carries a breakpoint.
pub fn find_next_breakpoint_frame(
    frames: &[Frame],
    current: Option<&Frame>,
    breakpoints: &BTreeSet<usize>,
    folded: &BTreeSet<usize>,
) -> Option<usize> {
    let current = current?;
    if breakpoints.is_empty() {
        return None;
    }
    frames.iter().position(|frame| {
        frame.time() > current.time()
            && breakpoints.contains(&frame.line())
            && visible(frame, folded)
    })
}

/// The previous visible frame before `current` whose line carries a
/// breakpoint.
pub fn find_prev_breakpoint_frame(
    frames: &[Frame],
    current: Option<&Frame>,
    breakpoints: &BTreeSet<usize>,
    folded: &BTreeSet<usize>,
) -> Option<usize> {
    let current = current?;
    if breakpoints.is_empty() {
        return None;
    }
    frames.iter().rposition(|frame| {
        frame.time() < current.time()
            && breakpoints.contains(&frame.line())
            && visible(frame, folded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::tests::seven_lines;
    use maplit::btreeset;

    #[test]
    fn test_toggle_line() {
        let mut lines = btreeset! {2};
        assert!(!toggle_line(&mut lines, 2));
        assert!(toggle_line(&mut lines, 5));
        assert_eq!(lines, btreeset! {5});
    }

    #[test]
    fn test_breakpoints_with_folded_line() {
        let trace = seven_lines();
        let breakpoints = btreeset! {2, 4, 6};
        let folded = btreeset! {2};

        assert_eq!(
            find_next_breakpoint_frame(&trace, Some(&trace[0]), &breakpoints, &folded),
            Some(3)
        );
        assert_eq!(
            find_next_breakpoint_frame(&trace, Some(&trace[3]), &breakpoints, &folded),
            Some(5)
        );
        assert_eq!(
            find_prev_breakpoint_frame(&trace, Some(&trace[5]), &breakpoints, &folded),
            Some(3)
        );
        // line 2 is folded, so nothing before line 4
        assert_eq!(
            find_prev_breakpoint_frame(&trace, Some(&trace[3]), &breakpoints, &folded),
            None
        );
    }

    #[test]
    fn test_breakpoint_search_needs_current_and_breakpoints() {
        let trace = seven_lines();
        let none = BTreeSet::new();
        assert_eq!(find_next_breakpoint_frame(&trace, None, &btreeset! {2}, &none), None);
        assert_eq!(find_next_breakpoint_frame(&trace, Some(&trace[0]), &none, &none), None);
    }
}
