//! Direction-interval diagnostics attached to wind vector cells.
//!
//! These records trace how the retrieval's objective function behaved around
//! the direction axis. They exist purely for debugging output: the ambiguity
//! removal engine never consults them when making a selection.

use serde::{Deserialize, Serialize};

use crate::types::{wrap_angle, TWO_PI};

/// Number of direction bins in the best-objective / best-speed ridge traces.
pub const DIRECTION_TRACE_BINS: usize = 90;

/// An angular interval on the direction circle, stored as wrapped left/right
/// bounds in radians. The interval runs counter-clockwise from `left` to
/// `right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionInterval {
    pub left: f32,
    pub right: f32,
}

impl DirectionInterval {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: wrap_angle(left),
            right: wrap_angle(right),
        }
    }

    /// Angular width of the interval in radians.
    pub fn width(&self) -> f32 {
        wrap_angle(self.right - self.left)
    }

    /// True if `direction` falls inside the interval.
    pub fn contains(&self, direction: f32) -> bool {
        wrap_angle(direction - self.left) <= self.width()
    }
}

/// Diagnostic direction ranges for one cell: the likelihood-ridge intervals
/// plus fixed-length best-objective and best-speed traces sampled on a
/// uniform direction grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionRanges {
    /// One interval per ambiguity, in rank order.
    pub intervals: Vec<DirectionInterval>,
    /// Best objective found at each trace direction bin.
    pub best_objective: Vec<f32>,
    /// Speed of the best solution at each trace direction bin.
    pub best_speed: Vec<f32>,
}

impl DirectionRanges {
    pub fn new(intervals: Vec<DirectionInterval>) -> Self {
        Self {
            intervals,
            best_objective: vec![0.0; DIRECTION_TRACE_BINS],
            best_speed: vec![0.0; DIRECTION_TRACE_BINS],
        }
    }

    /// Sum of all interval widths, in radians.
    pub fn total_width(&self) -> f32 {
        self.intervals.iter().map(|i| i.width()).sum()
    }

    /// Direction in radians at the center of trace bin `bin`.
    pub fn trace_direction(bin: usize) -> f32 {
        (bin as f32 + 0.5) * TWO_PI / DIRECTION_TRACE_BINS as f32
    }

    /// Record an objective/speed sample into the trace bin covering
    /// `direction`, keeping the best objective seen so far.
    pub fn record_sample(&mut self, direction: f32, objective: f32, speed: f32) {
        let step = TWO_PI / DIRECTION_TRACE_BINS as f32;
        let bin = ((wrap_angle(direction) / step) as usize).min(DIRECTION_TRACE_BINS - 1);
        if objective > self.best_objective[bin] || self.best_speed[bin] == 0.0 {
            self.best_objective[bin] = objective;
            self.best_speed[bin] = speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DTR;
    use approx::assert_relative_eq;

    #[test]
    fn test_interval_width_wraps_zero() {
        // 350 deg to 20 deg is a 30 deg interval across the wrap point
        let interval = DirectionInterval::new(350.0 * DTR, 20.0 * DTR);
        assert_relative_eq!(interval.width(), 30.0 * DTR, epsilon = 1e-5);
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0 * DTR));
        assert!(!interval.contains(180.0 * DTR));
    }

    #[test]
    fn test_total_width_sums_intervals() {
        let ranges = DirectionRanges::new(vec![
            DirectionInterval::new(0.0, 10.0 * DTR),
            DirectionInterval::new(90.0 * DTR, 110.0 * DTR),
        ]);
        assert_relative_eq!(ranges.total_width(), 30.0 * DTR, epsilon = 1e-5);
    }

    #[test]
    fn test_record_sample_keeps_best_objective() {
        let mut ranges = DirectionRanges::new(Vec::new());
        let dir = DirectionRanges::trace_direction(10);
        ranges.record_sample(dir, -4.0, 6.0);
        ranges.record_sample(dir, -2.0, 7.5);
        ranges.record_sample(dir, -8.0, 3.0);
        assert_relative_eq!(ranges.best_objective[10], -2.0, epsilon = 1e-6);
        assert_relative_eq!(ranges.best_speed[10], 7.5, epsilon = 1e-6);
    }

    #[test]
    fn test_trace_has_fixed_length() {
        let ranges = DirectionRanges::new(Vec::new());
        assert_eq!(ranges.best_objective.len(), DIRECTION_TRACE_BINS);
        assert_eq!(ranges.best_speed.len(), DIRECTION_TRACE_BINS);
    }
}
