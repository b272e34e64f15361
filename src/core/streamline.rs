//! Streamline classification: cells whose two leading ambiguities point in
//! nearly opposite directions.
//!
//! Along atmospheric streamlines the retrieval often produces two equally
//! plausible solutions 180 degrees apart. Purely local voting cannot break
//! that tie, so these cells get a different selection policy that leans on
//! independent forecast (nudge) information.

use crate::core::cell::WindVectorCell;
use crate::types::{angular_difference, DTR};

/// Default opposing-direction threshold in degrees.
pub const DEFAULT_STREAMLINE_ANGLE_DEG: f32 = 170.0;

/// Classifies a cell as a streamline case.
#[derive(Debug, Clone, Copy)]
pub struct StreamlineDetector {
    /// Threshold in radians; leading directions further apart than this mark
    /// a streamline cell.
    angle_threshold: f32,
}

impl StreamlineDetector {
    pub fn new(angle_threshold_deg: f32) -> Self {
        Self {
            angle_threshold: angle_threshold_deg * DTR,
        }
    }

    /// True if the cell's two highest-ranked ambiguities differ in direction
    /// by more than the threshold. Cells with fewer than two ambiguities are
    /// never streamline cases.
    pub fn is_streamline(&self, cell: &WindVectorCell) -> bool {
        let ambiguities = cell.ambiguities();
        if ambiguities.len() < 2 {
            return false;
        }
        angular_difference(ambiguities[0].direction, ambiguities[1].direction)
            > self.angle_threshold
    }
}

impl Default for StreamlineDetector {
    fn default() -> Self {
        Self::new(DEFAULT_STREAMLINE_ANGLE_DEG)
    }
}
