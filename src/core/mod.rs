//! Core ambiguity-removal modules

pub mod cell;
pub mod swath;
pub mod voter;
pub mod streamline;
pub mod median_filter;
pub mod controller;
pub mod diagnostics;

// Re-export main types
pub use cell::WindVectorCell;
pub use swath::WindSwath;
pub use voter::{CandidateScore, LocalProbabilityVoter, WindowSupport};
pub use streamline::{StreamlineDetector, DEFAULT_STREAMLINE_ANGLE_DEG};
pub use median_filter::{MedianFilterPass, PassConfig};
pub use controller::{AmbiguityRemovalController, PassStep, RemovalConfig, RemovalReport};
pub use diagnostics::{DirectionInterval, DirectionRanges, DIRECTION_TRACE_BINS};
