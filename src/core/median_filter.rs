//! One full spatial-consistency sweep over the swath.
//!
//! "Median filter" is the historical product name: this is not a pixel-value
//! median but a consensus vote over ambiguity directions. Each sweep walks
//! the grid in raster order (along-track outer, cross-track inner) and
//! updates selections in place, so later cells in the same sweep see the
//! already-updated selections of earlier ones. This Gauss-Seidel ordering is
//! load-bearing: it propagates coherent regions within a single sweep and
//! must not be reordered. `run_jacobi` is the explicit double-buffered
//! alternative.

use serde::{Deserialize, Serialize};

use crate::core::streamline::StreamlineDetector;
use crate::core::swath::WindSwath;
use crate::core::voter::LocalProbabilityVoter;
use crate::types::{WindError, WindResult, DTR};

/// Configuration for a single filter pass. Immutable while the pass runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PassConfig {
    /// Square window edge length in cells; must be odd and >= 1.
    pub window_size: usize,
    /// Candidates with fewer voting neighbors than this are unsupported.
    pub min_neighbor_count: usize,
    /// Cells within this many bins of either cross-track edge are excluded.
    pub border_skip: usize,
    /// Minimum averaged neighbor probability for a direct selection.
    pub probability_threshold: f32,
    /// Enable the streamline nudge fallback.
    pub use_nudge: bool,
    /// When false, land/ice cells neither vote nor get updated and
    /// rain-flagged cells are not updated.
    pub update_contaminated: bool,
    /// Whether rain-flagged cells vote in this pass. Their own selections
    /// are still gated by `update_contaminated`.
    pub rain_may_vote: bool,
}

impl PassConfig {
    pub fn validate(&self) -> WindResult<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(WindError::Config(format!(
                "window size must be odd and positive, got {}",
                self.window_size
            )));
        }
        if !(0.0..=1.0).contains(&self.probability_threshold) {
            return Err(WindError::Config(format!(
                "probability threshold must be in [0, 1], got {}",
                self.probability_threshold
            )));
        }
        Ok(())
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            min_neighbor_count: 3,
            border_skip: 0,
            probability_threshold: 0.5,
            use_nudge: true,
            update_contaminated: false,
            rain_may_vote: true,
        }
    }
}

/// A single deterministic sweep of the ambiguity-removal filter.
pub struct MedianFilterPass {
    config: PassConfig,
    streamline: StreamlineDetector,
    /// Streamline fallback tolerance in radians.
    nudge_tolerance: f32,
}

impl MedianFilterPass {
    pub fn new(
        config: PassConfig,
        streamline_angle_threshold_deg: f32,
        nudge_angle_tolerance_deg: f32,
    ) -> WindResult<Self> {
        config.validate()?;
        if nudge_angle_tolerance_deg < 0.0 {
            return Err(WindError::Config(format!(
                "nudge angle tolerance must be non-negative, got {}",
                nudge_angle_tolerance_deg
            )));
        }
        Ok(Self {
            config,
            streamline: StreamlineDetector::new(streamline_angle_threshold_deg),
            nudge_tolerance: nudge_angle_tolerance_deg * DTR,
        })
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    /// Decide the new selection rank for one cell, or `None` to leave the
    /// cell's current selection untouched this sweep.
    fn evaluate_cell(&self, swath: &WindSwath, cti: usize, ati: usize) -> Option<usize> {
        let cell = swath.get(cti, ati)?;
        if cell.ambiguity_count() == 0 {
            return None;
        }
        if !self.config.update_contaminated && cell.flags.is_contaminated() {
            return None;
        }

        let voter = LocalProbabilityVoter::new(swath, &self.config);
        let best = voter.best_candidate(cti, ati)?;

        if best.probability >= self.config.probability_threshold
            && best.neighbor_count >= self.config.min_neighbor_count
        {
            return Some(best.rank);
        }

        // Streamline fallback: local radar evidence cannot break a
        // near-opposite tie, so consult the forecast field instead.
        if self.config.use_nudge && self.streamline.is_streamline(cell) {
            let nudge = cell.nudge?;
            let tentative_dir = cell.ambiguities()[best.rank].direction;
            if voter.window_agrees_with_nudge(cti, ati, tentative_dir, self.nudge_tolerance) {
                // Restrict to the top two ranks so the fallback cannot
                // resurrect an already-rejected low-likelihood candidate.
                let (rank, _) = cell.nearest_to_direction_within(nudge.direction, 2)?;
                return Some(rank);
            }
        }

        None
    }

    /// Run one in-place sweep. Returns the number of cells whose selection
    /// changed.
    ///
    /// Sweep order is along-track outer, cross-track inner, restricted to
    /// `[border_skip, cross_track_bins - border_skip)`. Selections are
    /// committed immediately, so the sweep is Gauss-Seidel: identical inputs
    /// always give identical outputs, but the result depends on this order.
    pub fn run(&self, swath: &mut WindSwath) -> usize {
        let n_cti = swath.cross_track_bins();
        let n_ati = swath.along_track_bins();
        let cti_lo = self.config.border_skip.min(n_cti);
        let cti_hi = n_cti.saturating_sub(self.config.border_skip);

        let mut flips = 0usize;
        for ati in 0..n_ati {
            for cti in cti_lo..cti_hi {
                let Some(rank) = self.evaluate_cell(swath, cti, ati) else {
                    continue;
                };
                let cell = swath.get_mut(cti, ati).unwrap();
                if cell.selected_rank() != Some(rank) {
                    cell.select(rank);
                    flips += 1;
                }
            }
        }
        log::debug!(
            "median filter sweep: {} flips, {} cells selected",
            flips,
            swath.num_cells_selected()
        );
        flips
    }

    /// Run one double-buffered (Jacobi) sweep: every decision is computed
    /// from the swath as it stood at sweep start, then committed at once.
    ///
    /// Order-independent and safe to parallelize, but coherent regions take
    /// more sweeps to converge than with `run`. The two variants are not
    /// interchangeable on a cell-by-cell basis; pick one per product.
    pub fn run_jacobi(&self, swath: &mut WindSwath) -> usize {
        let decisions = self.collect_decisions(swath);

        let mut flips = 0usize;
        for (cti, ati, rank) in decisions {
            let cell = swath.get_mut(cti, ati).unwrap();
            if cell.selected_rank() != Some(rank) {
                cell.select(rank);
                flips += 1;
            }
        }
        log::debug!("jacobi sweep: {} flips", flips);
        flips
    }

    #[cfg(feature = "parallel")]
    fn collect_decisions(&self, swath: &WindSwath) -> Vec<(usize, usize, usize)> {
        use rayon::prelude::*;

        let n_cti = swath.cross_track_bins();
        let cti_lo = self.config.border_skip.min(n_cti);
        let cti_hi = n_cti.saturating_sub(self.config.border_skip);

        let indices: Vec<(usize, usize)> = (0..swath.along_track_bins())
            .flat_map(|ati| (cti_lo..cti_hi).map(move |cti| (cti, ati)))
            .collect();

        indices
            .into_par_iter()
            .filter_map(|(cti, ati)| {
                self.evaluate_cell(swath, cti, ati)
                    .map(|rank| (cti, ati, rank))
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn collect_decisions(&self, swath: &WindSwath) -> Vec<(usize, usize, usize)> {
        let n_cti = swath.cross_track_bins();
        let cti_lo = self.config.border_skip.min(n_cti);
        let cti_hi = n_cti.saturating_sub(self.config.border_skip);

        let mut decisions = Vec::new();
        for ati in 0..swath.along_track_bins() {
            for cti in cti_lo..cti_hi {
                if let Some(rank) = self.evaluate_cell(swath, cti, ati) {
                    decisions.push((cti, ati, rank));
                }
            }
        }
        decisions
    }
}
