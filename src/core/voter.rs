//! Local probability voting: spatial support for a candidate direction.

use crate::core::median_filter::PassConfig;
use crate::core::swath::WindSwath;

/// Spatial support gathered for one candidate direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSupport {
    /// Averaged neighbor probability, 0.0 when unsupported.
    pub probability: f32,
    /// Number of selected neighbors that voted.
    pub neighbor_count: usize,
}

/// The best-supported ambiguity of a cell for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub rank: usize,
    pub probability: f32,
    pub neighbor_count: usize,
}

/// Computes, for a cell and a candidate direction, how strongly the
/// neighborhood's current selections agree with that direction. A neighbor
/// votes through its selected ambiguity: it contributes that ambiguity's
/// normalized probability when the selection is also the neighbor's nearest
/// ambiguity to the candidate direction, and zero when it disagrees.
/// Unselected neighbors do not vote, so consensus spreads outward from
/// resolved regions as a sweep commits selections.
pub struct LocalProbabilityVoter<'a> {
    swath: &'a WindSwath,
    config: &'a PassConfig,
}

impl<'a> LocalProbabilityVoter<'a> {
    pub fn new(swath: &'a WindSwath, config: &'a PassConfig) -> Self {
        Self { swath, config }
    }

    /// The cross-track window bounds for a center index, clipped to the swath
    /// and to the configured border skip.
    fn cti_bounds(&self, cti: usize) -> (usize, usize) {
        let half = self.config.window_size / 2;
        let n = self.swath.cross_track_bins();
        let skip = self.config.border_skip.min(n);
        let lo = cti.saturating_sub(half).max(skip);
        let hi = (cti + half + 1).min(n.saturating_sub(skip));
        (lo, hi)
    }

    /// The along-track window bounds for a center index, clipped to the
    /// swath only. The border skip applies to the cross-track edges, where
    /// retrieval quality degrades; the along-track ends are ordinary data.
    fn ati_bounds(&self, ati: usize) -> (usize, usize) {
        let half = self.config.window_size / 2;
        let n = self.swath.along_track_bins();
        let lo = ati.saturating_sub(half);
        let hi = (ati + half + 1).min(n);
        (lo, hi)
    }

    /// True if the cell at a window position may vote in this pass.
    fn neighbor_may_vote(&self, cti: usize, ati: usize) -> bool {
        match self.swath.get(cti, ati) {
            Some(cell) => {
                if cell.ambiguity_count() == 0 {
                    return false;
                }
                // Land/ice cells sit out until a pass explicitly brings
                // contaminated cells in; rain influence is a per-pass toggle.
                if !self.config.update_contaminated && (cell.flags.land || cell.flags.ice) {
                    return false;
                }
                if cell.flags.rain && !self.config.rain_may_vote {
                    return false;
                }
                true
            }
            None => false,
        }
    }

    /// Spatial support for `direction` at cell (`cti`, `ati`).
    ///
    /// Only neighbors with a current selection vote. A selected neighbor
    /// whose selection disagrees with the candidate still counts toward the
    /// denominator, voting zero; absent, empty, and unselected cells do not
    /// count at all. A voter count below the configured minimum makes the
    /// candidate unsupported (probability 0).
    pub fn window_support(&self, cti: usize, ati: usize, direction: f32) -> WindowSupport {
        let (cti_min, cti_max) = self.cti_bounds(cti);
        let (ati_min, ati_max) = self.ati_bounds(ati);

        let mut sum = 0.0f32;
        let mut count = 0usize;
        for i in cti_min..cti_max {
            for j in ati_min..ati_max {
                if i == cti && j == ati {
                    continue; // never count the central cell
                }
                if !self.neighbor_may_vote(i, j) {
                    continue;
                }
                let neighbor = self.swath.get(i, j).unwrap();
                let Some(selected) = neighbor.selected_rank() else {
                    continue;
                };
                if let Some((nearest, _)) = neighbor.nearest_to_direction(direction) {
                    if nearest == selected {
                        sum += neighbor.probability(selected);
                    }
                    count += 1;
                }
            }
        }

        if count == 0 || count < self.config.min_neighbor_count {
            return WindowSupport {
                probability: 0.0,
                neighbor_count: count,
            };
        }
        WindowSupport {
            probability: sum / count as f32,
            neighbor_count: count,
        }
    }

    /// Evaluate every ambiguity of the cell and return the best-supported
    /// one. Ties keep the higher-likelihood rank. `None` for absent or empty
    /// cells.
    pub fn best_candidate(&self, cti: usize, ati: usize) -> Option<CandidateScore> {
        let cell = self.swath.get(cti, ati)?;
        if cell.ambiguity_count() == 0 {
            return None;
        }

        let mut best: Option<CandidateScore> = None;
        for (rank, amb) in cell.ambiguities().iter().enumerate() {
            let support = self.window_support(cti, ati, amb.direction);
            let better = match best {
                Some(b) => support.probability > b.probability,
                None => true,
            };
            if better {
                best = Some(CandidateScore {
                    rank,
                    probability: support.probability,
                    neighbor_count: support.neighbor_count,
                });
            }
        }
        best
    }

    /// Streamline-fallback consistency check: every voting neighbor whose
    /// nudge vector is known must have its nearest-to-`direction` ambiguity
    /// within `tolerance` radians of that nudge direction.
    ///
    /// Neighbors without a nudge vector are skipped rather than failing the
    /// check, so sparse nudge coverage never disqualifies a neighborhood.
    /// Neighbors barred from voting in this pass are skipped the same way.
    pub fn window_agrees_with_nudge(
        &self,
        cti: usize,
        ati: usize,
        direction: f32,
        tolerance: f32,
    ) -> bool {
        let (cti_min, cti_max) = self.cti_bounds(cti);
        let (ati_min, ati_max) = self.ati_bounds(ati);

        for i in cti_min..cti_max {
            for j in ati_min..ati_max {
                if i == cti && j == ati {
                    continue;
                }
                if !self.neighbor_may_vote(i, j) {
                    continue;
                }
                let neighbor = self.swath.get(i, j).unwrap();
                let Some(nudge) = neighbor.nudge else {
                    continue;
                };
                if let Some((_, amb)) = neighbor.nearest_to_direction(direction) {
                    if crate::types::angular_difference(amb.direction, nudge.direction) > tolerance
                    {
                        return false;
                    }
                }
            }
        }
        true
    }
}
