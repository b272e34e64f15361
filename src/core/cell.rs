//! Wind vector cell: one grid location's ranked ambiguity list and its
//! current selection.

use crate::core::diagnostics::DirectionRanges;
use crate::types::{angular_difference, Ambiguity, ContaminationFlags, LonLat, WindVector};

/// One wind vector cell of the swath grid.
///
/// The ambiguity list is owned by the cell and kept in rank order (highest
/// likelihood first, insertion order = rank order). The current selection is
/// a rank index into that list, never a second copy of the vector, so it can
/// never dangle or drift out of sync with the list.
#[derive(Debug, Clone)]
pub struct WindVectorCell {
    position: LonLat,
    ambiguities: Vec<Ambiguity>,
    selected: Option<usize>,
    /// Normalized relative probability per ambiguity, filled in by
    /// `init_probabilities` before filtering starts.
    probabilities: Vec<f32>,
    pub nudge: Option<WindVector>,
    pub flags: ContaminationFlags,
    pub direction_ranges: Option<DirectionRanges>,
}

impl WindVectorCell {
    pub fn new(position: LonLat, ambiguities: Vec<Ambiguity>) -> Self {
        Self {
            position,
            ambiguities,
            selected: None,
            probabilities: Vec::new(),
            nudge: None,
            flags: ContaminationFlags::default(),
            direction_ranges: None,
        }
    }

    pub fn position(&self) -> LonLat {
        self.position
    }

    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    pub fn ambiguity_count(&self) -> usize {
        self.ambiguities.len()
    }

    /// Rank index of the currently selected ambiguity, if any.
    pub fn selected_rank(&self) -> Option<usize> {
        self.selected
    }

    /// The currently selected ambiguity, if any.
    pub fn selected(&self) -> Option<&Ambiguity> {
        self.selected.map(|rank| &self.ambiguities[rank])
    }

    /// Select the ambiguity at `rank`. Out-of-range ranks are ignored so a
    /// stale decision can never corrupt the cell.
    pub fn select(&mut self, rank: usize) {
        if rank < self.ambiguities.len() {
            self.selected = Some(rank);
        } else {
            log::warn!(
                "attempted to select rank {} of {} ambiguities, ignoring",
                rank,
                self.ambiguities.len()
            );
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Normalized relative probability of the ambiguity at `rank`, or 0.0
    /// before `init_probabilities` has run.
    pub fn probability(&self, rank: usize) -> f32 {
        self.probabilities.get(rank).copied().unwrap_or(0.0)
    }

    /// Convert the objective scores into a relative probability distribution:
    /// subtract the best (first-ranked) objective, exponentiate half the
    /// difference, normalize to sum to 1. The objectives behave like log
    /// likelihoods, so this yields each ambiguity's relative probability of
    /// being the true wind.
    pub fn init_probabilities(&mut self) {
        if self.ambiguities.is_empty() {
            self.probabilities.clear();
            return;
        }
        let best = self.ambiguities[0].objective;
        let mut probs: Vec<f32> = self
            .ambiguities
            .iter()
            .map(|a| ((a.objective - best) / 2.0).exp())
            .collect();
        let sum: f32 = probs.iter().sum();
        if sum.is_finite() && sum > 0.0 {
            for p in probs.iter_mut() {
                *p /= sum;
            }
        } else {
            // Degenerate objectives: fall back to a uniform distribution
            let uniform = 1.0 / probs.len() as f32;
            for p in probs.iter_mut() {
                *p = uniform;
            }
        }
        self.probabilities = probs;
    }

    /// The ambiguity whose direction has the smallest circular distance to
    /// `target`. Ties are broken by rank: the higher-likelihood candidate
    /// wins.
    pub fn nearest_to_direction(&self, target: f32) -> Option<(usize, &Ambiguity)> {
        self.nearest_to_direction_within(target, self.ambiguities.len())
    }

    /// Same as `nearest_to_direction`, restricted to the first `max_rank`
    /// ambiguities.
    pub fn nearest_to_direction_within(
        &self,
        target: f32,
        max_rank: usize,
    ) -> Option<(usize, &Ambiguity)> {
        let mut nearest: Option<(usize, &Ambiguity)> = None;
        let mut min_dif = f32::INFINITY;
        for (rank, amb) in self.ambiguities.iter().take(max_rank).enumerate() {
            let dif = angular_difference(amb.direction, target);
            if dif < min_dif {
                min_dif = dif;
                nearest = Some((rank, amb));
            }
        }
        nearest
    }
}
