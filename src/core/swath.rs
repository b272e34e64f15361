//! The wind swath: a 2D grid of optional wind vector cells indexed by
//! (cross-track index, along-track index).

use ndarray::Array2;

use crate::core::cell::WindVectorCell;
use crate::io::nudge::NudgeSource;
use crate::types::{ProductMetadata, WindError, WindResult};

/// An ambiguous wind field gridded in cross track and along track.
///
/// The grid is allocated once per product and never resized. A location with
/// no measurements holds `None`, not an empty cell. During ambiguity removal
/// only each cell's selection is mutated.
#[derive(Debug, Clone)]
pub struct WindSwath {
    cells: Array2<Option<WindVectorCell>>,
    cross_track_bins: usize,
    along_track_bins: usize,
    pub metadata: Option<ProductMetadata>,
}

impl WindSwath {
    /// Allocate an empty swath grid.
    pub fn new(cross_track_bins: usize, along_track_bins: usize) -> WindResult<Self> {
        if cross_track_bins == 0 || along_track_bins == 0 {
            return Err(WindError::Grid(format!(
                "swath dimensions must be nonzero, got {}x{}",
                cross_track_bins, along_track_bins
            )));
        }
        Ok(Self {
            cells: Array2::from_elem((cross_track_bins, along_track_bins), None),
            cross_track_bins,
            along_track_bins,
            metadata: None,
        })
    }

    pub fn cross_track_bins(&self) -> usize {
        self.cross_track_bins
    }

    pub fn along_track_bins(&self) -> usize {
        self.along_track_bins
    }

    /// Place a cell at a grid coordinate. Replacing an existing cell is an
    /// error: the retrieval phase produces each location exactly once.
    pub fn add(&mut self, cti: usize, ati: usize, cell: WindVectorCell) -> WindResult<()> {
        if cti >= self.cross_track_bins || ati >= self.along_track_bins {
            return Err(WindError::Grid(format!(
                "cell index ({}, {}) outside {}x{} swath",
                cti, ati, self.cross_track_bins, self.along_track_bins
            )));
        }
        let slot = &mut self.cells[[cti, ati]];
        if slot.is_some() {
            return Err(WindError::Grid(format!(
                "attempted cell replacement at ({}, {})",
                cti, ati
            )));
        }
        *slot = Some(cell);
        Ok(())
    }

    /// Remove and return the cell at a grid coordinate.
    pub fn remove(&mut self, cti: usize, ati: usize) -> Option<WindVectorCell> {
        if cti >= self.cross_track_bins || ati >= self.along_track_bins {
            return None;
        }
        self.cells[[cti, ati]].take()
    }

    /// The cell at a grid coordinate, or `None` if out of bounds or
    /// unpopulated. Never panics.
    pub fn get(&self, cti: usize, ati: usize) -> Option<&WindVectorCell> {
        if cti >= self.cross_track_bins || ati >= self.along_track_bins {
            return None;
        }
        self.cells[[cti, ati]].as_ref()
    }

    pub fn get_mut(&mut self, cti: usize, ati: usize) -> Option<&mut WindVectorCell> {
        if cti >= self.cross_track_bins || ati >= self.along_track_bins {
            return None;
        }
        self.cells[[cti, ati]].as_mut()
    }

    /// Number of populated cells with a current selection.
    pub fn num_cells_selected(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.selected().is_some())
            .count()
    }

    /// Number of populated cells with a non-empty ambiguity list.
    pub fn num_cells_with_ambiguities(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.ambiguity_count() > 0)
            .count()
    }

    /// Largest ambiguity count over all populated cells.
    pub fn max_ambiguity_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .map(|c| c.ambiguity_count())
            .max()
            .unwrap_or(0)
    }

    /// Compute every cell's relative-probability distribution once, before
    /// the first filter pass.
    pub fn init_probabilities(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.init_probabilities();
        }
    }

    /// Seed every populated cell's selection with the ambiguity at `rank`
    /// (1-based, matching product conventions). Cells with fewer ambiguities
    /// are left unselected.
    pub fn init_with_rank(&mut self, rank: usize) -> usize {
        let mut count = 0;
        for cell in self.cells.iter_mut().flatten() {
            if rank >= 1 && rank <= cell.ambiguity_count() {
                cell.select(rank - 1);
                count += 1;
            }
        }
        count
    }

    /// Seed selections from the nudge field: single-ambiguity cells take that
    /// ambiguity, others take the ambiguity nearest to their nudge direction
    /// among the first `max_rank` ranks.
    pub fn init_with_nudge(&mut self, max_rank: usize) -> usize {
        let mut count = 0;
        for cell in self.cells.iter_mut().flatten() {
            if cell.ambiguity_count() == 1 {
                cell.select(0);
                count += 1;
            } else if let Some(nudge) = cell.nudge {
                if let Some((rank, _)) =
                    cell.nearest_to_direction_within(nudge.direction, max_rank)
                {
                    cell.select(rank);
                    count += 1;
                }
            }
        }
        count
    }

    /// Attach an interpolated nudge vector to every populated cell the source
    /// can cover. Returns the number of cells nudged.
    pub fn attach_nudge(&mut self, source: &dyn NudgeSource) -> usize {
        let mut count = 0;
        for cell in self.cells.iter_mut().flatten() {
            if let Some(wv) = source.interpolate(cell.position()) {
                cell.nudge = Some(wv);
                count += 1;
            }
        }
        log::info!("attached nudge vectors to {} cells", count);
        count
    }

    /// Terminal gap fill: give any still-unselected cell its nudge-nearest
    /// ambiguity. Cells without a nudge vector stay unresolved.
    pub fn select_nudge(&mut self) -> usize {
        let mut count = 0;
        for cell in self.cells.iter_mut().flatten() {
            if cell.selected().is_some() {
                continue;
            }
            if let Some(nudge) = cell.nudge {
                if let Some((rank, _)) = cell.nearest_to_direction(nudge.direction) {
                    cell.select(rank);
                    count += 1;
                }
            }
        }
        count
    }

    /// Clear every cell's selection.
    pub fn clear_selections(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.clear_selection();
        }
    }
}
