//! The ambiguity-removal controller: runs a configured sequence of filter
//! passes over a swath and commits the final selections.

use serde::{Deserialize, Serialize};

use crate::core::median_filter::{MedianFilterPass, PassConfig};
use crate::core::streamline::DEFAULT_STREAMLINE_ANGLE_DEG;
use crate::core::swath::WindSwath;
use crate::types::{WindError, WindResult};

/// Per-pass overrides within a removal schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PassStep {
    pub min_neighbor_count: usize,
    pub border_skip: usize,
    pub use_nudge: bool,
    pub update_contaminated: bool,
    pub rain_may_vote: bool,
}

/// The recognized configuration surface for ambiguity removal.
///
/// The window size and probability threshold are shared across the schedule;
/// each step sets its own neighbor-count and border rules, typically
/// loosening them as the field firms up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalConfig {
    pub window_size: usize,
    pub probability_threshold: f32,
    pub passes: Vec<PassStep>,
    pub streamline_angle_threshold_deg: f32,
    pub nudge_angle_tolerance_deg: f32,
    /// Upper bound on sweeps per configured pass while waiting for the flip
    /// count to reach zero.
    pub max_iterations_per_pass: usize,
    /// Seed selections from the nudge field before the first pass. Without
    /// seeding no cell has a selection, so no neighborhood can vote.
    pub seed_with_nudge: bool,
    /// Deepest rank the nudge seeding may select.
    pub nudge_seed_max_rank: usize,
    /// Terminal cleanup: give unresolved cells their nudge-nearest ambiguity
    /// after the last pass.
    pub fill_gaps_with_nudge: bool,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        // Four stages with decreasing neighbor requirements and alternating
        // border handling, matching the reference parameter sets. Rain cells
        // gain their vote after the first stage.
        Self {
            window_size: 7,
            probability_threshold: 0.5,
            passes: vec![
                PassStep {
                    min_neighbor_count: 8,
                    border_skip: 2,
                    use_nudge: false,
                    update_contaminated: false,
                    rain_may_vote: false,
                },
                PassStep {
                    min_neighbor_count: 6,
                    border_skip: 0,
                    use_nudge: true,
                    update_contaminated: false,
                    rain_may_vote: true,
                },
                PassStep {
                    min_neighbor_count: 4,
                    border_skip: 2,
                    use_nudge: true,
                    update_contaminated: false,
                    rain_may_vote: true,
                },
                PassStep {
                    min_neighbor_count: 3,
                    border_skip: 0,
                    use_nudge: true,
                    update_contaminated: true,
                    rain_may_vote: true,
                },
            ],
            streamline_angle_threshold_deg: DEFAULT_STREAMLINE_ANGLE_DEG,
            nudge_angle_tolerance_deg: 30.0,
            max_iterations_per_pass: 200,
            seed_with_nudge: true,
            nudge_seed_max_rank: 2,
            fill_gaps_with_nudge: false,
        }
    }
}

impl RemovalConfig {
    /// Fatal startup validation; nothing runs if this fails.
    pub fn validate(&self) -> WindResult<()> {
        if self.passes.is_empty() {
            return Err(WindError::Config("pass list is empty".to_string()));
        }
        if self.max_iterations_per_pass == 0 {
            return Err(WindError::Config(
                "max iterations per pass must be positive".to_string(),
            ));
        }
        for step in &self.passes {
            self.pass_config(step).validate()?;
        }
        if self.nudge_angle_tolerance_deg < 0.0 {
            return Err(WindError::Config(format!(
                "nudge angle tolerance must be non-negative, got {}",
                self.nudge_angle_tolerance_deg
            )));
        }
        if self.nudge_seed_max_rank == 0 {
            return Err(WindError::Config(
                "nudge seed max rank must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn pass_config(&self, step: &PassStep) -> PassConfig {
        PassConfig {
            window_size: self.window_size,
            min_neighbor_count: step.min_neighbor_count,
            border_skip: step.border_skip,
            probability_threshold: self.probability_threshold,
            use_nudge: step.use_nudge,
            update_contaminated: step.update_contaminated,
            rain_may_vote: step.rain_may_vote,
        }
    }
}

/// Outcome summary of one removal run. Unresolved cells are reported here,
/// never silently defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalReport {
    /// Cells given an initial selection by the nudge seeding.
    pub cells_seeded: usize,
    /// Sweeps executed for each configured pass.
    pub pass_iterations: Vec<usize>,
    /// Total selection changes over the passes, excluding seeding.
    pub total_flips: usize,
    pub cells_resolved: usize,
    pub cells_unresolved: usize,
}

/// Runs the configured pass sequence against a swath it exclusively owns for
/// the duration of the run.
pub struct AmbiguityRemovalController {
    config: RemovalConfig,
}

impl AmbiguityRemovalController {
    /// Build a controller, failing fast on configuration errors.
    pub fn new(config: RemovalConfig) -> WindResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Check the swath shape against the engine's window and border
    /// assumptions before any pass runs.
    fn validate_swath(&self, swath: &WindSwath) -> WindResult<()> {
        let n_cti = swath.cross_track_bins();
        let n_ati = swath.along_track_bins();
        if n_cti == 0 || n_ati == 0 {
            return Err(WindError::Grid("swath grid is empty".to_string()));
        }
        for step in &self.config.passes {
            if 2 * step.border_skip >= n_cti {
                return Err(WindError::Grid(format!(
                    "border skip {} leaves no interior in {} cross-track bins",
                    step.border_skip, n_cti
                )));
            }
        }
        Ok(())
    }

    /// Run the full schedule. Normalizes every cell's objective scores into
    /// relative probabilities once, seeds initial selections from the nudge
    /// field, then iterates each configured pass until its flip count
    /// reaches zero (or the iteration cap), and finally applies the optional
    /// nudge gap fill.
    pub fn run(&self, swath: &mut WindSwath) -> WindResult<RemovalReport> {
        self.validate_swath(swath)?;

        log::info!(
            "ambiguity removal: {} passes over {}x{} swath, {} cells with ambiguities",
            self.config.passes.len(),
            swath.cross_track_bins(),
            swath.along_track_bins(),
            swath.num_cells_with_ambiguities()
        );

        swath.init_probabilities();

        let cells_seeded = if self.config.seed_with_nudge {
            let seeded = swath.init_with_nudge(self.config.nudge_seed_max_rank);
            log::info!("nudge seeding selected {} cells", seeded);
            seeded
        } else {
            0
        };

        let mut pass_iterations = Vec::with_capacity(self.config.passes.len());
        let mut total_flips = 0usize;

        for (stage, step) in self.config.passes.iter().enumerate() {
            let pass = MedianFilterPass::new(
                self.config.pass_config(step),
                self.config.streamline_angle_threshold_deg,
                self.config.nudge_angle_tolerance_deg,
            )?;

            let mut iterations = 0usize;
            while iterations < self.config.max_iterations_per_pass {
                let flips = pass.run(swath);
                iterations += 1;
                total_flips += flips;
                if flips == 0 {
                    break;
                }
            }
            log::info!(
                "pass {}: {} sweeps, {} cells selected",
                stage,
                iterations,
                swath.num_cells_selected()
            );
            pass_iterations.push(iterations);
        }

        if self.config.fill_gaps_with_nudge {
            let filled = swath.select_nudge();
            log::info!("nudge gap fill resolved {} cells", filled);
            total_flips += filled;
        }

        let cells_resolved = swath.num_cells_selected();
        let cells_unresolved = swath.num_cells_with_ambiguities() - cells_resolved;
        if cells_unresolved > 0 {
            log::warn!("{} cells left unresolved", cells_unresolved);
        }

        Ok(RemovalReport {
            cells_seeded,
            pass_iterations,
            total_flips,
            cells_resolved,
            cells_unresolved,
        })
    }
}
