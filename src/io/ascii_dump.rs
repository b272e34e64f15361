//! Human-debugging ASCII dump of a wind swath.
//!
//! One line per populated cell. This is a stable, parsed-by-consumers
//! format (version 1): field order and count must not change without a
//! version bump. Per line:
//!
//! ```text
//! ati cti n_ambiguities total_interval_width_deg
//!     then exactly 4 ambiguity slots, each: speed dir_deg objective left_deg right_deg
//!     then 90 best-objective trace values
//!     then 90 best-speed trace values
//! ```
//!
//! Absent ambiguities, intervals, and traces are zero-filled so every line
//! has the same field count.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::diagnostics::DIRECTION_TRACE_BINS;
use crate::core::swath::WindSwath;
use crate::types::{WindResult, RTD};

/// Ambiguity slots serialized per line, regardless of how many a cell has.
pub const DUMP_AMBIGUITY_SLOTS: usize = 4;

/// Write the diagnostic dump for a swath to a file.
pub fn write_swath_ascii<P: AsRef<Path>>(path: P, swath: &WindSwath) -> WindResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_swath_ascii_to(&mut writer, swath)?;
    writer.flush()?;
    Ok(())
}

/// Write the diagnostic dump to any writer. Cells are emitted in raster
/// order, along-track outer.
pub fn write_swath_ascii_to<W: Write>(writer: &mut W, swath: &WindSwath) -> WindResult<()> {
    log::debug!(
        "writing ascii dump for {}x{} swath",
        swath.cross_track_bins(),
        swath.along_track_bins()
    );
    for ati in 0..swath.along_track_bins() {
        for cti in 0..swath.cross_track_bins() {
            let Some(cell) = swath.get(cti, ati) else {
                continue;
            };
            let total_width_deg = cell
                .direction_ranges
                .as_ref()
                .map(|r| r.total_width() * RTD)
                .unwrap_or(0.0);

            write!(
                writer,
                "{} {} {} {:.4}",
                ati,
                cti,
                cell.ambiguity_count(),
                total_width_deg
            )?;

            for slot in 0..DUMP_AMBIGUITY_SLOTS {
                let (speed, dir_deg, objective) = match cell.ambiguities().get(slot) {
                    Some(a) => (a.speed, a.direction * RTD, a.objective),
                    None => (0.0, 0.0, 0.0),
                };
                let (left_deg, right_deg) = cell
                    .direction_ranges
                    .as_ref()
                    .and_then(|r| r.intervals.get(slot))
                    .map(|i| (i.left * RTD, i.right * RTD))
                    .unwrap_or((0.0, 0.0));
                write!(
                    writer,
                    " {:.4} {:.4} {:.4} {:.4} {:.4}",
                    speed, dir_deg, objective, left_deg, right_deg
                )?;
            }

            for bin in 0..DIRECTION_TRACE_BINS {
                let value = cell
                    .direction_ranges
                    .as_ref()
                    .map(|r| r.best_objective[bin])
                    .unwrap_or(0.0);
                write!(writer, " {:.4}", value)?;
            }
            for bin in 0..DIRECTION_TRACE_BINS {
                let value = cell
                    .direction_ranges
                    .as_ref()
                    .map(|r| r.best_speed[bin])
                    .unwrap_or(0.0);
                write!(writer, " {:.4}", value)?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}
