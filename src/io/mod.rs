//! I/O modules for nudge fields and diagnostic output

pub mod nudge;
pub mod ascii_dump;

pub use nudge::{GriddedWindField, NudgeSource, UniformWind};
pub use ascii_dump::{write_swath_ascii, write_swath_ascii_to, DUMP_AMBIGUITY_SLOTS};
