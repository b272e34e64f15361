//! scatwind: A Fast, Modular Scatterometer Wind Ambiguity-Removal Engine
//!
//! A scatterometer's backscatter measurement is direction-ambiguous: the
//! per-cell maximum-likelihood retrieval yields a short ranked list of
//! plausible wind vectors but cannot pick the physically correct one. This
//! library turns those ambiguous candidates into a single, spatially
//! consistent wind field over the swath grid using iterative neighborhood
//! voting, forecast ("nudge") guidance, and streamline-aware tie breaking.
//!
//! The retrieval itself, the product file formats, and configuration loading
//! are external collaborators; this crate consumes a populated [`WindSwath`]
//! and mutates only each cell's selection.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    Ambiguity, ContaminationFlags, LonLat, ProductMetadata, WindError, WindResult, WindVector,
};

pub use crate::core::{
    AmbiguityRemovalController, MedianFilterPass, PassConfig, PassStep, RemovalConfig,
    RemovalReport, StreamlineDetector, WindSwath, WindVectorCell,
};

pub use io::{GriddedWindField, NudgeSource};
