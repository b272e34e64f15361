use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full circle in radians.
pub const TWO_PI: f32 = 2.0 * std::f32::consts::PI;

/// Degrees-to-radians conversion factor.
pub const DTR: f32 = std::f32::consts::PI / 180.0;

/// Radians-to-degrees conversion factor.
pub const RTD: f32 = 180.0 / std::f32::consts::PI;

/// Geographic position in radians (longitude, latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f32,
    pub latitude: f32,
}

impl LonLat {
    pub fn new(longitude: f32, latitude: f32) -> Self {
        Self { longitude, latitude }
    }
}

/// A single wind vector (speed in m/s, direction in radians [0, 2pi))
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub speed: f32,
    pub direction: f32,
}

impl WindVector {
    pub fn new(speed: f32, direction: f32) -> Self {
        Self {
            speed,
            direction: wrap_angle(direction),
        }
    }

    /// Eastward and northward components (u, v).
    pub fn to_uv(&self) -> (f32, f32) {
        (
            self.speed * self.direction.cos(),
            self.speed * self.direction.sin(),
        )
    }

    /// Build a wind vector from eastward/northward components.
    pub fn from_uv(u: f32, v: f32) -> Self {
        Self {
            speed: (u * u + v * v).sqrt(),
            direction: wrap_angle(v.atan2(u)),
        }
    }
}

/// One candidate wind solution for a grid cell, produced by the external
/// maximum-likelihood retrieval. Rank is implicit: ambiguities are stored in
/// descending objective order, highest-likelihood first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    /// Wind speed in m/s (>= 0)
    pub speed: f32,
    /// Wind direction in radians [0, 2pi)
    pub direction: f32,
    /// Relative log-likelihood objective (higher = more likely)
    pub objective: f32,
}

impl Ambiguity {
    pub fn new(speed: f32, direction: f32, objective: f32) -> Self {
        Self {
            speed,
            direction: wrap_angle(direction),
            objective,
        }
    }

    /// Eastward and northward components (u, v).
    pub fn to_uv(&self) -> (f32, f32) {
        (
            self.speed * self.direction.cos(),
            self.speed * self.direction.sin(),
        )
    }
}

/// Per-cell contamination flags, independently settable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContaminationFlags {
    pub land: bool,
    pub ice: bool,
    pub rain: bool,
}

impl ContaminationFlags {
    pub fn is_contaminated(&self) -> bool {
        self.land || self.ice || self.rain
    }
}

/// Product-level metadata carried by a swath and serialized by external
/// product writers. This is a boundary contract only; the engine never reads
/// these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub rev_number: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub cross_track_resolution_km: f64,
    pub along_track_resolution_km: f64,
}

/// Wrap an angle into [0, 2pi).
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % TWO_PI;
    if a < 0.0 {
        a += TWO_PI;
    }
    a
}

/// Circular (wrap-around) angular distance between two directions, in [0, pi].
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let d = wrap_angle(a - b);
    if d > std::f32::consts::PI {
        TWO_PI - d
    } else {
        d
    }
}

/// Error types for wind processing
#[derive(Debug, thiserror::Error)]
pub enum WindError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Grid error: {0}")]
    Grid(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for wind operations
pub type WindResult<T> = Result<T, WindError>;
