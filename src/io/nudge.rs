//! Forecast ("nudge") wind sources.
//!
//! A nudge source supplies an independently derived wind estimate for a
//! geographic position, used to seed selections and to break streamline ties.

use ndarray::Array2;

use crate::types::{wrap_angle, LonLat, WindError, WindResult, WindVector};

/// External collaborator boundary: anything that can interpolate a forecast
/// wind vector at a position. Returns `None` where the source has no
/// coverage.
pub trait NudgeSource {
    fn interpolate(&self, position: LonLat) -> Option<WindVector>;
}

/// A forecast wind field on a regular lon/lat grid, interpolated bilinearly
/// in the u/v components. Component interpolation avoids the wrap artifacts
/// of interpolating direction angles directly.
#[derive(Debug, Clone)]
pub struct GriddedWindField {
    lon_min: f32,
    lat_min: f32,
    lon_step: f32,
    lat_step: f32,
    /// Eastward component, indexed (lon index, lat index)
    u: Array2<f32>,
    /// Northward component, indexed (lon index, lat index)
    v: Array2<f32>,
}

impl GriddedWindField {
    pub fn new(
        lon_min: f32,
        lat_min: f32,
        lon_step: f32,
        lat_step: f32,
        u: Array2<f32>,
        v: Array2<f32>,
    ) -> WindResult<Self> {
        if lon_step <= 0.0 || lat_step <= 0.0 {
            return Err(WindError::Config(format!(
                "wind field grid steps must be positive, got ({}, {})",
                lon_step, lat_step
            )));
        }
        if u.dim() != v.dim() {
            return Err(WindError::Grid(format!(
                "u and v grids disagree: {:?} vs {:?}",
                u.dim(),
                v.dim()
            )));
        }
        if u.dim().0 < 2 || u.dim().1 < 2 {
            return Err(WindError::Grid(format!(
                "wind field grid {:?} too small to interpolate",
                u.dim()
            )));
        }
        Ok(Self {
            lon_min,
            lat_min,
            lon_step,
            lat_step,
            u,
            v,
        })
    }

    /// Build a field from speed/direction grids.
    pub fn from_speed_direction(
        lon_min: f32,
        lat_min: f32,
        lon_step: f32,
        lat_step: f32,
        speed: &Array2<f32>,
        direction: &Array2<f32>,
    ) -> WindResult<Self> {
        if speed.dim() != direction.dim() {
            return Err(WindError::Grid(format!(
                "speed and direction grids disagree: {:?} vs {:?}",
                speed.dim(),
                direction.dim()
            )));
        }
        let u = ndarray::Zip::from(speed)
            .and(direction)
            .map_collect(|&s, &d| s * d.cos());
        let v = ndarray::Zip::from(speed)
            .and(direction)
            .map_collect(|&s, &d| s * d.sin());
        Self::new(lon_min, lat_min, lon_step, lat_step, u, v)
    }

    /// Fractional grid coordinates for a position, or `None` outside the
    /// grid. Longitude is wrapped into the grid's range first.
    fn grid_coords(&self, position: LonLat) -> Option<(f32, f32)> {
        let (n_lon, n_lat) = self.u.dim();
        let lon = self.lon_min + wrap_angle(position.longitude - self.lon_min);
        let x = (lon - self.lon_min) / self.lon_step;
        let y = (position.latitude - self.lat_min) / self.lat_step;
        if x < 0.0 || y < 0.0 || x > (n_lon - 1) as f32 || y > (n_lat - 1) as f32 {
            return None;
        }
        Some((x, y))
    }
}

impl NudgeSource for GriddedWindField {
    fn interpolate(&self, position: LonLat) -> Option<WindVector> {
        let (x, y) = self.grid_coords(position)?;
        let (n_lon, n_lat) = self.u.dim();

        let i0 = (x as usize).min(n_lon - 2);
        let j0 = (y as usize).min(n_lat - 2);
        let fx = x - i0 as f32;
        let fy = y - j0 as f32;

        let bilinear = |g: &Array2<f32>| -> f32 {
            g[[i0, j0]] * (1.0 - fx) * (1.0 - fy)
                + g[[i0 + 1, j0]] * fx * (1.0 - fy)
                + g[[i0, j0 + 1]] * (1.0 - fx) * fy
                + g[[i0 + 1, j0 + 1]] * fx * fy
        };

        let u = bilinear(&self.u);
        let v = bilinear(&self.v);
        Some(WindVector::from_uv(u, v))
    }
}

/// Trivial source with uniform wind everywhere; handy for tests and for
/// products run without a forecast file.
#[derive(Debug, Clone, Copy)]
pub struct UniformWind(pub WindVector);

impl NudgeSource for UniformWind {
    fn interpolate(&self, _position: LonLat) -> Option<WindVector> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant_field(u_val: f32, v_val: f32) -> GriddedWindField {
        let u = Array2::from_elem((4, 4), u_val);
        let v = Array2::from_elem((4, 4), v_val);
        GriddedWindField::new(0.0, -0.5, 0.1, 0.1, u, v).unwrap()
    }

    #[test]
    fn test_constant_field_interpolates_to_itself() {
        let field = constant_field(3.0, 4.0);
        let wv = field.interpolate(LonLat::new(0.15, -0.35)).unwrap();
        assert_relative_eq!(wv.speed, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut u = Array2::zeros((2, 2));
        u[[1, 0]] = 2.0;
        u[[0, 1]] = 2.0;
        u[[1, 1]] = 4.0;
        let v = Array2::zeros((2, 2));
        let field = GriddedWindField::new(0.0, 0.0, 1.0, 1.0, u, v).unwrap();

        let wv = field.interpolate(LonLat::new(0.5, 0.5)).unwrap();
        assert_relative_eq!(wv.speed, 2.0, epsilon = 1e-5);
        assert_relative_eq!(wv.direction, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_outside_grid_is_none() {
        let field = constant_field(1.0, 0.0);
        assert!(field.interpolate(LonLat::new(0.1, 5.0)).is_none());
        assert!(field.interpolate(LonLat::new(0.1, -5.0)).is_none());
    }

    #[test]
    fn test_invalid_grids_rejected() {
        let u = Array2::zeros((4, 4));
        let v = Array2::zeros((3, 4));
        assert!(GriddedWindField::new(0.0, 0.0, 0.1, 0.1, u, v).is_err());

        let u = Array2::zeros((1, 4));
        let v = Array2::zeros((1, 4));
        assert!(GriddedWindField::new(0.0, 0.0, 0.1, 0.1, u, v).is_err());

        let u = Array2::zeros((4, 4));
        let v = Array2::zeros((4, 4));
        assert!(GriddedWindField::new(0.0, 0.0, -0.1, 0.1, u, v).is_err());
    }
}
