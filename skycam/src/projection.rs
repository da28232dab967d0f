//! Fisheye camera model: horizontal coordinates to pixels and back
//!
//! The camera looks straight up. A point at zenith angle θ lands at distance
//! `r(θ)` from the zenith pixel; its azimuth (plus a fixed mounting offset)
//! sets the direction, with image `y` growing downwards.

use serde::{Deserialize, Serialize};
use shared::ImageSize;
use std::f64::consts::{FRAC_PI_2, SQRT_2, TAU};
use std::fmt;
use std::str::FromStr;

use crate::SkycamError;

/// Radial mapping of the lens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// `r = radius · θ / (π/2)`
    #[default]
    Linear,
    /// `r = √2 · radius · sin(θ/2)`
    Equisolid,
}

impl FromStr for Projection {
    type Err = SkycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(Projection::Linear),
            "equisolid" => Ok(Projection::Equisolid),
            _ => Err(SkycamError::UnknownProjection(s.to_string())),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Linear => write!(f, "linear"),
            Projection::Equisolid => write!(f, "equisolid"),
        }
    }
}

impl Projection {
    /// Pixel distance from the zenith for zenith angle `theta`
    pub fn theta_to_r(&self, theta: f64, radius: f64) -> f64 {
        match self {
            Projection::Linear => radius / FRAC_PI_2 * theta,
            Projection::Equisolid => SQRT_2 * radius * (theta / 2.0).sin(),
        }
    }

    /// Zenith angle for pixel distance `r`, and whether `r` is inside the
    /// projection's domain.
    ///
    /// Linear is valid everywhere. Equisolid is only invertible for
    /// `r < √2 · radius`; outside it the angle is NaN.
    pub fn r_to_theta(&self, r: f64, radius: f64) -> (f64, bool) {
        match self {
            Projection::Linear => (r / radius * FRAC_PI_2, true),
            Projection::Equisolid => {
                let s = r / SQRT_2 / radius;
                (s.asin() * 2.0, s < 1.0)
            }
        }
    }
}

/// Camera geometry, fixed for a deployment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraModel {
    pub zenith_x: f64,
    pub zenith_y: f64,
    /// Pixel distance from zenith to the horizon for the linear projection
    pub radius: f64,
    pub projection: Projection,
    /// Mounting rotation in radians added to every azimuth
    pub azimuth_offset: f64,
    pub size: ImageSize,
}

impl CameraModel {
    pub fn theta_to_r(&self, theta: f64) -> f64 {
        self.projection.theta_to_r(theta, self.radius)
    }

    /// Pixel position of a horizontal coordinate (radians)
    pub fn horizontal_to_image(&self, azimuth: f64, altitude: f64) -> (f64, f64) {
        let r = self.theta_to_r(FRAC_PI_2 - altitude);
        let angle = azimuth + self.azimuth_offset;
        (
            self.zenith_x + r * angle.cos(),
            self.zenith_y - r * angle.sin(),
        )
    }

    /// Horizontal coordinate `(azimuth, altitude)` of a pixel, `None` if the
    /// pixel lies outside the projection's domain
    pub fn image_to_horizontal(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.zenith_x;
        let dy = self.zenith_y - y;
        let (theta, valid) = self.projection.r_to_theta(dx.hypot(dy), self.radius);
        if !valid {
            return None;
        }
        let azimuth = (dy.atan2(dx) - self.azimuth_offset).rem_euclid(TAU);
        Some((azimuth, FRAC_PI_2 - theta))
    }
}
