//! Cloud coverage: regional star percentages and the cloud map

use ephemeris::angular_separation;
use ndarray::{Array2, ArrayView2};
use shared::image_proc::filters::{gaussian_filter, EdgeMode};
use shared::image_proc::stats::{histogram2d, nan_mean};
use shared::ImageSize;
use std::f64::consts::FRAC_PI_2;

use crate::detection::StarMeasurement;
use crate::SkycamError;

pub use shared::image_proc::blob_size;

/// Returned by [`star_percentage`] when no star lies in range
pub const NO_STARS_IN_RANGE: f64 = -1.0;

/// Position a neighbourhood is measured around.
///
/// Angular anchors take their radius in degrees, pixel anchors in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkyAnchor {
    Equatorial { ra: f64, dec: f64 },
    Horizontal { azimuth: f64, altitude: f64 },
    Pixel { x: f64, y: f64 },
}

impl SkyAnchor {
    pub fn zenith() -> Self {
        SkyAnchor::Horizontal {
            azimuth: 0.0,
            altitude: FRAC_PI_2,
        }
    }
}

impl Default for SkyAnchor {
    fn default() -> Self {
        Self::zenith()
    }
}

/// Whether `star` lies within `radius` of `anchor` (boundary included)
pub fn is_in_range(anchor: &SkyAnchor, star: &StarMeasurement, radius: f64) -> Result<bool, SkycamError> {
    if radius < 0.0 {
        return Err(SkycamError::NegativeRadius(radius));
    }
    let s = &star.object;
    let in_range = match *anchor {
        SkyAnchor::Equatorial { ra, dec } => {
            angular_separation(ra, dec, s.ra, s.dec) <= radius.to_radians()
        }
        SkyAnchor::Horizontal { azimuth, altitude } => {
            angular_separation(azimuth, altitude, s.azimuth, s.altitude) <= radius.to_radians()
        }
        SkyAnchor::Pixel { x, y } => (x - s.x).powi(2) + (y - s.y).powi(2) <= radius * radius,
    };
    Ok(in_range)
}

fn flux_weight(vmag: f64) -> f64 {
    100f64.powf(-vmag / 5.0)
}

/// Visible fraction of the stars around `anchor`.
///
/// A negative `radius` takes every star. With `threshold >= 0` a star counts
/// as visible when its visibility reaches the threshold; with a negative
/// threshold the mean visibility is returned instead. `weighted` weighs each
/// star by its flux, `100^(-m/5)`.
///
/// Returns [`NO_STARS_IN_RANGE`] if no star is selected.
pub fn star_percentage(
    anchor: &SkyAnchor,
    stars: &[StarMeasurement],
    radius: f64,
    threshold: f64,
    weighted: bool,
) -> Result<f64, SkycamError> {
    let selected: Vec<&StarMeasurement> = if radius < 0.0 {
        stars.iter().collect()
    } else {
        let mut selected = Vec::new();
        for star in stars {
            if is_in_range(anchor, star, radius)? {
                selected.push(star);
            }
        }
        selected
    };

    if selected.is_empty() {
        return Ok(NO_STARS_IN_RANGE);
    }

    let weight = |s: &StarMeasurement| {
        if weighted {
            flux_weight(s.object.vmag)
        } else {
            1.0
        }
    };
    let score = |s: &StarMeasurement| {
        if threshold >= 0.0 {
            if s.visible >= threshold {
                1.0
            } else {
                0.0
            }
        } else {
            s.visible
        }
    };

    let total: f64 = selected.iter().map(|s| weight(s)).sum();
    let passed: f64 = selected.iter().map(|s| weight(s) * score(s)).sum();
    Ok(passed / total)
}

/// Cloud fraction in `[0, 1]` for every pixel (1 = overcast).
///
/// Visible and expected star density are estimated with two histograms
/// smoothed by the same Gaussian; the map is one minus their ratio. Pixels
/// with no expected density get a ratio of 0.
pub fn cloud_map(stars: &[StarMeasurement], sigma: f64, size: ImageSize, weighted: bool) -> Array2<f64> {
    let weight = |s: &StarMeasurement| {
        if weighted {
            2.5f64.powf(-s.object.vmag)
        } else {
            1.0
        }
    };

    let visible = histogram2d(
        stars.iter().map(|s| (s.object.x, s.object.y, s.visible * weight(s))),
        size,
    );
    let all = histogram2d(stars.iter().map(|s| (s.object.x, s.object.y, weight(s))), size);

    let density_visible = gaussian_filter(&visible.view(), sigma, EdgeMode::Mirror);
    let density_all = gaussian_filter(&all.view(), sigma, EdgeMode::Mirror);

    let mut map = density_visible / density_all;
    map.mapv_inplace(|ratio| if ratio.is_finite() { 1.0 - ratio } else { 1.0 });
    map
}

/// Mean cloud fraction over the map, ignoring NaN pixels
pub fn global_coverage(map: &ArrayView2<f64>) -> Option<f64> {
    nan_mean(map)
}
