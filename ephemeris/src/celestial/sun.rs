//! Low-precision solar coordinates (Astronomical Almanac, ~0.01° accuracy
//! between 1950 and 2050).

use nalgebra::Vector3;

use crate::coordinates::spherical_to_vector;
use crate::time::J2000_JD;

pub(super) const APPARENT_MAGNITUDE: f64 = -26.74;

/// Geocentric ecliptic position of the sun in AU
pub(super) fn geocentric_ecliptic(jd: f64) -> Vector3<f64> {
    let n = jd - J2000_JD;
    let mean_longitude = 280.460 + 0.985_647_4 * n;
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let distance = 1.000_14 - 0.016_71 * mean_anomaly.cos() - 0.000_14 * (2.0 * mean_anomaly).cos();
    spherical_to_vector(longitude, 0.0) * distance
}
