//! Low-precision lunar coordinates (Astronomical Almanac series: ~0.3° in
//! longitude, ~0.2° in latitude).

use nalgebra::Vector3;

use super::EARTH_RADIUS_AU;
use crate::coordinates::spherical_to_vector;
use crate::time::julian_centuries;

fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

/// Geocentric ecliptic position of the moon in AU
pub(super) fn geocentric_ecliptic(jd: f64) -> Vector3<f64> {
    let t = julian_centuries(jd);

    let longitude = 218.32 + 481_267.881 * t
        + 6.29 * sin_deg(135.0 + 477_198.87 * t)
        - 1.27 * sin_deg(259.3 - 413_335.36 * t)
        + 0.66 * sin_deg(235.7 + 890_534.22 * t)
        + 0.21 * sin_deg(269.9 + 954_397.74 * t)
        - 0.19 * sin_deg(357.5 + 35_999.05 * t)
        - 0.11 * sin_deg(186.5 + 966_404.03 * t);

    let latitude = 5.13 * sin_deg(93.3 + 483_202.02 * t)
        + 0.28 * sin_deg(228.2 + 960_400.89 * t)
        - 0.28 * sin_deg(318.3 + 6_003.15 * t)
        - 0.17 * sin_deg(217.6 - 407_332.21 * t);

    let horizontal_parallax = 0.9508
        + 0.0518 * cos_deg(135.0 + 477_198.87 * t)
        + 0.0095 * cos_deg(259.3 - 413_335.36 * t)
        + 0.0078 * cos_deg(235.7 + 890_534.22 * t)
        + 0.0028 * cos_deg(269.9 + 954_397.74 * t);

    let distance = EARTH_RADIUS_AU / sin_deg(horizontal_parallax);
    spherical_to_vector(longitude.to_radians(), latitude.to_radians()) * distance
}
