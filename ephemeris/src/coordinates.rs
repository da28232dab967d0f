//! Coordinate transforms between equatorial, horizontal, ecliptic and
//! galactic frames.
//!
//! Azimuth follows the camera convention: 0 at north, increasing towards
//! east, in [0, 2π).

use nalgebra::{Matrix3, Rotation3, Vector3};
use std::f64::consts::{PI, TAU};

use crate::observer::Observer;
use crate::time::julian_centuries;

/// Rotation from J2000 equatorial to galactic coordinates
#[rustfmt::skip]
const EQUATORIAL_TO_GALACTIC: [f64; 9] = [
    -0.054_875_560_4, -0.873_437_090_2, -0.483_835_015_5,
     0.494_109_427_9, -0.444_829_630_0,  0.746_982_244_5,
    -0.867_666_149_0, -0.198_076_373_4,  0.455_983_776_2,
];

/// Convert right ascension/declination to (azimuth, altitude) for an observer.
///
/// Uses the observer's local sidereal time and latitude. The raw azimuth
/// from the hour-angle formula is measured from south; it is rotated by π so
/// that north is zero.
pub fn equatorial_to_horizontal(ra: f64, dec: f64, observer: &Observer) -> (f64, f64) {
    let hour_angle = observer.sidereal_time() - ra;
    hour_angle_to_horizontal(hour_angle, dec, observer.latitude())
}

/// Convert hour angle/declination to (azimuth, altitude) for a latitude
pub fn hour_angle_to_horizontal(hour_angle: f64, dec: f64, latitude: f64) -> (f64, f64) {
    let sin_alt =
        latitude.sin() * dec.sin() + latitude.cos() * dec.cos() * hour_angle.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin();
    let az = hour_angle
        .sin()
        .atan2(hour_angle.cos() * latitude.sin() - dec.tan() * latitude.cos());
    ((az + PI).rem_euclid(TAU), alt)
}

/// Great-circle distance between two points given as (longitude, latitude)
/// pairs, e.g. (ra, dec) or (azimuth, altitude). Haversine formula.
pub fn angular_separation(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Mean obliquity of the ecliptic in radians (Meeus eq. 22.2, first terms)
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    (23.439_291_11 - 0.013_004_167 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t).to_radians()
}

/// Rotate an ecliptic cartesian vector into the equatorial frame
pub fn ecliptic_to_equatorial(v: &Vector3<f64>, obliquity: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity) * v
}

/// Unit vector for spherical (longitude, latitude)
pub fn spherical_to_vector(lon: f64, lat: f64) -> Vector3<f64> {
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Spherical (longitude, latitude) for any non-zero vector; longitude in [0, 2π)
pub fn vector_to_spherical(v: &Vector3<f64>) -> (f64, f64) {
    let norm = v.norm();
    let lat = (v.z / norm).clamp(-1.0, 1.0).asin();
    let lon = v.y.atan2(v.x).rem_euclid(TAU);
    (lon, lat)
}

/// Convert J2000 (ra, dec) to galactic (longitude, latitude)
pub fn equatorial_to_galactic(ra: f64, dec: f64) -> (f64, f64) {
    let rotation = Matrix3::from_row_slice(&EQUATORIAL_TO_GALACTIC);
    vector_to_spherical(&(rotation * spherical_to_vector(ra, dec)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::GeoLocation;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_object_on_meridian_at_declination_equal_latitude_is_at_zenith() {
        let loc = GeoLocation::from_degrees(28.76, -17.89, 2200.0).unwrap();
        let obs = Observer::new(loc, Utc.with_ymd_and_hms(2016, 3, 1, 22, 0, 0).unwrap());
        let (_, alt) = equatorial_to_horizontal(obs.sidereal_time(), loc.latitude, &obs);
        assert_relative_eq!(alt, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_azimuth_convention() {
        let lat = 45f64.to_radians();
        // Upper culmination of an object south of zenith: azimuth 180° (south)
        let (az, _) = hour_angle_to_horizontal(0.0, 0.0, lat);
        assert_relative_eq!(az, PI, epsilon = 1e-9);
        // Object rising in the east at six hours before transit
        let (az, alt) = hour_angle_to_horizontal(-FRAC_PI_2, 0.0, lat);
        assert_relative_eq!(az, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(alt, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angular_separation() {
        let d = angular_separation(0.0, 0.0, 0.5f64.to_radians(), 0.0);
        assert_relative_eq!(d.to_degrees(), 0.5, epsilon = 1e-9);
        let pole = angular_separation(1.0, FRAC_PI_2, 2.5, FRAC_PI_2);
        assert_relative_eq!(pole, 0.0, epsilon = 1e-9);
        let opposite = angular_separation(0.0, 0.0, PI, 0.0);
        assert_relative_eq!(opposite, PI, epsilon = 1e-9);
    }

    #[test]
    fn test_ecliptic_round_trip_on_equinox() {
        let eps = mean_obliquity(crate::time::J2000_JD);
        assert_relative_eq!(eps.to_degrees(), 23.439_291_11, epsilon = 1e-9);
        // Summer solstice point: ecliptic longitude 90° -> dec = +eps
        let v = ecliptic_to_equatorial(&spherical_to_vector(FRAC_PI_2, 0.0), eps);
        let (ra, dec) = vector_to_spherical(&v);
        assert_relative_eq!(ra, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(dec, eps, epsilon = 1e-9);
    }

    #[test]
    fn test_galactic_center_and_pole() {
        let (l, b) = equatorial_to_galactic(266.405f64.to_radians(), (-28.936f64).to_radians());
        let l_deg = l.to_degrees();
        assert!(l_deg < 0.1 || l_deg > 359.9, "l = {l_deg}");
        assert!(b.to_degrees().abs() < 0.1);

        let (_, b) = equatorial_to_galactic(192.859_48f64.to_radians(), 27.128_25f64.to_radians());
        assert_relative_eq!(b.to_degrees(), 90.0, epsilon = 1e-3);
    }
}
