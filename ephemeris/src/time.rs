//! Time scales used by the ephemeris.
//!
//! UTC is used in place of TT throughout; the ~70 s difference is far below
//! the precision of the analytic theories in this crate.

use chrono::{DateTime, Utc};
use std::f64::consts::TAU;

/// Julian date of the J2000.0 epoch
pub const J2000_JD: f64 = 2_451_545.0;

/// Offset between Julian date and modified Julian date
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian date for a UTC instant
pub fn julian_date(time: &DateTime<Utc>) -> f64 {
    let seconds = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY
}

/// Modified Julian date for a UTC instant
pub fn modified_julian_date(time: &DateTime<Utc>) -> f64 {
    julian_date(time) - MJD_OFFSET
}

/// Julian centuries elapsed since J2000.0
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Greenwich mean sidereal time in radians, in [0, 2π)
///
/// IAU 1982 expression (Meeus, Astronomical Algorithms, eq. 12.4).
pub fn greenwich_mean_sidereal_time(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    let gmst_deg = 280.460_618_37 + 360.985_647_366_29 * (jd - J2000_JD) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    gmst_deg.to_radians().rem_euclid(TAU)
}

/// Local mean sidereal time in radians for an east-positive longitude
pub fn local_sidereal_time(jd: f64, longitude: f64) -> f64 {
    (greenwich_mean_sidereal_time(jd) + longitude).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_julian_date_at_j2000() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_relative_eq!(julian_date(&t), J2000_JD, epsilon = 1e-9);
        assert_relative_eq!(modified_julian_date(&t), 51_544.5, epsilon = 1e-9);
    }

    #[test]
    fn test_gmst_meeus_example() {
        // Meeus example 12.b: 1987 April 10, 19h21m00s UT -> 8h34m57.0896s
        let t = Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0).unwrap();
        let gmst = greenwich_mean_sidereal_time(julian_date(&t));
        let expected = (8.0 + 34.0 / 60.0 + 57.0896 / 3600.0) * 15.0;
        assert_relative_eq!(gmst.to_degrees(), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_local_sidereal_time_wraps() {
        let jd = J2000_JD;
        let lst = local_sidereal_time(jd, -std::f64::consts::PI);
        assert!((0.0..TAU).contains(&lst));
        let diff = (greenwich_mean_sidereal_time(jd) - lst).rem_euclid(TAU);
        assert_relative_eq!(diff, std::f64::consts::PI, epsilon = 1e-12);
    }
}
