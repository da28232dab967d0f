//! Celestial body definitions and calculations

mod moon;
mod planets;
mod sun;

use nalgebra::Vector3;

use crate::coordinates::{
    ecliptic_to_equatorial, equatorial_to_galactic, equatorial_to_horizontal, mean_obliquity,
    vector_to_spherical,
};
use crate::observer::Observer;

/// Equatorial Earth radius in astronomical units
const EARTH_RADIUS_AU: f64 = 6378.137 / 149_597_870.7;

/// Solar system bodies the ephemeris can place on the sky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarSystemBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl SolarSystemBody {
    /// The seven planets other than Earth, innermost first
    pub const PLANETS: [SolarSystemBody; 7] = [
        SolarSystemBody::Mercury,
        SolarSystemBody::Venus,
        SolarSystemBody::Mars,
        SolarSystemBody::Jupiter,
        SolarSystemBody::Saturn,
        SolarSystemBody::Uranus,
        SolarSystemBody::Neptune,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SolarSystemBody::Sun => "Sun",
            SolarSystemBody::Moon => "Moon",
            SolarSystemBody::Mercury => "Mercury",
            SolarSystemBody::Venus => "Venus",
            SolarSystemBody::Mars => "Mars",
            SolarSystemBody::Jupiter => "Jupiter",
            SolarSystemBody::Saturn => "Saturn",
            SolarSystemBody::Uranus => "Uranus",
            SolarSystemBody::Neptune => "Neptune",
        }
    }
}

impl std::fmt::Display for SolarSystemBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Geocentric position of a body at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPosition {
    /// Right ascension in radians, [0, 2π)
    pub ra: f64,
    /// Declination in radians
    pub dec: f64,
    /// Distance from the geocenter in AU
    pub distance_au: f64,
    /// Apparent visual magnitude, where the model provides one
    pub magnitude: Option<f64>,
}

impl BodyPosition {
    fn from_equatorial_vector(v: &Vector3<f64>, magnitude: Option<f64>) -> Self {
        let (ra, dec) = vector_to_spherical(v);
        Self {
            ra,
            dec,
            distance_au: v.norm(),
            magnitude,
        }
    }

    /// Topocentric (azimuth, altitude) for an observer.
    ///
    /// The altitude is lowered by the diurnal parallax, which only matters for
    /// the moon (up to ~1°).
    pub fn horizontal(&self, observer: &Observer) -> (f64, f64) {
        let (az, alt) = equatorial_to_horizontal(self.ra, self.dec, observer);
        let horizontal_parallax = (EARTH_RADIUS_AU / self.distance_au).clamp(-1.0, 1.0).asin();
        let parallax = (horizontal_parallax.sin() * alt.cos()).asin();
        (az, alt - parallax)
    }

    /// Galactic (longitude, latitude) of the position
    pub fn galactic(&self) -> (f64, f64) {
        equatorial_to_galactic(self.ra, self.dec)
    }
}

/// Low-precision analytic ephemeris for the sun, moon and planets.
///
/// Accuracy is a fraction of a degree, which is well inside the pixel scale
/// of an all-sky camera.
#[derive(Debug)]
pub struct Ephemeris {}

impl Ephemeris {
    /// Create a new ephemeris calculator
    pub fn new() -> Self {
        Self {}
    }

    /// Geocentric equatorial position of `body` at Julian date `jd`
    pub fn position(&self, body: SolarSystemBody, jd: f64) -> BodyPosition {
        let obliquity = mean_obliquity(jd);
        match body {
            SolarSystemBody::Sun => {
                let ecliptic = sun::geocentric_ecliptic(jd);
                let v = ecliptic_to_equatorial(&ecliptic, obliquity);
                BodyPosition::from_equatorial_vector(&v, Some(sun::APPARENT_MAGNITUDE))
            }
            SolarSystemBody::Moon => {
                let ecliptic = moon::geocentric_ecliptic(jd);
                let v = ecliptic_to_equatorial(&ecliptic, obliquity);
                BodyPosition::from_equatorial_vector(&v, None)
            }
            planet => {
                let (ecliptic, magnitude) = planets::geocentric_ecliptic(planet, jd);
                let v = ecliptic_to_equatorial(&ecliptic, obliquity);
                BodyPosition::from_equatorial_vector(&v, Some(magnitude))
            }
        }
    }

    /// Illuminated fraction of the moon's disk in [0, 1]
    pub fn moon_phase(&self, jd: f64) -> f64 {
        let to_sun = sun::geocentric_ecliptic(jd);
        let to_moon = moon::geocentric_ecliptic(jd);
        // Phase angle at the moon between the directions to the sun and to the earth
        let moon_to_sun = to_sun - to_moon;
        let moon_to_earth = -to_moon;
        let phase_angle = moon_to_sun.angle(&moon_to_earth);
        (1.0 + phase_angle.cos()) / 2.0
    }
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::GeoLocation;
    use crate::time::julian_date;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_sun_at_j2000() {
        let eph = Ephemeris::new();
        let jd = julian_date(&Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());
        let sun = eph.position(SolarSystemBody::Sun, jd);
        assert_abs_diff_eq!(sun.ra.to_degrees(), 281.29, epsilon = 0.1);
        assert_abs_diff_eq!(sun.dec.to_degrees(), -23.03, epsilon = 0.1);
        assert_abs_diff_eq!(sun.distance_au, 0.9833, epsilon = 0.001);
    }

    #[test]
    fn test_moon_meeus_example() {
        // Meeus example 47.a, 1992 April 12 0h
        let eph = Ephemeris::new();
        let jd = julian_date(&Utc.with_ymd_and_hms(1992, 4, 12, 0, 0, 0).unwrap());
        let moon = eph.position(SolarSystemBody::Moon, jd);
        assert_abs_diff_eq!(moon.ra.to_degrees(), 134.688_470, epsilon = 1.0);
        assert_abs_diff_eq!(moon.dec.to_degrees(), 13.768_368, epsilon = 1.0);
        let distance_km = moon.distance_au * 149_597_870.7;
        assert_abs_diff_eq!(distance_km, 368_409.7, epsilon = 3_700.0);
    }

    #[test]
    fn test_venus_meeus_example() {
        // Meeus example 33.a, 1992 December 20 0h
        let eph = Ephemeris::new();
        let jd = julian_date(&Utc.with_ymd_and_hms(1992, 12, 20, 0, 0, 0).unwrap());
        let venus = eph.position(SolarSystemBody::Venus, jd);
        assert_abs_diff_eq!(venus.ra.to_degrees(), 316.172_8, epsilon = 0.5);
        assert_abs_diff_eq!(venus.dec.to_degrees(), -18.888_0, epsilon = 0.5);
        let mag = venus.magnitude.unwrap();
        assert!((-5.0..-3.0).contains(&mag), "Venus magnitude {mag}");
    }

    #[test]
    fn test_moon_phase_full_and_new() {
        let eph = Ephemeris::new();
        let full = julian_date(&Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap());
        let new = julian_date(&Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap());
        assert!(eph.moon_phase(full) > 0.98);
        assert!(eph.moon_phase(new) < 0.02);
    }

    #[test]
    fn test_parallax_lowers_moon() {
        let eph = Ephemeris::new();
        let loc = GeoLocation::from_degrees(28.76, -17.89, 2200.0).unwrap();
        let t = Utc.with_ymd_and_hms(2016, 3, 20, 23, 0, 0).unwrap();
        let obs = Observer::new(loc, t);
        let moon = eph.position(SolarSystemBody::Moon, obs.julian_date());
        let (_, geocentric_alt) = equatorial_to_horizontal(moon.ra, moon.dec, &obs);
        let (_, topocentric_alt) = moon.horizontal(&obs);
        let shift = (geocentric_alt - topocentric_alt).to_degrees();
        assert!((0.0..1.1).contains(&shift), "parallax shift {shift}");
    }

    #[test]
    fn test_planet_names() {
        let names: Vec<_> = SolarSystemBody::PLANETS.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune"]
        );
    }
}
