//! Atmospheric extinction
//!
//! Transmission is `a · exp(−c · (X − X₀))` where `X` is the air mass at the
//! object's zenith angle and `X₀` the air mass at the zenith, so the zenith
//! always transmits `a`.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;

use crate::SkycamError;

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Scale height of the homogeneous atmosphere in km
pub const ATMOSPHERE_HEIGHT_KM: f64 = 9.5;

/// Air mass model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AirmassModel {
    /// Plane-parallel atmosphere, `X = sec z`
    Planar,
    /// Plane-parallel with the Young (1974) correction
    Young,
    /// Spherical shell seen by an elevated observer
    #[default]
    Spherical,
}

impl FromStr for AirmassModel {
    type Err = SkycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planar" => Ok(AirmassModel::Planar),
            "young" => Ok(AirmassModel::Young),
            "spherical" => Ok(AirmassModel::Spherical),
            _ => Err(SkycamError::UnknownAirmassModel(s.to_string())),
        }
    }
}

impl AirmassModel {
    /// Air mass at zenith angle `z` (radians) for an observer `observer_km`
    /// above sea level
    pub fn airmass(&self, z: f64, observer_km: f64) -> f64 {
        match self {
            AirmassModel::Planar => 1.0 / z.cos(),
            AirmassModel::Young => {
                let sec = 1.0 / z.cos();
                sec * (1.0 - 0.0012 * (sec * sec - 1.0))
            }
            AirmassModel::Spherical => {
                let r = EARTH_RADIUS_KM / ATMOSPHERE_HEIGHT_KM;
                let y = observer_km / ATMOSPHERE_HEIGHT_KM;
                let cos_z = z.cos();
                ((r + y).powi(2) * cos_z * cos_z + 2.0 * r * (1.0 - y) - y * y + 1.0).sqrt()
                    - (r + y) * cos_z
            }
        }
    }

    /// Air mass relative to the zenith value
    pub fn relative_airmass(&self, z: f64, observer_km: f64) -> f64 {
        self.airmass(z, observer_km) - self.airmass(0.0, observer_km)
    }
}

/// Extinction model for one site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub model: AirmassModel,
    /// Absorption coefficient `c`
    pub absorption: f64,
    pub observer_km: f64,
}

impl Atmosphere {
    /// Fraction `a · exp(−c (X − X₀))` transmitted at `altitude` (radians)
    pub fn transmission(&self, altitude: f64, a: f64) -> f64 {
        let z = FRAC_PI_2 - altitude;
        a * (-self.absorption * self.model.relative_airmass(z, self.observer_km)).exp()
    }

    /// Undo extinction on a measured response
    pub fn correct(&self, response: f64, altitude: f64) -> f64 {
        response / self.transmission(altitude, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(AirmassModel::Planar)]
    #[case(AirmassModel::Young)]
    #[case(AirmassModel::Spherical)]
    fn test_zenith_transmits_a(#[case] model: AirmassModel) {
        let atm = Atmosphere {
            model,
            absorption: 0.6,
            observer_km: 2.2,
        };
        assert_relative_eq!(atm.transmission(FRAC_PI_2, 0.8), 0.8, epsilon = 1e-12);
        assert_relative_eq!(atm.correct(0.5, FRAC_PI_2), 0.5, epsilon = 1e-12);
    }

    #[rstest]
    #[case(AirmassModel::Planar)]
    #[case(AirmassModel::Young)]
    #[case(AirmassModel::Spherical)]
    fn test_transmission_falls_towards_horizon(#[case] model: AirmassModel) {
        let atm = Atmosphere {
            model,
            absorption: 0.6,
            observer_km: 2.2,
        };
        let mut last = f64::INFINITY;
        for alt_deg in [90.0, 70.0, 50.0, 30.0, 15.0] {
            let t = atm.transmission(f64::to_radians(alt_deg), 1.0);
            assert!(t < last || alt_deg == 90.0);
            assert!(t > 0.0 && t <= 1.0);
            last = t;
        }
    }

    #[test]
    fn test_planar_airmass_at_60_degrees() {
        assert_relative_eq!(
            AirmassModel::Planar.airmass(60f64.to_radians(), 0.0),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_spherical_close_to_planar_at_sea_level() {
        let z = 30f64.to_radians();
        assert_relative_eq!(AirmassModel::Spherical.airmass(0.0, 0.0), 1.0, epsilon = 1e-9);
        let planar = AirmassModel::Planar.relative_airmass(z, 0.0);
        let spherical = AirmassModel::Spherical.relative_airmass(z, 0.0);
        assert_relative_eq!(planar, spherical, max_relative = 0.02);
    }

    #[test]
    fn test_spherical_stays_finite_at_horizon() {
        let x = AirmassModel::Spherical.airmass(FRAC_PI_2, 2.2);
        assert!(x.is_finite() && x > 10.0 && x < 40.0, "X = {x}");
    }

    #[test]
    fn test_parse_model() {
        assert_eq!("Young".parse::<AirmassModel>().unwrap(), AirmassModel::Young);
        assert!("kasten".parse::<AirmassModel>().is_err());
    }
}
