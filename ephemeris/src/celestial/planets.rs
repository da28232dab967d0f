//! Planet positions from mean Keplerian elements.
//!
//! Elements and rates are the JPL "Approximate Positions of the Planets"
//! table valid for 1800–2050 (Standish). Magnitudes use the Astronomical
//! Almanac expressions with the phase-angle terms; Saturn's rings are ignored.

use nalgebra::Vector3;
use std::f64::consts::TAU;

use super::SolarSystemBody;
use crate::time::julian_centuries;

/// Mean orbital elements at J2000 and their rates per Julian century.
///
/// Each field is `[value, rate]`: semi-major axis (AU), eccentricity,
/// inclination, mean longitude, longitude of perihelion and longitude of the
/// ascending node (degrees).
struct OrbitalElements {
    semi_major_axis: [f64; 2],
    eccentricity: [f64; 2],
    inclination: [f64; 2],
    mean_longitude: [f64; 2],
    perihelion_longitude: [f64; 2],
    node_longitude: [f64; 2],
}

const MERCURY: OrbitalElements = OrbitalElements {
    semi_major_axis: [0.387_099_27, 0.000_000_37],
    eccentricity: [0.205_635_93, 0.000_019_06],
    inclination: [7.004_979_02, -0.005_947_49],
    mean_longitude: [252.250_323_50, 149_472.674_111_75],
    perihelion_longitude: [77.457_796_28, 0.160_476_89],
    node_longitude: [48.330_765_93, -0.125_340_81],
};

const VENUS: OrbitalElements = OrbitalElements {
    semi_major_axis: [0.723_335_66, 0.000_003_90],
    eccentricity: [0.006_776_72, -0.000_041_07],
    inclination: [3.394_676_05, -0.000_788_90],
    mean_longitude: [181.979_099_50, 58_517.815_387_29],
    perihelion_longitude: [131.602_467_18, 0.002_683_29],
    node_longitude: [76.679_842_55, -0.277_694_18],
};

const EARTH_MOON_BARYCENTER: OrbitalElements = OrbitalElements {
    semi_major_axis: [1.000_002_61, 0.000_005_62],
    eccentricity: [0.016_711_23, -0.000_043_92],
    inclination: [-0.000_015_31, -0.012_946_68],
    mean_longitude: [100.464_571_66, 35_999.372_449_81],
    perihelion_longitude: [102.937_681_93, 0.323_273_64],
    node_longitude: [0.0, 0.0],
};

const MARS: OrbitalElements = OrbitalElements {
    semi_major_axis: [1.523_710_34, 0.000_018_47],
    eccentricity: [0.093_394_10, 0.000_078_82],
    inclination: [1.849_691_42, -0.008_131_31],
    mean_longitude: [-4.553_432_05, 19_140.302_684_99],
    perihelion_longitude: [-23.943_629_59, 0.444_410_88],
    node_longitude: [49.559_538_91, -0.292_573_43],
};

const JUPITER: OrbitalElements = OrbitalElements {
    semi_major_axis: [5.202_887_00, -0.000_116_07],
    eccentricity: [0.048_386_24, -0.000_132_53],
    inclination: [1.304_396_95, -0.001_837_14],
    mean_longitude: [34.396_440_51, 3_034.746_127_75],
    perihelion_longitude: [14.728_479_83, 0.212_526_68],
    node_longitude: [100.473_909_09, 0.204_691_06],
};

const SATURN: OrbitalElements = OrbitalElements {
    semi_major_axis: [9.536_675_94, -0.001_250_60],
    eccentricity: [0.053_861_79, -0.000_509_91],
    inclination: [2.485_991_87, 0.001_936_09],
    mean_longitude: [49.954_244_23, 1_222.493_622_01],
    perihelion_longitude: [92.598_878_31, -0.418_972_16],
    node_longitude: [113.662_424_48, -0.288_677_94],
};

const URANUS: OrbitalElements = OrbitalElements {
    semi_major_axis: [19.189_164_64, -0.001_961_76],
    eccentricity: [0.047_257_44, -0.000_043_97],
    inclination: [0.772_637_83, -0.002_429_39],
    mean_longitude: [313.238_104_51, 428.482_027_85],
    perihelion_longitude: [170.954_276_30, 0.408_052_81],
    node_longitude: [74.016_925_03, 0.042_405_89],
};

const NEPTUNE: OrbitalElements = OrbitalElements {
    semi_major_axis: [30.069_922_76, 0.000_262_91],
    eccentricity: [0.008_590_48, 0.000_051_05],
    inclination: [1.770_043_47, 0.000_353_72],
    mean_longitude: [-55.120_029_69, 218.459_453_25],
    perihelion_longitude: [44.964_762_27, -0.322_414_64],
    node_longitude: [131.784_225_74, -0.005_086_64],
};

impl OrbitalElements {
    /// Heliocentric ecliptic (J2000) position in AU after `t` Julian centuries
    fn heliocentric(&self, t: f64) -> Vector3<f64> {
        let at = |element: [f64; 2]| element[0] + element[1] * t;

        let a = at(self.semi_major_axis);
        let e = at(self.eccentricity);
        let inclination = at(self.inclination).to_radians();
        let mean_longitude = at(self.mean_longitude);
        let perihelion = at(self.perihelion_longitude);
        let node = at(self.node_longitude).to_radians();

        let argument_of_perihelion = perihelion.to_radians() - node;
        let mean_anomaly = (mean_longitude - perihelion).to_radians().rem_euclid(TAU);
        let eccentric_anomaly = solve_kepler(mean_anomaly, e);

        let x_orbit = a * (eccentric_anomaly.cos() - e);
        let y_orbit = a * (1.0 - e * e).sqrt() * eccentric_anomaly.sin();

        let (sin_w, cos_w) = argument_of_perihelion.sin_cos();
        let (sin_n, cos_n) = node.sin_cos();
        let (sin_i, cos_i) = inclination.sin_cos();

        Vector3::new(
            (cos_w * cos_n - sin_w * sin_n * cos_i) * x_orbit
                + (-sin_w * cos_n - cos_w * sin_n * cos_i) * y_orbit,
            (cos_w * sin_n + sin_w * cos_n * cos_i) * x_orbit
                + (-sin_w * sin_n + cos_w * cos_n * cos_i) * y_orbit,
            (sin_w * sin_i) * x_orbit + (cos_w * sin_i) * y_orbit,
        )
    }
}

/// Solve Kepler's equation `M = E - e sin E` by Newton iteration
fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut e_anomaly = mean_anomaly + eccentricity * mean_anomaly.sin();
    for _ in 0..30 {
        let delta = (e_anomaly - eccentricity * e_anomaly.sin() - mean_anomaly)
            / (1.0 - eccentricity * e_anomaly.cos());
        e_anomaly -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    e_anomaly
}

fn elements(planet: SolarSystemBody) -> &'static OrbitalElements {
    match planet {
        SolarSystemBody::Mercury => &MERCURY,
        SolarSystemBody::Venus => &VENUS,
        SolarSystemBody::Mars => &MARS,
        SolarSystemBody::Jupiter => &JUPITER,
        SolarSystemBody::Saturn => &SATURN,
        SolarSystemBody::Uranus => &URANUS,
        SolarSystemBody::Neptune => &NEPTUNE,
        SolarSystemBody::Sun | SolarSystemBody::Moon => {
            unreachable!("{planet} has no Keplerian elements")
        }
    }
}

/// Apparent visual magnitude from heliocentric distance `r`, geocentric
/// distance `delta` (AU) and phase angle `i` (degrees)
fn magnitude(planet: SolarSystemBody, r: f64, delta: f64, i: f64) -> f64 {
    let distance_term = 5.0 * (r * delta).log10();
    let phase_term = match planet {
        SolarSystemBody::Mercury => -0.42 + 0.0380 * i - 0.000_273 * i * i + 0.000_002 * i * i * i,
        SolarSystemBody::Venus => -4.40 + 0.0009 * i + 0.000_239 * i * i - 0.000_000_65 * i * i * i,
        SolarSystemBody::Mars => -1.52 + 0.016 * i,
        SolarSystemBody::Jupiter => -9.40 + 0.005 * i,
        SolarSystemBody::Saturn => -8.88,
        SolarSystemBody::Uranus => -7.19,
        SolarSystemBody::Neptune => -6.87,
        SolarSystemBody::Sun | SolarSystemBody::Moon => 0.0,
    };
    distance_term + phase_term
}

/// Geocentric ecliptic position (AU) and apparent magnitude of a planet
pub(super) fn geocentric_ecliptic(planet: SolarSystemBody, jd: f64) -> (Vector3<f64>, f64) {
    let t = julian_centuries(jd);
    let earth = EARTH_MOON_BARYCENTER.heliocentric(t);
    let helio = elements(planet).heliocentric(t);
    let geo = helio - earth;

    let r = helio.norm();
    let delta = geo.norm();
    let earth_sun = earth.norm();
    let cos_phase = ((r * r + delta * delta - earth_sun * earth_sun) / (2.0 * r * delta)).clamp(-1.0, 1.0);
    let phase_angle = cos_phase.acos().to_degrees();

    (geo, magnitude(planet, r, delta, phase_angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kepler_solution_satisfies_equation() {
        for &(m, e) in &[(0.3, 0.2056), (3.0, 0.0934), (5.9, 0.0167)] {
            let big_e = solve_kepler(m, e);
            assert_abs_diff_eq!(big_e - e * big_e.sin(), m, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_earth_distance_near_one_au() {
        for t in [-0.5, 0.0, 0.16, 0.25] {
            let r = EARTH_MOON_BARYCENTER.heliocentric(t).norm();
            assert!((0.98..1.02).contains(&r), "r = {r}");
        }
    }
}
