//! Per-frame placement of catalog objects on the sky and in the image
//!
//! For each frame the sun, moon and planets are recomputed, every star,
//! planet and point of interest is converted to azimuth/altitude and pixels,
//! and the working set is filtered in this order: altitude and magnitude,
//! distance to the moon, then image bounds and crop mask.

use ephemeris::{
    angular_separation, equatorial_to_horizontal, Ephemeris, Observer, SolarSystemBody,
};
use ndarray::ArrayView2;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

use crate::catalog::{CatalogStar, PointOfInterest, WHOLE_SKY_ID};
use crate::cloud::SkyAnchor;
use crate::config::Config;
use crate::projection::CameraModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Star,
    Planet,
}

/// A star or planet in the per-frame working set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyObject {
    pub kind: ObjectKind,
    pub id: i64,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub x: f64,
    pub y: f64,
    pub vmag: f64,
    /// Angular distance to the moon in radians
    pub angle_to_moon: f64,
}

/// A point of interest placed for this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPoi {
    pub id: i64,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub x: f64,
    pub y: f64,
    pub radius_deg: f64,
    /// Coordinate frame its neighbourhood is measured in
    #[serde(skip)]
    pub anchor: SkyAnchor,
}

/// Sun or moon position for this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyState {
    pub azimuth: f64,
    pub altitude: f64,
    pub x: f64,
    pub y: f64,
}

/// Planet table entry, reported whether or not the planet is in view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetState {
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub galactic_lon: f64,
    pub galactic_lat: f64,
    pub vmag: f64,
    pub azimuth: f64,
    pub altitude: f64,
}

/// Everything known about the sky at one instant
#[derive(Debug, Clone)]
pub struct SkyState {
    pub stars: Vec<SkyObject>,
    /// Planets that passed the same filters as the stars
    pub planets: Vec<SkyObject>,
    pub points_of_interest: Vec<PlacedPoi>,
    pub planet_table: Vec<PlanetState>,
    pub sun: BodyState,
    pub moon: BodyState,
    /// Illuminated fraction of the moon
    pub moon_phase: f64,
}

/// Filters applied to the working set
#[derive(Debug, Clone, Copy)]
pub struct SkyFilter {
    pub min_altitude: f64,
    pub vmag_limit: f64,
    pub min_angle_to_moon: f64,
    /// Radius of the whole-sky point of interest
    pub opening_angle_deg: f64,
}

impl SkyFilter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_altitude: config.min_altitude(),
            vmag_limit: config.analysis.vmag_limit,
            min_angle_to_moon: config.analysis.min_angle_to_moon_deg.to_radians(),
            opening_angle_deg: config.image.opening_angle_deg,
        }
    }
}

fn in_view(camera: &CameraModel, crop: &ArrayView2<bool>, x: f64, y: f64) -> bool {
    camera.size.contains_strict(x, y) && !crop[[y as usize, x as usize]]
}

/// Compute the per-frame sky state.
///
/// `crop` is the static crop mask; the moon disk is added by the caller once
/// the moon's pixel position is known.
pub fn compute_sky_state(
    stars: &[CatalogStar],
    points_of_interest: &[PointOfInterest],
    observer: &Observer,
    camera: &CameraModel,
    filter: &SkyFilter,
    crop: &ArrayView2<bool>,
    ephemeris: &Ephemeris,
) -> SkyState {
    let jd = observer.julian_date();

    let body_state = |body: SolarSystemBody| {
        let (azimuth, altitude) = ephemeris.position(body, jd).horizontal(observer);
        let (x, y) = camera.horizontal_to_image(azimuth, altitude);
        BodyState {
            azimuth,
            altitude,
            x,
            y,
        }
    };
    let sun = body_state(SolarSystemBody::Sun);
    let moon = body_state(SolarSystemBody::Moon);
    let moon_phase = ephemeris.moon_phase(jd);

    let planet_table: Vec<PlanetState> = SolarSystemBody::PLANETS
        .iter()
        .map(|&planet| {
            let position = ephemeris.position(planet, jd);
            let (azimuth, altitude) = position.horizontal(observer);
            let (galactic_lon, galactic_lat) = position.galactic();
            PlanetState {
                name: planet.name().to_string(),
                ra: position.ra,
                dec: position.dec,
                galactic_lon,
                galactic_lat,
                vmag: position.magnitude.unwrap_or(f64::NAN),
                azimuth,
                altitude,
            }
        })
        .collect();

    let place = |kind, id, name: &str, ra: f64, dec: f64, vmag: f64, azimuth: f64, altitude: f64| {
        SkyObject {
            kind,
            id,
            name: name.to_string(),
            ra,
            dec,
            azimuth,
            altitude,
            x: f64::NAN,
            y: f64::NAN,
            vmag,
            angle_to_moon: angular_separation(azimuth, altitude, moon.azimuth, moon.altitude),
        }
    };

    let star_candidates = stars.iter().map(|s| {
        let (az, alt) = equatorial_to_horizontal(s.ra, s.dec, observer);
        place(ObjectKind::Star, s.id, &s.name, s.ra, s.dec, s.vmag, az, alt)
    });
    let planet_candidates = planet_table.iter().enumerate().map(|(i, p)| {
        place(
            ObjectKind::Planet,
            i as i64,
            &p.name,
            p.ra,
            p.dec,
            p.vmag,
            p.azimuth,
            p.altitude,
        )
    });

    let keep = |mut object: SkyObject| -> Option<SkyObject> {
        let in_limits = object.altitude > filter.min_altitude && object.vmag < filter.vmag_limit;
        if !in_limits || object.angle_to_moon <= filter.min_angle_to_moon {
            return None;
        }
        let (x, y) = camera.horizontal_to_image(object.azimuth, object.altitude);
        object.x = x;
        object.y = y;
        in_view(camera, crop, x, y).then_some(object)
    };

    let visible_stars: Vec<SkyObject> = star_candidates.filter_map(keep).collect();
    let visible_planets: Vec<SkyObject> = planet_candidates.filter_map(keep).collect();

    let mut pois: Vec<PlacedPoi> = points_of_interest
        .iter()
        .map(|p| {
            let (azimuth, altitude) = equatorial_to_horizontal(p.ra, p.dec, observer);
            PlacedPoi {
                id: p.id,
                name: p.name.clone(),
                ra: p.ra,
                dec: p.dec,
                azimuth,
                altitude,
                x: f64::NAN,
                y: f64::NAN,
                radius_deg: p.radius_deg,
                anchor: SkyAnchor::Equatorial { ra: p.ra, dec: p.dec },
            }
        })
        .collect();
    pois.push(whole_sky_poi(observer, filter.opening_angle_deg));

    let visible_pois: Vec<PlacedPoi> = pois
        .into_iter()
        .filter(|p| p.altitude > filter.min_altitude)
        .filter_map(|mut p| {
            let (x, y) = camera.horizontal_to_image(p.azimuth, p.altitude);
            p.x = x;
            p.y = y;
            in_view(camera, crop, x, y).then_some(p)
        })
        .collect();

    log::debug!(
        "Working set: {}/{} stars, {} planets, {} points of interest",
        visible_stars.len(),
        stars.len(),
        visible_planets.len(),
        visible_pois.len()
    );

    SkyState {
        stars: visible_stars,
        planets: visible_planets,
        points_of_interest: visible_pois,
        planet_table,
        sun,
        moon,
        moon_phase,
    }
}

/// Point of interest covering the whole usable field around the zenith
pub fn whole_sky_poi(observer: &Observer, opening_angle_deg: f64) -> PlacedPoi {
    PlacedPoi {
        id: WHOLE_SKY_ID,
        name: "Total_sky".to_string(),
        ra: observer.sidereal_time(),
        dec: observer.latitude(),
        azimuth: 0.0,
        altitude: FRAC_PI_2,
        x: f64::NAN,
        y: f64::NAN,
        radius_deg: opening_angle_deg,
        anchor: SkyAnchor::zenith(),
    }
}
