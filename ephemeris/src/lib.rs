//! Observer geometry and solar-system ephemeris for ground-based sky cameras.
//!
//! This crate provides the time scales, coordinate transforms and low-precision
//! analytic positions of the sun, moon and planets that an all-sky camera needs
//! to decide where objects should appear for a given site and instant.
//!
//! # Modules
//!
//! - **time**: Julian dates and sidereal time
//! - **observer**: Fixed site location with a per-frame timestamp
//! - **coordinates**: Equatorial, horizontal, ecliptic and galactic transforms
//! - **celestial**: Sun, moon and planet positions, moon phase
//!
//! All angles are radians unless a function name or argument says otherwise.

pub mod celestial;
pub mod coordinates;
pub mod observer;
pub mod time;

pub use celestial::{BodyPosition, Ephemeris, SolarSystemBody};
pub use coordinates::{angular_separation, equatorial_to_horizontal};
pub use observer::{GeoLocation, Observer};

use thiserror::Error;

/// Errors raised while building observer state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Latitude {0}° is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("Longitude {0}° is outside [-180, 360]")]
    InvalidLongitude(f64),
}
