//! Ground observer: a fixed site plus the instant being observed.

use chrono::{DateTime, Utc};

use crate::time::{julian_date, local_sidereal_time};
use crate::EphemerisError;

/// Geographic location of an observing site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Geodetic latitude in radians (north positive)
    pub latitude: f64,
    /// Longitude in radians (east positive)
    pub longitude: f64,
    /// Height above sea level in meters
    pub elevation_m: f64,
}

impl GeoLocation {
    /// Build a location from degrees, validating the ranges
    pub fn from_degrees(
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
    ) -> Result<Self, EphemerisError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(EphemerisError::InvalidLatitude(latitude_deg));
        }
        if !(-180.0..=360.0).contains(&longitude_deg) {
            return Err(EphemerisError::InvalidLongitude(longitude_deg));
        }
        Ok(Self {
            latitude: latitude_deg.to_radians(),
            longitude: longitude_deg.to_radians(),
            elevation_m,
        })
    }
}

/// A site observed at a specific instant.
///
/// The location never changes for a deployment; a new observer is built for
/// every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    location: GeoLocation,
    time: DateTime<Utc>,
}

impl Observer {
    pub fn new(location: GeoLocation, time: DateTime<Utc>) -> Self {
        Self { location, time }
    }

    pub fn location(&self) -> &GeoLocation {
        &self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn julian_date(&self) -> f64 {
        julian_date(&self.time)
    }

    /// Local mean sidereal time in radians
    pub fn sidereal_time(&self) -> f64 {
        local_sidereal_time(self.julian_date(), self.location.longitude)
    }
}
