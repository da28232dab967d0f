//! JSON configuration for one camera site

use ephemeris::GeoLocation;
use serde::{Deserialize, Serialize};
use shared::ImageSize;
use std::path::Path;

use crate::atmosphere::{AirmassModel, Atmosphere};
use crate::crop::{self, CropDisk};
use crate::detection::ResponseFunction;
use crate::projection::{CameraModel, Projection};
use crate::visibility::{VisibilityLine, VisibilityModel};
use crate::SkycamError;

fn default_time_format() -> String {
    "%Y%m%d_%H%M%S".to_string()
}

/// Site identity and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub elevation_m: f64,
    /// Added to every timestamp parsed from a file name
    #[serde(default)]
    pub time_offset_minutes: f64,
    /// `chrono` format string matching the image file stem
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

/// Camera geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// `[width, height]` in pixels
    pub resolution: [usize; 2],
    pub zenith_x: f64,
    pub zenith_y: f64,
    pub radius: f64,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub azimuth_offset_deg: f64,
    /// Half-angle of the usable field around the zenith
    pub opening_angle_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Gaussian sigmas of the response filter, one pass each
    pub kernel_sizes: Vec<f64>,
    #[serde(default)]
    pub response_function: ResponseFunction,
    pub vmag_limit: f64,
    #[serde(default)]
    pub min_angle_to_moon_deg: f64,
    pub visible_upper_limit: VisibilityLine,
    pub visible_lower_limit: VisibilityLine,
    /// Radius assigned to points of interest without one
    pub poi_radius_deg: f64,
    /// Drop dimmer catalog stars closer than this to a brighter one
    #[serde(default)]
    pub min_star_separation_deg: Option<f64>,
    /// Cloud map smoothing; defaults to width / 80
    #[serde(default)]
    pub cloud_map_sigma: Option<f64>,
    /// Run planets through detection together with the stars
    #[serde(default)]
    pub include_planets: bool,
    /// Half-width of the window used to size each star's blob
    #[serde(default)]
    pub blob_half_width: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub airmass_absorption: f64,
    #[serde(default)]
    pub airmass_model: AirmassModel,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub properties: Properties,
    pub image: ImageConfig,
    pub analysis: AnalysisConfig,
    pub calibration: CalibrationConfig,
    /// Static crop disks; a malformed section yields no disks
    #[serde(default, deserialize_with = "crop::deserialize_lenient")]
    pub crop: Vec<CropDisk>,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, SkycamError> {
        let json = std::fs::read_to_string(path).map_err(|e| SkycamError::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SkycamError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SkycamError> {
        let [w, h] = self.image.resolution;
        if w == 0 || h == 0 {
            return Err(SkycamError::Config(format!("resolution must be positive, got {w}x{h}")));
        }
        if self.image.radius.is_nan() || self.image.radius <= 0.0 {
            return Err(SkycamError::Config(format!(
                "image radius must be positive, got {}",
                self.image.radius
            )));
        }
        if self.analysis.kernel_sizes.is_empty() {
            return Err(SkycamError::Config("at least one kernel size is required".into()));
        }
        if self.analysis.kernel_sizes.iter().any(|k| !k.is_finite() || *k <= 0.0) {
            return Err(SkycamError::Config(format!(
                "kernel sizes must be positive, got {:?}",
                self.analysis.kernel_sizes
            )));
        }
        self.location()?;
        Ok(())
    }

    pub fn image_size(&self) -> ImageSize {
        let [w, h] = self.image.resolution;
        ImageSize::from_width_height(w, h)
    }

    pub fn camera(&self) -> CameraModel {
        CameraModel {
            zenith_x: self.image.zenith_x,
            zenith_y: self.image.zenith_y,
            radius: self.image.radius,
            projection: self.image.projection,
            azimuth_offset: self.image.azimuth_offset_deg.to_radians(),
            size: self.image_size(),
        }
    }

    pub fn location(&self) -> Result<GeoLocation, SkycamError> {
        Ok(GeoLocation::from_degrees(
            self.properties.latitude_deg,
            self.properties.longitude_deg,
            self.properties.elevation_m,
        )?)
    }

    pub fn atmosphere(&self) -> Atmosphere {
        Atmosphere {
            model: self.calibration.airmass_model,
            absorption: self.calibration.airmass_absorption,
            observer_km: self.properties.elevation_m / 1000.0,
        }
    }

    pub fn visibility_model(&self) -> VisibilityModel {
        VisibilityModel {
            upper: self.analysis.visible_upper_limit,
            lower: self.analysis.visible_lower_limit,
        }
    }

    /// Lowest altitude (radians) an object may have to stay in the working set
    pub fn min_altitude(&self) -> f64 {
        (90.0 - self.image.opening_angle_deg).to_radians()
    }

    /// Half-width of the peak search window in pixels.
    ///
    /// Roughly half a degree, so it stays below the minimum separation of
    /// catalog stars.
    pub fn search_tolerance(&self) -> usize {
        ((self.image.radius / 90.0 - 1.0) / 2.0).floor().max(0.0) as usize
    }

    pub fn cloud_map_sigma(&self) -> f64 {
        self.analysis
            .cloud_map_sigma
            .unwrap_or((self.image.resolution[0] / 80) as f64)
    }
}
