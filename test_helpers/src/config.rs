//! Site configuration JSON for tests

use serde_json::{json, Value};

/// Builds a valid configuration with a centred, linear camera.
///
/// Defaults: site "test-site" at La Palma, radius half the shorter image side,
/// opening angle 80°, one kernel of size 1, magnitude limit 6, no moon
/// exclusion, no crop.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    width: usize,
    height: usize,
    latitude_deg: f64,
    longitude_deg: f64,
    elevation_m: f64,
    zenith: (f64, f64),
    radius: f64,
    projection: String,
    azimuth_offset_deg: f64,
    opening_angle_deg: f64,
    kernel_sizes: Vec<f64>,
    response_function: Option<String>,
    vmag_limit: f64,
    min_angle_to_moon_deg: f64,
    upper: [f64; 2],
    lower: [f64; 2],
    poi_radius_deg: f64,
    absorption: f64,
    cloud_map_sigma: Option<f64>,
    include_planets: bool,
    crop: Vec<Value>,
}

impl ConfigBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            latitude_deg: 28.7617,
            longitude_deg: -17.8908,
            elevation_m: 2200.0,
            zenith: (width as f64 / 2.0, height as f64 / 2.0),
            radius: width.min(height) as f64 / 2.0,
            projection: "linear".to_string(),
            azimuth_offset_deg: 0.0,
            opening_angle_deg: 80.0,
            kernel_sizes: vec![1.0],
            response_function: None,
            vmag_limit: 6.0,
            min_angle_to_moon_deg: 0.0,
            upper: [-0.3, -1.0],
            lower: [-0.3, -3.0],
            poi_radius_deg: 1.0,
            absorption: 0.6,
            cloud_map_sigma: None,
            include_planets: false,
            crop: Vec::new(),
        }
    }

    pub fn location(mut self, latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        self.latitude_deg = latitude_deg;
        self.longitude_deg = longitude_deg;
        self.elevation_m = elevation_m;
        self
    }

    pub fn zenith(mut self, x: f64, y: f64) -> Self {
        self.zenith = (x, y);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn projection(mut self, projection: &str) -> Self {
        self.projection = projection.to_string();
        self
    }

    pub fn opening_angle(mut self, degrees: f64) -> Self {
        self.opening_angle_deg = degrees;
        self
    }

    pub fn kernel_sizes(mut self, sizes: &[f64]) -> Self {
        self.kernel_sizes = sizes.to_vec();
        self
    }

    pub fn response_function(mut self, name: &str) -> Self {
        self.response_function = Some(name.to_string());
        self
    }

    pub fn vmag_limit(mut self, limit: f64) -> Self {
        self.vmag_limit = limit;
        self
    }

    pub fn min_angle_to_moon(mut self, degrees: f64) -> Self {
        self.min_angle_to_moon_deg = degrees;
        self
    }

    /// `[slope, intercept]` of the upper and lower visibility lines
    pub fn visibility_limits(mut self, upper: [f64; 2], lower: [f64; 2]) -> Self {
        self.upper = upper;
        self.lower = lower;
        self
    }

    pub fn poi_radius(mut self, degrees: f64) -> Self {
        self.poi_radius_deg = degrees;
        self
    }

    pub fn absorption(mut self, absorption: f64) -> Self {
        self.absorption = absorption;
        self
    }

    pub fn cloud_map_sigma(mut self, sigma: f64) -> Self {
        self.cloud_map_sigma = Some(sigma);
        self
    }

    pub fn include_planets(mut self, include: bool) -> Self {
        self.include_planets = include;
        self
    }

    pub fn crop_disk(mut self, x: f64, y: f64, radius: f64, delete_inside: bool) -> Self {
        self.crop.push(json!({
            "x": x,
            "y": y,
            "radius": radius,
            "delete_inside": delete_inside,
        }));
        self
    }

    pub fn to_json(&self) -> Value {
        let mut analysis = json!({
            "kernel_sizes": self.kernel_sizes,
            "vmag_limit": self.vmag_limit,
            "min_angle_to_moon_deg": self.min_angle_to_moon_deg,
            "visible_upper_limit": self.upper,
            "visible_lower_limit": self.lower,
            "poi_radius_deg": self.poi_radius_deg,
            "include_planets": self.include_planets,
        });
        if let Some(function) = &self.response_function {
            analysis["response_function"] = json!(function);
        }
        if let Some(sigma) = self.cloud_map_sigma {
            analysis["cloud_map_sigma"] = json!(sigma);
        }

        json!({
            "properties": {
                "name": "test-site",
                "latitude_deg": self.latitude_deg,
                "longitude_deg": self.longitude_deg,
                "elevation_m": self.elevation_m,
                "time_format": "%Y%m%d_%H%M%S",
            },
            "image": {
                "resolution": [self.width, self.height],
                "zenith_x": self.zenith.0,
                "zenith_y": self.zenith.1,
                "radius": self.radius,
                "projection": self.projection,
                "azimuth_offset_deg": self.azimuth_offset_deg,
                "opening_angle_deg": self.opening_angle_deg,
            },
            "analysis": analysis,
            "calibration": {
                "airmass_absorption": self.absorption,
            },
            "crop": self.crop,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_image_size() {
        let value = ConfigBuilder::new(640, 480).to_json();
        assert_eq!(value["image"]["resolution"], json!([640, 480]));
        assert_eq!(value["image"]["zenith_x"], json!(320.0));
        assert_eq!(value["image"]["radius"], json!(240.0));
        assert!(value["analysis"].get("response_function").is_none());
    }

    #[test]
    fn test_overrides() {
        let value = ConfigBuilder::new(64, 48)
            .response_function("DoG")
            .cloud_map_sigma(2.5)
            .crop_disk(1.0, 2.0, 3.0, true)
            .to_json();
        assert_eq!(value["analysis"]["response_function"], json!("DoG"));
        assert_eq!(value["analysis"]["cloud_map_sigma"], json!(2.5));
        assert_eq!(value["crop"][0]["delete_inside"], json!(true));
    }
}
