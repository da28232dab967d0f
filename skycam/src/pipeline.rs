//! Frame processing from decoded pixels to visibilities and cloud coverage

use chrono::{DateTime, Utc};
use ephemeris::{Ephemeris, GeoLocation, Observer};
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;
use shared::image_proc::mask::{apply_nan_mask, fill_masked};
use shared::image_proc::stats::{nan_mean, nan_std};
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, PointOfInterest};
use crate::celestial::{compute_sky_state, BodyState, PlacedPoi, PlanetState, SkyFilter, SkyObject};
use crate::cloud::{cloud_map, global_coverage, star_percentage, SkyAnchor};
use crate::crop::{add_moon_disk, static_crop_mask};
use crate::detection::{measure_stars, MeasureSettings, ResponseFunction, ResponseMaps, StarMeasurement};
use crate::frame::Frame;
use crate::positioning::PositioningLog;
use crate::projection::CameraModel;
use crate::ratescan::{rate_scan, RateScan};
use crate::{Config, SkycamError};

/// Overrides and optional stages chosen at run time
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Replaces `analysis.kernel_sizes`
    pub kernel_sizes: Option<Vec<f64>>,
    /// Replaces `analysis.response_function`
    pub response_function: Option<ResponseFunction>,
    pub cloud_map: bool,
    pub rate_scan: bool,
}

/// A point of interest with the weighted mean visibility around it
#[derive(Debug, Clone, Serialize)]
pub struct PoiResult {
    #[serde(flatten)]
    pub poi: PlacedPoi,
    /// `None` when several kernel sizes were used
    pub star_percentage: Option<f64>,
}

/// Everything measured on one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameResult {
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub source: Option<PathBuf>,
    pub response_function: ResponseFunction,
    pub kernel_sizes: Vec<f64>,
    pub brightness_mean: Option<f64>,
    pub brightness_std: Option<f64>,
    pub sun: BodyState,
    pub moon: BodyState,
    pub moon_phase: f64,
    pub planets: Vec<PlanetState>,
    /// Measurements of every kernel size, brightest first within each
    pub stars: Vec<StarMeasurement>,
    pub points_of_interest: Vec<PoiResult>,
    /// Weighted mean visibility within the opening angle, −1 without stars
    pub global_star_percentage: f64,
    /// Mean of the cloud map, `None` when no map was computed
    pub global_coverage: Option<f64>,
    pub rate_scan: Option<RateScan>,
    #[serde(skip)]
    pub cloud_map: Option<Array2<f64>>,
}

impl FrameResult {
    pub fn visible_count(&self, threshold: f64) -> usize {
        self.stars.iter().filter(|s| s.visible >= threshold).count()
    }
}

/// Per-deployment state shared read-only by every frame
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    camera: CameraModel,
    location: GeoLocation,
    catalog: Catalog,
    points_of_interest: Vec<PointOfInterest>,
    positioning: Option<PositioningLog>,
    static_crop: Array2<bool>,
    ephemeris: Ephemeris,
    kernel_sizes: Vec<f64>,
    response_function: ResponseFunction,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        config: Config,
        catalog: Catalog,
        points_of_interest: Vec<PointOfInterest>,
        options: PipelineOptions,
    ) -> Result<Self, SkycamError> {
        let kernel_sizes = options
            .kernel_sizes
            .clone()
            .unwrap_or_else(|| config.analysis.kernel_sizes.clone());
        if kernel_sizes.is_empty() || kernel_sizes.iter().any(|k| !k.is_finite() || *k <= 0.0) {
            return Err(SkycamError::Config(format!(
                "kernel sizes must be positive, got {kernel_sizes:?}"
            )));
        }
        let response_function = options
            .response_function
            .unwrap_or(config.analysis.response_function);

        let catalog = match config.analysis.min_star_separation_deg {
            Some(separation) => catalog.deduplicated(separation),
            None => catalog,
        };
        let static_crop = static_crop_mask(&config.crop, config.image_size())?;

        log::info!(
            "Pipeline for '{}': {} stars, {} points of interest, {} with kernels {:?}",
            config.properties.name,
            catalog.len(),
            points_of_interest.len(),
            response_function,
            kernel_sizes
        );

        Ok(Self {
            camera: config.camera(),
            location: config.location()?,
            catalog,
            points_of_interest,
            positioning: None,
            static_crop,
            ephemeris: Ephemeris::new(),
            kernel_sizes,
            response_function,
            options,
            config,
        })
    }

    pub fn with_positioning(mut self, positioning: PositioningLog) -> Self {
        self.positioning = Some(positioning);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn measure_settings(&self, kernel_size: f64) -> MeasureSettings {
        MeasureSettings {
            tolerance: self.config.search_tolerance(),
            kernel_size,
            atmosphere: self.config.atmosphere(),
            visibility: self.config.visibility_model(),
            blob_half_width: self.config.analysis.blob_half_width,
        }
    }

    fn frame_points_of_interest(&self, time: &DateTime<Utc>) -> Vec<PointOfInterest> {
        let mut pois = self.points_of_interest.clone();
        let lidar = self
            .positioning
            .as_ref()
            .and_then(|p| p.point_of_interest(time, self.config.analysis.poi_radius_deg));
        match lidar {
            Some(poi) => pois.push(poi),
            None if self.positioning.is_some() => {
                log::warn!("No pointing found for {time}");
            }
            None => {}
        }
        pois
    }

    /// Process one frame.
    ///
    /// Fails for this frame only on a resolution mismatch or when no star
    /// survives the working-set filters.
    pub fn process_frame(&self, frame: &Frame) -> Result<FrameResult, SkycamError> {
        let expected = self.config.image_size();
        let actual = frame.size();
        if actual != expected {
            log::error!("Resolution does not match: {expected} != {actual}. Wrong config file?");
            return Err(SkycamError::ResolutionMismatch { expected, actual });
        }
        log::info!("Processing frame taken at {}", frame.timestamp);

        let observer = Observer::new(self.location, frame.timestamp);
        let filter = SkyFilter::from_config(&self.config);
        let pois = self.frame_points_of_interest(&frame.timestamp);
        let sky = compute_sky_state(
            &self.catalog.stars,
            &pois,
            &observer,
            &self.camera,
            &filter,
            &self.static_crop.view(),
            &self.ephemeris,
        );

        let mut objects: Vec<SkyObject> = sky.stars.clone();
        if self.config.analysis.include_planets {
            objects.extend(sky.planets.iter().cloned());
        }
        if objects.is_empty() {
            log::error!("No stars left after filtering. Maybe all got removed by cropping?");
            return Err(SkycamError::EmptyWorkingSet);
        }

        let mut crop = self.static_crop.clone();
        add_moon_disk(&mut crop, &self.camera, sky.moon.x, sky.moon.y, filter.min_angle_to_moon)?;

        let mut pixels = frame.pixels.clone();
        apply_nan_mask(&mut pixels, &crop.view())?;
        let brightness_mean = nan_mean(&pixels.view());
        let brightness_std = nan_std(&pixels.view());

        let with_diagnostics = self.options.rate_scan;
        let per_kernel: Vec<(ResponseMaps, Vec<StarMeasurement>)> = self
            .kernel_sizes
            .par_iter()
            .map(|&kernel_size| -> Result<_, SkycamError> {
                log::debug!("Applying {} filter, kernel size {kernel_size}", self.response_function);
                let maps = self.response_function.compute(
                    &pixels.view(),
                    kernel_size,
                    &crop.view(),
                    with_diagnostics,
                )?;
                let stars = measure_stars(&objects, &maps, &self.measure_settings(kernel_size))?;
                Ok((maps, stars))
            })
            .collect::<Result<_, _>>()?;

        let scan = if self.options.rate_scan {
            if per_kernel.len() > 1 {
                log::warn!("Rate scan uses the first kernel size only");
            }
            per_kernel.first().and_then(|(maps, stars)| rate_scan(maps, stars))
        } else {
            None
        };

        let stars: Vec<StarMeasurement> = per_kernel.into_iter().flat_map(|(_, stars)| stars).collect();

        let single_kernel = self.kernel_sizes.len() == 1;
        if !single_kernel {
            log::warn!("Cannot compute point of interest percentages with several kernel sizes");
        }
        let points_of_interest = sky
            .points_of_interest
            .into_iter()
            .map(|poi| -> Result<PoiResult, SkycamError> {
                let percentage = if single_kernel {
                    Some(star_percentage(&poi.anchor, &stars, poi.radius_deg, -1.0, true)?)
                } else {
                    None
                };
                Ok(PoiResult {
                    poi,
                    star_percentage: percentage,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let global_star_percentage = star_percentage(
            &SkyAnchor::zenith(),
            &stars,
            self.config.image.opening_angle_deg,
            -1.0,
            true,
        )?;

        let map = if self.options.cloud_map {
            log::debug!("Calculating cloud map");
            let mut map = cloud_map(&stars, self.config.cloud_map_sigma(), expected, true);
            fill_masked(&mut map, &crop.view(), 1.0)?;
            Some(map)
        } else {
            None
        };
        let coverage = map.as_ref().and_then(|m| global_coverage(&m.view()));

        log::info!(
            "Frame {}: {} stars measured, global star percentage {:.3}",
            frame.timestamp,
            stars.len(),
            global_star_percentage
        );

        Ok(FrameResult {
            timestamp: frame.timestamp,
            hash: frame.hash.clone(),
            source: frame.source.clone(),
            response_function: self.response_function,
            kernel_sizes: self.kernel_sizes.clone(),
            brightness_mean,
            brightness_std,
            sun: sky.sun,
            moon: sky.moon,
            moon_phase: sky.moon_phase,
            planets: sky.planet_table,
            stars,
            points_of_interest,
            global_star_percentage,
            global_coverage: coverage,
            rate_scan: scan,
            cloud_map: map,
        })
    }

    /// Process independent frames in parallel, keeping input order
    pub fn process_batch(&self, frames: &[Frame]) -> Vec<Result<FrameResult, SkycamError>> {
        frames.par_iter().map(|frame| self.process_frame(frame)).collect()
    }

    /// Load and process image files in parallel
    pub fn process_files(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<FrameResult, SkycamError>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.process_file(path)))
            .collect()
    }

    pub fn process_file(&self, path: &Path) -> Result<FrameResult, SkycamError> {
        let frame = Frame::load(path, &self.config.properties)?;
        self.process_frame(&frame)
    }
}
