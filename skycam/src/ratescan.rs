//! Threshold rate scan over the diagnostic response maps
//!
//! For a ladder of log-spaced thresholds, count for each response map how
//! many stars, pixels and pixel clusters lie above the threshold. The lowest
//! threshold that still keeps the star fraction at its maximum is a starting
//! point for tuning the visibility limits.

use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::Serialize;
use shared::image_proc::thresholding::{count_above, count_clusters};

use crate::cloud::NO_STARS_IN_RANGE;
use crate::detection::{ResponseMaps, StarMeasurement};

/// Number of thresholds in the scan
pub const RATE_SCAN_STEPS: usize = 200;

/// log10 of the lowest and highest threshold
pub const RATE_SCAN_RANGE: (f64, f64) = (-4.5, -0.5);

/// Counts above one threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    /// Fraction of stars whose response exceeds the threshold
    pub star_fraction: f64,
    pub pixel_count: usize,
    pub cluster_count: u32,
    pub visible_count: usize,
}

/// Scan result for one response map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateCurve {
    pub points: Vec<RatePoint>,
    /// Last index at which the star fraction reaches its maximum
    pub min_threshold_index: usize,
    pub min_threshold: f64,
    pub clusters_at_min: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateScan {
    pub thresholds: Vec<f64>,
    pub gradient: RateCurve,
    pub sobel: RateCurve,
    pub log: RateCurve,
}

/// `steps` thresholds evenly spaced in log10 between `start` and `stop`
pub fn log_thresholds(start: f64, stop: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (stop - start) / (steps - 1) as f64;
            (0..steps)
                .map(|i| 10f64.powf(start + step * i as f64))
                .collect()
        }
    }
}

fn star_responses<F>(stars: &[StarMeasurement], pick: F) -> Vec<f64>
where
    F: Fn(&StarMeasurement) -> Option<f64>,
{
    stars.iter().map(|s| pick(s).unwrap_or(f64::NAN)).collect()
}

fn scan_map(map: &ArrayView2<f64>, star_responses: &[f64], thresholds: &[f64]) -> RateCurve {
    let points: Vec<RatePoint> = thresholds
        .par_iter()
        .map(|&threshold| {
            let visible_count = star_responses.iter().filter(|&&r| r > threshold).count();
            let star_fraction = if star_responses.is_empty() {
                NO_STARS_IN_RANGE
            } else {
                visible_count as f64 / star_responses.len() as f64
            };
            RatePoint {
                star_fraction,
                pixel_count: count_above(map, threshold),
                cluster_count: count_clusters(map, threshold),
                visible_count,
            }
        })
        .collect();

    let best = points
        .iter()
        .map(|p| p.star_fraction)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_threshold_index = points
        .iter()
        .rposition(|p| p.star_fraction == best)
        .unwrap_or(0);

    RateCurve {
        min_threshold: thresholds.get(min_threshold_index).copied().unwrap_or(f64::NAN),
        clusters_at_min: points.get(min_threshold_index).map_or(0, |p| p.cluster_count),
        min_threshold_index,
        points,
    }
}

/// Run the scan on the gradient, Sobel and LoG maps.
///
/// Returns `None` when `maps` carries no diagnostic maps. LoG star responses
/// are the extinction-corrected ones.
pub fn rate_scan(maps: &ResponseMaps, stars: &[StarMeasurement]) -> Option<RateScan> {
    let (gradient, sobel) = match (&maps.gradient, &maps.sobel) {
        (Some(g), Some(s)) => (g, s),
        _ => return None,
    };
    let thresholds = log_thresholds(RATE_SCAN_RANGE.0, RATE_SCAN_RANGE.1, RATE_SCAN_STEPS);

    let grad_responses = star_responses(stars, |s| s.response_grad);
    let sobel_responses = star_responses(stars, |s| s.response_sobel);
    let log_responses = star_responses(stars, |s| Some(s.response));

    log::info!("Rate scan over {} thresholds for {} stars", thresholds.len(), stars.len());
    Some(RateScan {
        gradient: scan_map(&gradient.view(), &grad_responses, &thresholds),
        sobel: scan_map(&sobel.view(), &sobel_responses, &thresholds),
        log: scan_map(&maps.response.view(), &log_responses, &thresholds),
        thresholds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_log_thresholds() {
        let t = log_thresholds(RATE_SCAN_RANGE.0, RATE_SCAN_RANGE.1, RATE_SCAN_STEPS);
        assert_eq!(t.len(), 200);
        assert_relative_eq!(t[0], 10f64.powf(-4.5), max_relative = 1e-12);
        assert_relative_eq!(t[199], 10f64.powf(-0.5), max_relative = 1e-12);
        assert!(t.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(log_thresholds(0.0, 1.0, 1), vec![1.0]);
        assert!(log_thresholds(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_scan_map_counts() {
        let mut map = Array2::zeros((10, 10));
        map[[1, 1]] = 0.5;
        map[[1, 2]] = 0.5;
        map[[7, 7]] = 0.05;
        map[[0, 9]] = f64::NAN;
        let thresholds = [0.01, 0.1, 1.0];
        let curve = scan_map(&map.view(), &[0.5, 0.05], &thresholds);

        assert_eq!(curve.points[0].pixel_count, 3);
        assert_eq!(curve.points[0].cluster_count, 2);
        assert_eq!(curve.points[0].visible_count, 2);
        assert_eq!(curve.points[1].pixel_count, 2);
        assert_eq!(curve.points[1].cluster_count, 1);
        assert_relative_eq!(curve.points[1].star_fraction, 0.5);
        assert_eq!(curve.points[2].pixel_count, 0);
        assert_eq!(curve.points[2].star_fraction, 0.0);
        assert_eq!(curve.min_threshold_index, 0);
        assert_eq!(curve.clusters_at_min, 2);
    }

    #[test]
    fn test_min_threshold_is_last_maximum() {
        let map = Array2::zeros((4, 4));
        let curve = scan_map(&map.view(), &[0.5, 0.6], &[0.01, 0.1, 0.4, 0.55, 1.0]);
        // The fraction stays at 1 up to 0.4
        assert_eq!(curve.min_threshold_index, 2);
        assert_eq!(curve.min_threshold, 0.4);
    }

    #[test]
    fn test_no_stars_gives_sentinel_fraction() {
        let map = Array2::zeros((4, 4));
        let curve = scan_map(&map.view(), &[], &[0.1]);
        assert_eq!(curve.points[0].star_fraction, NO_STARS_IN_RANGE);
    }

    #[test]
    fn test_requires_diagnostic_maps() {
        let maps = ResponseMaps {
            response: Array2::zeros((4, 4)),
            gradient: None,
            sobel: None,
        };
        assert!(rate_scan(&maps, &[]).is_none());
    }
}
