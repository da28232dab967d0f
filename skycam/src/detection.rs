//! Star detection: response filtering, peak search and visibility
//!
//! Every object in the working set is looked up in a filtered copy of the
//! frame. The brightest pixel within the search tolerance of the projected
//! position is taken as the star's peak. Two objects claiming the same peak
//! are resolved in favour of the brighter catalog star.

use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use shared::image_proc::filters::{
    clip_negative_inplace, difference_of_gaussians, laplacian_of_gaussian, sobel,
    squared_gradient,
};
use shared::image_proc::mask::apply_nan_mask;
use shared::image_proc::blob_size;
use shared::image_proc::window::{local_max_position, local_max_value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::atmosphere::Atmosphere;
use crate::celestial::SkyObject;
use crate::visibility::VisibilityModel;
use crate::SkycamError;

/// Responses at or below this are treated as "not found"
pub const MIN_RESPONSE: f64 = 1e-100;

/// Filter used to turn the frame into a star response map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResponseFunction {
    /// Laplacian of Gaussian for detection, plus gradient and Sobel diagnostics
    All,
    /// Difference of Gaussians `G(k) − G(1.6k)`
    DoG,
    /// Laplacian of Gaussian
    #[default]
    LoG,
    /// Squared positive backward differences
    Grad,
    /// Sobel edge magnitude
    Sobel,
}

impl FromStr for ResponseFunction {
    type Err = SkycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ResponseFunction::All),
            "dog" => Ok(ResponseFunction::DoG),
            "log" => Ok(ResponseFunction::LoG),
            "grad" => Ok(ResponseFunction::Grad),
            "sobel" => Ok(ResponseFunction::Sobel),
            _ => Err(SkycamError::UnknownResponseFunction(s.to_string())),
        }
    }
}

impl fmt::Display for ResponseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseFunction::All => "All",
            ResponseFunction::DoG => "DoG",
            ResponseFunction::LoG => "LoG",
            ResponseFunction::Grad => "Grad",
            ResponseFunction::Sobel => "Sobel",
        };
        f.write_str(name)
    }
}

/// Filtered frames for one kernel size. Masked pixels are NaN in every map.
#[derive(Debug, Clone)]
pub struct ResponseMaps {
    /// Map used for peak search and visibility
    pub response: Array2<f64>,
    pub gradient: Option<Array2<f64>>,
    pub sobel: Option<Array2<f64>>,
}

impl ResponseMaps {
    pub fn has_diagnostics(&self) -> bool {
        self.gradient.is_some() && self.sobel.is_some()
    }
}

fn finish(mut map: Array2<f64>, crop: &ArrayView2<bool>) -> Result<Array2<f64>, SkycamError> {
    clip_negative_inplace(&mut map);
    apply_nan_mask(&mut map, crop)?;
    Ok(map)
}

impl ResponseFunction {
    /// Filter `image` with Gaussian sigma `kernel_size`.
    ///
    /// `All` always computes the gradient and Sobel maps as well;
    /// `with_diagnostics` forces them for the other functions too, in which
    /// case the LoG map is the detection signal.
    pub fn compute(
        &self,
        image: &ArrayView2<f64>,
        kernel_size: f64,
        crop: &ArrayView2<bool>,
        with_diagnostics: bool,
    ) -> Result<ResponseMaps, SkycamError> {
        if *self == ResponseFunction::All || with_diagnostics {
            return Ok(ResponseMaps {
                response: finish(laplacian_of_gaussian(image, kernel_size), crop)?,
                gradient: Some(finish(squared_gradient(image), crop)?),
                sobel: Some(finish(sobel(image), crop)?),
            });
        }

        let raw = match self {
            ResponseFunction::DoG => difference_of_gaussians(image, kernel_size),
            ResponseFunction::Grad => squared_gradient(image),
            ResponseFunction::Sobel => sobel(image),
            ResponseFunction::LoG | ResponseFunction::All => laplacian_of_gaussian(image, kernel_size),
        };
        Ok(ResponseMaps {
            response: finish(raw, crop)?,
            gradient: None,
            sobel: None,
        })
    }
}

/// One star (or planet) measured in one frame with one kernel size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarMeasurement {
    #[serde(flatten)]
    pub object: SkyObject,
    pub kernel_size: f64,
    /// Pixel of the detected peak
    pub max_x: usize,
    pub max_y: usize,
    /// Peak response before extinction correction
    pub response_raw: f64,
    /// Peak response divided by the atmospheric transmission
    pub response: f64,
    pub response_grad: Option<f64>,
    pub response_sobel: Option<f64>,
    /// Pixels of the connected region above a tenth of the peak
    pub blob_size: Option<usize>,
    /// Visibility in `[0, 1]`
    pub visible: f64,
}

/// Settings shared by every measurement in a frame
#[derive(Debug, Clone, Copy)]
pub struct MeasureSettings {
    pub tolerance: usize,
    pub kernel_size: f64,
    pub atmosphere: Atmosphere,
    pub visibility: VisibilityModel,
    /// Half-width of the blob sizing window, `None` to skip sizing
    pub blob_half_width: Option<usize>,
}

/// Size of the bright region around a peak, `None` when the window does not
/// fit inside the map
fn peak_blob_size(
    response: &ArrayView2<f64>,
    (x, y): (usize, usize),
    half_width: usize,
    threshold: f64,
) -> Result<Option<usize>, SkycamError> {
    let (rows, cols) = response.dim();
    if x < half_width || y < half_width || x + half_width >= cols || y + half_width >= rows {
        return Ok(None);
    }
    let window = response.slice(s![y - half_width..=y + half_width, x - half_width..=x + half_width]);
    Ok(Some(blob_size(&window, threshold, 0)?))
}

/// Detect, deduplicate and classify the objects of the working set.
///
/// Output is ordered by magnitude, brightest first. Objects without a
/// positive response are dropped.
pub fn measure_stars(
    objects: &[SkyObject],
    maps: &ResponseMaps,
    settings: &MeasureSettings,
) -> Result<Vec<StarMeasurement>, SkycamError> {
    let response = maps.response.view();
    let tolerance = settings.tolerance;

    let mut peaks: Vec<(&SkyObject, (usize, usize))> = objects
        .iter()
        .map(|o| (o, local_max_position(&response, o.x, o.y, tolerance)))
        .collect();
    peaks.sort_by(|a, b| a.0.vmag.total_cmp(&b.0.vmag));

    let mut claimed = HashSet::new();
    peaks.retain(|(_, peak)| claimed.insert(*peak));

    let diagnostic = |map: &Option<Array2<f64>>, o: &SkyObject| {
        map.as_ref()
            .map(|m| local_max_value(&m.view(), o.x, o.y, tolerance))
    };

    let mut measured = Vec::with_capacity(peaks.len());
    for (object, peak) in peaks {
        let response_raw = local_max_value(&response, object.x, object.y, tolerance);
        if response_raw.is_nan() || response_raw <= MIN_RESPONSE {
            continue;
        }
        let corrected = settings.atmosphere.correct(response_raw, object.altitude);
        let blob_size = match settings.blob_half_width {
            Some(half_width) => peak_blob_size(&response, peak, half_width, corrected * 0.1)?,
            None => None,
        };
        measured.push(StarMeasurement {
            object: object.clone(),
            kernel_size: settings.kernel_size,
            max_x: peak.0,
            max_y: peak.1,
            response_raw,
            response: corrected,
            response_grad: diagnostic(&maps.gradient, object),
            response_sobel: diagnostic(&maps.sobel, object),
            blob_size,
            visible: settings.visibility.visibility(corrected, object.vmag),
        });
    }

    log::debug!(
        "Kernel {}: {} of {} objects measured",
        settings.kernel_size,
        measured.len(),
        objects.len()
    );
    Ok(measured)
}
