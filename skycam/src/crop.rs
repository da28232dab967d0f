//! Crop masks: static disks from the configuration plus the moon disk

use ndarray::Array2;
use serde::{Deserialize, Deserializer, Serialize};
use shared::image_proc::mask::{disk_mask, union_inplace};
use shared::ImageSize;

use crate::projection::CameraModel;
use crate::SkycamError;

/// One crop disk in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropDisk {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// `true` excludes the inside of the disk, `false` everything outside it
    #[serde(default)]
    pub delete_inside: bool,
}

/// Deserialize the crop list, falling back to no disks when it is malformed
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Vec<CropDisk>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(disks) => Ok(disks),
        Err(e) => {
            log::error!("Cropping failed, crop section is malformed ({e}); using an empty crop mask");
            Ok(Vec::new())
        }
    }
}

/// Union of all static crop disks (`true` = excluded)
pub fn static_crop_mask(disks: &[CropDisk], size: ImageSize) -> Result<Array2<bool>, SkycamError> {
    let mut mask = size.mask(false);
    for disk in disks {
        let disk_mask = disk_mask(size, disk.x, disk.y, disk.radius, disk.delete_inside);
        union_inplace(&mut mask, &disk_mask.view())?;
    }
    Ok(mask)
}

/// Add the disk around the moon's pixel position whose radius corresponds to
/// `min_angle_to_moon` (radians)
pub fn add_moon_disk(
    mask: &mut Array2<bool>,
    camera: &CameraModel,
    moon_x: f64,
    moon_y: f64,
    min_angle_to_moon: f64,
) -> Result<(), SkycamError> {
    let radius = camera.theta_to_r(min_angle_to_moon);
    let moon = disk_mask(camera.size, moon_x, moon_y, radius, true);
    union_inplace(mask, &moon.view())?;
    Ok(())
}
