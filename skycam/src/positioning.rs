//! Pointing log of a co-located instrument
//!
//! The instrument runs continuously while frames arrive every few minutes.
//! For each frame the pointing recorded 5 to 10 minutes after the frame time
//! becomes an extra point of interest.

use chrono::{DateTime, Utc};
use ephemeris::time::modified_julian_date;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::catalog::{PointOfInterest, POSITIONING_ID};
use crate::SkycamError;

const MINUTE_IN_DAYS: f64 = 1.0 / 24.0 / 60.0;

/// Pointings within this window after the frame time are candidates
const MATCH_WINDOW_DAYS: (f64, f64) = (5.0 * MINUTE_IN_DAYS, 10.0 * MINUTE_IN_DAYS);

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PositionEntry {
    #[serde(alias = "MJD")]
    pub mjd: f64,
    /// Degrees
    pub ra: f64,
    /// Degrees
    pub dec: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PositioningLog {
    entries: Vec<PositionEntry>,
}

impl PositioningLog {
    pub fn new(entries: Vec<PositionEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, SkycamError> {
        let file = std::fs::File::open(path).map_err(|e| SkycamError::io(path, e))?;
        Self::from_reader(file, path)
    }

    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, SkycamError> {
        let entries = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<PositionEntry>, _>>()
            .map_err(|source| SkycamError::CatalogUnreadable {
                path: origin.to_path_buf(),
                source,
            })?;
        log::debug!("Loaded {} pointings from {}", entries.len(), origin.display());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest entry with `5 min < mjd − frame_mjd < 10 min`
    pub fn find_matching(&self, frame_mjd: f64) -> Option<&PositionEntry> {
        let (low, high) = MATCH_WINDOW_DAYS;
        self.entries
            .iter()
            .filter(|e| {
                let delta = e.mjd - frame_mjd;
                delta > low && delta < high
            })
            .min_by(|a, b| a.mjd.total_cmp(&b.mjd))
    }

    /// Point of interest for the pointing matching `time`, if any
    pub fn point_of_interest(&self, time: &DateTime<Utc>, radius_deg: f64) -> Option<PointOfInterest> {
        let entry = self.find_matching(modified_julian_date(time))?;
        Some(PointOfInterest {
            id: POSITIONING_ID,
            name: "Lidar".to_string(),
            ra: entry.ra.to_radians(),
            dec: entry.dec.to_radians(),
            radius_deg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log() -> PositioningLog {
        let base = 57_000.0;
        PositioningLog::new(vec![
            PositionEntry { mjd: base + 2.0 * MINUTE_IN_DAYS, ra: 1.0, dec: 1.0 },
            PositionEntry { mjd: base + 9.0 * MINUTE_IN_DAYS, ra: 9.0, dec: 9.0 },
            PositionEntry { mjd: base + 6.0 * MINUTE_IN_DAYS, ra: 6.0, dec: 6.0 },
            PositionEntry { mjd: base + 12.0 * MINUTE_IN_DAYS, ra: 12.0, dec: 12.0 },
        ])
    }

    #[test]
    fn test_earliest_in_window_wins() {
        let log = log();
        let entry = log.find_matching(57_000.0).unwrap();
        assert_eq!(entry.ra, 6.0);
    }

    #[test]
    fn test_no_match_outside_window() {
        assert!(log().find_matching(57_001.0).is_none());
        assert!(PositioningLog::default().find_matching(57_000.0).is_none());
    }

    #[test]
    fn test_point_of_interest_from_csv() {
        // 2015-01-01T00:00:00Z is MJD 57023
        let data = "MJD,ra,dec\n57023.005,83.6,22.0\n57023.1,10.0,10.0\n";
        let log = PositioningLog::from_reader(data.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(log.len(), 2);
        let time = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let poi = log.point_of_interest(&time, 1.5).unwrap();
        assert_eq!(poi.id, POSITIONING_ID);
        assert_eq!(poi.name, "Lidar");
        assert_eq!(poi.radius_deg, 1.5);
        assert!((poi.ra - 83.6f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_bad_row_rejected() {
        let data = "MJD,ra,dec\nsoon,1,2\n";
        assert!(matches!(
            PositioningLog::from_reader(data.as_bytes(), Path::new("inline")),
            Err(SkycamError::CatalogUnreadable { .. })
        ));
    }
}
