//! Star catalog and points of interest
//!
//! Both are CSV files with a header row; lines starting with `#` are
//! comments. Coordinates are given in degrees and stored in radians.

use ephemeris::angular_separation;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::SkycamError;

/// Identifier of the whole-sky point of interest
pub const WHOLE_SKY_ID: i64 = -1;

/// Identifier of the point of interest taken from the positioning log
pub const POSITIONING_ID: i64 = -2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStar {
    pub id: i64,
    pub name: String,
    /// Right ascension in radians
    pub ra: f64,
    /// Declination in radians
    pub dec: f64,
    pub vmag: f64,
}

#[derive(Debug, Deserialize)]
struct StarRecord {
    #[serde(alias = "ID", alias = "HIP")]
    id: i64,
    #[serde(default)]
    name: String,
    ra: f64,
    dec: f64,
    vmag: f64,
}

impl From<StarRecord> for CatalogStar {
    fn from(r: StarRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            ra: r.ra.to_radians(),
            dec: r.dec.to_radians(),
            vmag: r.vmag,
        }
    }
}

/// A named sky position whose surroundings get their own star percentage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub id: i64,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub radius_deg: f64,
}

#[derive(Debug, Deserialize)]
struct PoiRecord {
    #[serde(alias = "ID")]
    id: i64,
    name: String,
    ra: f64,
    dec: f64,
    #[serde(default)]
    radius: Option<f64>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_records<T, R>(reader: R, path: &Path) -> Result<Vec<T>, SkycamError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    csv_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| SkycamError::CatalogUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

fn open(path: &Path) -> Result<std::fs::File, SkycamError> {
    std::fs::File::open(path).map_err(|e| SkycamError::CatalogUnreadable {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// The star catalog, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub stars: Vec<CatalogStar>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, SkycamError> {
        Self::from_reader(open(path)?, path)
    }

    /// Parse catalog CSV from any reader; `origin` only labels errors
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, SkycamError> {
        let records: Vec<StarRecord> = read_records(reader, origin)?;
        let stars: Vec<CatalogStar> = records.into_iter().map(CatalogStar::from).collect();
        log::debug!("Loaded {} catalog stars from {}", stars.len(), origin.display());
        Ok(Self { stars })
    }

    /// Keep only stars that survive [`filter_catalogue`], brightest first
    pub fn deduplicated(&self, min_separation_deg: f64) -> Self {
        let keep = filter_catalogue(&self.stars, min_separation_deg);
        log::info!(
            "Catalog separation filter ({min_separation_deg}°) kept {}/{} stars",
            keep.len(),
            self.stars.len()
        );
        Self {
            stars: keep.into_iter().map(|i| self.stars[i].clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Load points of interest, giving `default_radius_deg` to rows without a radius
pub fn load_points_of_interest(
    path: &Path,
    default_radius_deg: f64,
) -> Result<Vec<PointOfInterest>, SkycamError> {
    points_of_interest_from_reader(open(path)?, path, default_radius_deg)
}

pub fn points_of_interest_from_reader<R: Read>(
    reader: R,
    origin: &Path,
    default_radius_deg: f64,
) -> Result<Vec<PointOfInterest>, SkycamError> {
    let records: Vec<PoiRecord> = read_records(reader, origin)?;
    Ok(records
        .into_iter()
        .map(|r| PointOfInterest {
            id: r.id,
            name: r.name,
            ra: r.ra.to_radians(),
            dec: r.dec.to_radians(),
            radius_deg: r.radius.unwrap_or(default_radius_deg),
        })
        .collect())
}

/// Greedy brightness-ordered suppression of close pairs.
///
/// Stars are visited from brightest to dimmest; each visited star removes every
/// dimmer remaining star within `min_separation_deg`. Returns the indices of
/// the survivors, brightest first.
pub fn filter_catalogue(stars: &[CatalogStar], min_separation_deg: f64) -> Vec<usize> {
    let min_separation = min_separation_deg.to_radians();
    let mut order: Vec<usize> = (0..stars.len()).collect();
    order.sort_by(|&a, &b| stars[a].vmag.total_cmp(&stars[b].vmag));

    let mut i1 = 0;
    while i1 + 1 < order.len() {
        let reference = &stars[order[i1]];
        let mut position = 0;
        order.retain(|&j| {
            let star = &stars[j];
            let keep = position <= i1
                || angular_separation(reference.ra, reference.dec, star.ra, star.dec)
                    > min_separation;
            position += 1;
            keep
        });
        i1 += 1;
    }

    order
}
