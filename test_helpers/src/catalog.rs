//! CSV fixtures in the formats the sky camera reads

use std::path::{Path, PathBuf};

/// One catalog row; coordinates in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct StarRow {
    pub id: i64,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub vmag: f64,
}

impl StarRow {
    pub fn new(id: i64, name: &str, ra: f64, dec: f64, vmag: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            ra,
            dec,
            vmag,
        }
    }
}

fn write_csv<const N: usize>(path: &Path, header: [&str; N], rows: Vec<[String; N]>) -> PathBuf {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer.write_record(header).expect("Failed to write CSV header");
    for row in rows {
        writer.write_record(&row).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
    path.to_path_buf()
}

/// Write `catalog.csv` (`id,name,ra,dec,vmag`) into `dir`
pub fn write_catalog_csv(dir: &Path, rows: &[StarRow]) -> PathBuf {
    write_csv(
        &dir.join("catalog.csv"),
        ["id", "name", "ra", "dec", "vmag"],
        rows.iter()
            .map(|r| {
                [
                    r.id.to_string(),
                    r.name.clone(),
                    r.ra.to_string(),
                    r.dec.to_string(),
                    r.vmag.to_string(),
                ]
            })
            .collect(),
    )
}

/// Write `poi.csv` (`id,name,ra,dec,radius`) into `dir`; `None` leaves the
/// radius empty
pub fn write_poi_csv(dir: &Path, rows: &[(i64, &str, f64, f64, Option<f64>)]) -> PathBuf {
    write_csv(
        &dir.join("poi.csv"),
        ["id", "name", "ra", "dec", "radius"],
        rows.iter()
            .map(|&(id, name, ra, dec, radius)| {
                [
                    id.to_string(),
                    name.to_string(),
                    ra.to_string(),
                    dec.to_string(),
                    radius.map(|r| r.to_string()).unwrap_or_default(),
                ]
            })
            .collect(),
    )
}

/// Write `positioning.csv` (`MJD,ra,dec`) into `dir`
pub fn write_positioning_csv(dir: &Path, rows: &[(f64, f64, f64)]) -> PathBuf {
    write_csv(
        &dir.join("positioning.csv"),
        ["MJD", "ra", "dec"],
        rows.iter()
            .map(|&(mjd, ra, dec)| [mjd.to_string(), ra.to_string(), dec.to_string()])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_layout() {
        let dir = std::env::temp_dir().join(format!("test_helpers_catalog_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_catalog_csv(&dir, &[StarRow::new(1, "Vega", 279.23, 38.78, 0.03)]);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,name,ra,dec,vmag\n1,Vega,279.23,38.78,0.03\n");

        let path = write_poi_csv(&dir, &[(3, "Crab", 83.6, 22.0, None)]);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,name,ra,dec,radius\n3,Crab,83.6,22,\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
