/*!
 * Fetch distance tables, and the extraction pipeline that produces them from a region of interest.
 */

use crate::{
    coord::Coord,
    error::InvalidInputError,
    intersect::{DualIntersections, Intersection},
    roi::RoiBoundary,
    transect::{generate_transects, Transect, DEFAULT_AZIMUTH_STEP, DEFAULT_TRANSECT_LENGTH},
    FetchResult,
};
use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// A row in a [FetchTable].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FetchRow {
    /// Degrees clockwise from north.
    #[serde(rename = "Azimuth")]
    pub azimuth: f64,
    /// Distance from the tower to the boundary in meters.
    #[serde(rename = "Fetch")]
    pub fetch: f64,
}

/// Fetch distance for each azimuth, ordered by strictly increasing azimuth.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTable(Vec<FetchRow>);

impl FetchTable {
    /// Build a table from rows, which must have strictly increasing azimuths.
    pub fn new(rows: Vec<FetchRow>) -> Result<Self, InvalidInputError> {
        if let Some(w) = rows.windows(2).find(|w| w[0].azimuth >= w[1].azimuth) {
            return Err(InvalidInputError::new(format!(
                "fetch table azimuths must be strictly increasing, {} followed by {}",
                w[0].azimuth, w[1].azimuth
            )));
        }

        Ok(FetchTable(rows))
    }

    /**
     * Measure the geodesic distance from the tower to each intersection.
     *
     * Distances are computed on the WGS84 ellipsoid. The intersections should come from the
     * spherical mode, the planar ones are only good for drawing.
     */
    pub fn from_intersections(
        tower: Coord,
        intersections: &[Intersection],
    ) -> Result<Self, InvalidInputError> {
        let origin: Point<f64> = tower.into();

        let rows = intersections
            .iter()
            .map(|i| FetchRow {
                azimuth: i.azimuth,
                fetch: Geodesic::distance(origin, Point::from(i.point)),
            })
            .collect();

        Self::new(rows)
    }

    pub fn rows(&self) -> &[FetchRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the fetch distances without the azimuths.
    pub fn distances(&self) -> Vec<f64> {
        self.0.iter().map(|r| r.fetch).collect()
    }

    /// Write the table with the header `Azimuth,Fetch` and no index column.
    pub fn write_csv<W: Write>(&self, out: W) -> FetchResult<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);

        // The header goes out even for an empty table.
        wtr.write_record(["Azimuth", "Fetch"])?;
        for row in &self.0 {
            wtr.serialize(row)?;
        }
        wtr.flush()?;

        Ok(())
    }

    /// Save the table to a file, see [FetchTable::write_csv].
    pub fn save_csv<P: AsRef<Path>>(&self, pth: P) -> FetchResult<()> {
        let f = File::create(pth.as_ref())?;
        self.write_csv(BufWriter::new(f))?;

        log::info!("wrote {} rows to {}", self.len(), pth.as_ref().display());
        Ok(())
    }
}

/// Settings for [extract_fetch].
#[derive(Debug, Clone, Copy)]
pub struct ExtractionConfig {
    /// Transect spacing in degrees.
    pub azimuth_step: f64,
    /// Transect length in meters.
    pub transect_length: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            azimuth_step: DEFAULT_AZIMUTH_STEP,
            transect_length: DEFAULT_TRANSECT_LENGTH,
        }
    }
}

/// Everything computed while extracting a fetch table.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub transects: Vec<Transect>,
    pub intersections: DualIntersections,
    pub table: FetchTable,
}

/**
 * Derive the fetch distance for each azimuth from the region of interest.
 *
 * A transect is cast from the tower along each azimuth and intersected with the boundary in both
 * planar and spherical modes. The spherical intersections give the distances in the table, the
 * planar intersections are kept for overlaying on a map.
 *
 * # Errors
 * If the configuration is invalid or any transect fails to reach the boundary.
 */
pub fn extract_fetch(
    tower: Coord,
    roi: &RoiBoundary,
    config: ExtractionConfig,
) -> FetchResult<Extraction> {
    let transects = generate_transects(tower, config.azimuth_step, config.transect_length)?;

    let intersections = DualIntersections::compute(roi, &transects, config.transect_length)?;

    if let Some((azimuth, diff)) = intersections.max_disagreement() {
        log::info!(
            "largest planar/spherical disagreement is {:.2} m at azimuth {}",
            diff,
            azimuth
        );
    }

    let table = FetchTable::from_intersections(tower, &intersections.spherical)?;

    Ok(Extraction {
        transects,
        intersections,
        table,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_unordered_rows() {
        let rows = vec![
            FetchRow {
                azimuth: 0.0,
                fetch: 1.0,
            },
            FetchRow {
                azimuth: 0.0,
                fetch: 2.0,
            },
        ];
        assert!(FetchTable::new(rows).is_err());
    }

    #[test]
    fn test_csv_format() {
        let table = FetchTable::new(vec![
            FetchRow {
                azimuth: 0.0,
                fetch: 412.5,
            },
            FetchRow {
                azimuth: 5.0,
                fetch: 398.25,
            },
        ])
        .unwrap();

        let mut buf: Vec<u8> = vec![];
        table.write_csv(&mut buf).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Azimuth,Fetch\n0.0,412.5\n5.0,398.25\n"
        );

        let mut buf: Vec<u8> = vec![];
        FetchTable::new(vec![]).unwrap().write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Azimuth,Fetch\n");
    }

    #[test]
    fn test_geodesic_distances() {
        let tower = Coord::new(45.0, -120.0);
        let hits = [
            Intersection {
                azimuth: 0.0,
                point: Coord::new(45.001, -120.0),
            },
            Intersection {
                azimuth: 180.0,
                point: Coord::new(44.998, -120.0),
            },
        ];

        let table = FetchTable::from_intersections(tower, &hits).unwrap();

        // A degree of latitude at 45N is about 111,132 m on WGS84.
        assert!((table.rows()[0].fetch - 111.13).abs() < 0.05);
        assert!((table.rows()[1].fetch - 222.26).abs() < 0.1);
    }
}
