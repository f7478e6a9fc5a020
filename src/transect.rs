/*!
 * Radial transects from the tower.
 */

use crate::{coord::Coord, error::InvalidInputError};
use geo::{Destination, Haversine, Point};

/// Default length of a transect, 1,000 km is far beyond any reasonable ROI.
pub const DEFAULT_TRANSECT_LENGTH: f64 = 1_000_000.0;

/// Default spacing of the transects in degrees.
pub const DEFAULT_AZIMUTH_STEP: f64 = 5.0;

/**
 * A great circle segment from the tower out along an azimuth.
 *
 * The end point is computed on a spherical earth, which is the same model the spherical mode of
 * the intersection uses, so the transect is exactly the great circle arc between the end points.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transect {
    /// Degrees clockwise from north.
    pub azimuth: f64,
    pub start: Coord,
    pub end: Coord,
}

/**
 * Build one transect per azimuth, `0, step, 2 * step, ...` up to but not including 360.
 *
 * # Errors
 * If `step` does not divide 360 evenly or `transect_length` is not positive.
 */
pub fn generate_transects(
    tower: Coord,
    step: f64,
    transect_length: f64,
) -> Result<Vec<Transect>, InvalidInputError> {
    const TOLERANCE: f64 = 1.0e-9;

    if !tower.is_valid() {
        return Err(InvalidInputError::new(format!(
            "invalid tower location: {},{}",
            tower.lat, tower.lon
        )));
    }

    if !transect_length.is_finite() || transect_length <= 0.0 {
        return Err(InvalidInputError::new(format!(
            "transect length must be positive, found {}",
            transect_length
        )));
    }

    if !step.is_finite() || step <= 0.0 || step > 360.0 {
        return Err(InvalidInputError::new(format!(
            "azimuth step must be in (0, 360], found {}",
            step
        )));
    }

    let count = (360.0 / step).round();
    if (count * step - 360.0).abs() > TOLERANCE {
        return Err(InvalidInputError::new(format!(
            "azimuth step {} does not divide 360 evenly",
            step
        )));
    }

    let origin: Point<f64> = tower.into();
    let transects: Vec<Transect> = (0..count as usize)
        .map(|i| {
            let azimuth = i as f64 * step;
            let end = Haversine::destination(origin, azimuth, transect_length);
            Transect {
                azimuth,
                start: tower,
                end: end.into(),
            }
        })
        .collect();

    log::debug!(
        "generated {} transects of {} m every {} degrees",
        transects.len(),
        transect_length,
        step
    );

    Ok(transects)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::great_circle_distance;

    #[test]
    fn test_default_fan() {
        let tower = Coord::new(45.0, -120.0);
        let transects =
            generate_transects(tower, DEFAULT_AZIMUTH_STEP, DEFAULT_TRANSECT_LENGTH).unwrap();

        assert_eq!(transects.len(), 72);
        for (i, t) in transects.iter().enumerate() {
            assert_eq!(t.azimuth, i as f64 * 5.0);
            assert_eq!(t.start, tower);

            let len = great_circle_distance(t.start, t.end);
            assert!((len - DEFAULT_TRANSECT_LENGTH).abs() < 1.0, "{}", len);
        }

        // Due north stays on the meridian.
        assert!((transects[0].end.lon - tower.lon).abs() < 1.0e-9);
        assert!(transects[0].end.lat > tower.lat);
        // Due south likewise.
        assert!((transects[36].end.lon - tower.lon).abs() < 1.0e-9);
        assert!(transects[36].end.lat < tower.lat);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let tower = Coord::new(45.0, -120.0);
        assert!(generate_transects(tower, 7.0, 1000.0).is_err());
        assert!(generate_transects(tower, 0.0, 1000.0).is_err());
        assert!(generate_transects(tower, 5.0, 0.0).is_err());
        assert!(generate_transects(Coord::new(100.0, 0.0), 5.0, 1000.0).is_err());
        assert_eq!(generate_transects(tower, 360.0, 1000.0).unwrap().len(), 1);
    }
}
