/*!
 * Subdivide the sectors of a fetch vector into a denser set of angle samples.
 */

use crate::{error::InvalidInputError, fetch::FetchVector};
use std::fmt::{self, Display};

/// Slack when counting how many steps fit in a sector, so 90 / 0.1 counts 900 steps, not 899.
const STEP_COUNT_EPS: f64 = 1.0e-9;

/// Upper limit on the total number of samples, a 0.0001 degree step around the full circle is
/// well under this.
const MAX_SAMPLES: usize = 10_000_000;

/**
 * The subdivision step is coarser than the angular resolution of the fetch vector.
 *
 * This is not fatal. The reconstruction goes ahead with the requested step, but the polygon will
 * have fewer vertices than the fetch vector has sectors and may not be a faithful (or even simple)
 * representation of the boundary.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionWarning {
    /// The requested subdivision step in degrees.
    pub requested: f64,
    /// The angular resolution of the fetch vector, 360 / N, in degrees.
    pub resolution: f64,
}

impl Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "subdivision step {}\u{b0} is coarser than the fetch angular resolution {}\u{b0}",
            self.requested, self.resolution
        )
    }
}

/// Parallel sequences of angles and distances produced by [AngleSamples::generate].
#[derive(Debug, Clone)]
pub struct AngleSamples {
    /// Azimuths in degrees clockwise from north.
    angles: Vec<f64>,
    /// Distance in meters for the matching azimuth.
    distances: Vec<f64>,
    /// Number of samples generated for each original sector.
    per_sector: usize,
    /// Set if the subdivision step was too coarse.
    warning: Option<ResolutionWarning>,
}

impl AngleSamples {
    /**
     * Subdivide each sector of the fetch vector into steps of `step` degrees.
     *
     * For the sector centered on azimuth `a_k = k * res`, where `res = 360 / N`, the angles run
     * from `a_k - res / 2` to `a_k + res / 2` inclusive. Each original distance is repeated once
     * for every angle in its sector, in input order.
     *
     * If `step > res` a [ResolutionWarning] is logged and kept with the samples, but the step is
     * honored as given. A step exactly equal to `res` does not warn.
     *
     * # Errors
     * If `step` is not a finite positive number, or it is so small the samples would number more
     * than ten million.
     */
    pub fn generate(boundary: &FetchVector, step: f64) -> Result<Self, InvalidInputError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(InvalidInputError::new(format!(
                "subdivision step must be a positive number, found {}",
                step
            )));
        }

        let resolution = boundary.angular_resolution();

        let warning = if step > resolution {
            let warning = ResolutionWarning {
                requested: step,
                resolution,
            };
            log::warn!("{}", warning);
            Some(warning)
        } else {
            None
        };

        let steps = (resolution / step + STEP_COUNT_EPS).floor();
        if (steps + 1.0) * boundary.len() as f64 > MAX_SAMPLES as f64 {
            return Err(InvalidInputError::new(format!(
                "subdivision step {}\u{b0} would need more than {} samples",
                step, MAX_SAMPLES
            )));
        }

        let per_sector = steps as usize + 1;
        let half_width = resolution / 2.0;

        let total = per_sector * boundary.len();
        let mut angles = Vec::with_capacity(total);
        let mut distances = Vec::with_capacity(total);

        for (azimuth, distance) in boundary.iter() {
            let start = azimuth - half_width;
            for i in 0..per_sector {
                angles.push(start + i as f64 * step);
                distances.push(distance);
            }
        }

        log::debug!(
            "generated {} angle samples, {} per sector, from {} fetch distances",
            angles.len(),
            per_sector,
            boundary.len()
        );

        Ok(AngleSamples {
            angles,
            distances,
            per_sector,
            warning,
        })
    }

    /// Azimuths of the samples, in degrees.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Distances of the samples, in meters.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Number of samples in each of the original sectors.
    pub fn per_sector(&self) -> usize {
        self.per_sector
    }

    /// The total number of samples.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// The warning raised during sampling, if any.
    pub fn warning(&self) -> Option<ResolutionWarning> {
        self.warning
    }

    /// Iterate over (azimuth, distance) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.angles
            .iter()
            .copied()
            .zip(self.distances.iter().copied())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fetch(v: &[f64]) -> FetchVector {
        FetchVector::new(v.to_vec()).unwrap()
    }

    #[test]
    fn test_sector_edges_are_inclusive() {
        let samples = AngleSamples::generate(&fetch(&[453.0, 489.0, 469.0, 455.0]), 1.0).unwrap();

        assert_eq!(samples.per_sector(), 91);
        assert_eq!(samples.len(), 364);
        assert_eq!(samples.angles()[0], -45.0);
        assert_eq!(samples.angles()[90], 45.0);
        assert_eq!(samples.angles()[91], 45.0);
        assert_eq!(samples.angles()[363], 315.0);
        assert!(samples.warning().is_none());
    }

    #[test]
    fn test_distances_repeat_in_order() {
        let boundary = [150.0, 300.0, 225.0];
        let samples = AngleSamples::generate(&fetch(&boundary), 7.0).unwrap();

        // 120 / 7 = 17.14 -> 17 steps + 1 for the inclusive end
        let per_sector = 18;
        assert_eq!(samples.per_sector(), per_sector);
        assert_eq!(samples.angles().len(), samples.distances().len());

        for (k, chunk) in samples.distances().chunks(per_sector).enumerate() {
            assert!(chunk.iter().all(|d| *d == boundary[k]));
        }
    }

    #[test]
    fn test_fractional_step_counts_exactly() {
        let samples = AngleSamples::generate(&fetch(&[100.0, 100.0, 100.0, 100.0]), 0.1).unwrap();
        assert_eq!(samples.per_sector(), 901);
    }

    #[test]
    fn test_warning_only_when_coarser() {
        let boundary = fetch(&[150.0, 300.0]);

        assert!(AngleSamples::generate(&boundary, 1.0)
            .unwrap()
            .warning()
            .is_none());
        assert!(AngleSamples::generate(&boundary, 180.0)
            .unwrap()
            .warning()
            .is_none());

        let coarse = AngleSamples::generate(&boundary, 200.0).unwrap();
        assert_eq!(
            coarse.warning(),
            Some(ResolutionWarning {
                requested: 200.0,
                resolution: 180.0
            })
        );
        // Honored as given, no auto-correction.
        assert_eq!(coarse.per_sector(), 1);
    }

    #[test]
    fn test_rejects_bad_step() {
        let boundary = fetch(&[150.0, 300.0]);
        assert!(AngleSamples::generate(&boundary, 0.0).is_err());
        assert!(AngleSamples::generate(&boundary, -1.0).is_err());
        assert!(AngleSamples::generate(&boundary, f64::NAN).is_err());
        assert!(AngleSamples::generate(&boundary, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_step_too_small_to_sample() {
        let boundary = fetch(&[150.0, 300.0, 220.0, 199.0]);
        assert!(AngleSamples::generate(&boundary, 1.0e-15).is_err());
        assert!(AngleSamples::generate(&boundary, f64::MIN_POSITIVE).is_err());

        // A thousandth of a degree is still fine.
        let fine = AngleSamples::generate(&boundary, 1.0e-3).unwrap();
        assert_eq!(fine.per_sector(), 90_001);
    }
}
