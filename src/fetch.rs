/*!
 * The fetch vector, an ordered list of fetch distances around the tower.
 */

use crate::{error::InvalidInputError, report::FetchRow, FetchResult};
use std::{fs::File, io::Read, path::Path};

/**
 * An ordered sequence of N fetch distances in meters.
 *
 * The distances are implicitly associated with N equally spaced azimuths with the first value at
 * true north (azimuth 0) and proceeding clockwise.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct FetchVector(Vec<f64>);

impl FetchVector {
    /// Create a new fetch vector, checking that it is not empty and all the distances are positive.
    pub fn new(distances: Vec<f64>) -> Result<Self, InvalidInputError> {
        if distances.is_empty() {
            return Err(InvalidInputError::new("fetch vector is empty"));
        }

        if let Some((i, d)) = distances
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d <= 0.0)
        {
            return Err(InvalidInputError::new(format!(
                "fetch distance at index {} is not a positive number: {}",
                i, d
            )));
        }

        Ok(FetchVector(distances))
    }

    /// Load a fetch vector from a table with the header `Azimuth,Fetch`.
    ///
    /// The azimuths must start at 0 and be evenly spaced around the full circle.
    pub fn from_csv<P: AsRef<Path>>(pth: P) -> FetchResult<Self> {
        let f = File::open(pth.as_ref())?;
        Self::from_reader(f)
    }

    /// Parse a fetch table from any CSV source.
    ///
    /// Quoted fields, surrounding whitespace and blank lines are all accepted. The header names
    /// are matched without regard to case.
    pub fn from_reader<R: Read>(rdr: R) -> FetchResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let header = rdr.headers()?;
        if header.len() != 2
            || !header[0].eq_ignore_ascii_case("azimuth")
            || !header[1].eq_ignore_ascii_case("fetch")
        {
            return Err(InvalidInputError::new(format!(
                "expected header 'Azimuth,Fetch', found '{}'",
                header.iter().collect::<Vec<_>>().join(",")
            ))
            .into());
        }

        let mut azimuths = vec![];
        let mut distances = vec![];
        for record in rdr.records() {
            let FetchRow { azimuth, fetch } = record?.deserialize(None)?;
            azimuths.push(azimuth);
            distances.push(fetch);
        }

        check_azimuths(&azimuths)?;

        Ok(Self::new(distances)?)
    }

    /// The number of distances, N.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, an empty vector cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The angular width of each sector in degrees, 360 / N.
    pub fn angular_resolution(&self) -> f64 {
        360.0 / self.0.len() as f64
    }

    /// The azimuth in degrees associated with the distance at `index`.
    pub fn azimuth(&self, index: usize) -> f64 {
        index as f64 * self.angular_resolution()
    }

    /// Get the distances.
    pub fn distances(&self) -> &[f64] {
        &self.0
    }

    /// Iterate over (azimuth, distance) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(move |(i, d)| (self.azimuth(i), *d))
    }
}

fn check_azimuths(azimuths: &[f64]) -> Result<(), InvalidInputError> {
    const TOLERANCE: f64 = 1.0e-6;

    if azimuths.is_empty() {
        return Err(InvalidInputError::new("fetch table has no rows"));
    }

    let resolution = 360.0 / azimuths.len() as f64;
    for (i, az) in azimuths.iter().enumerate() {
        let expected = i as f64 * resolution;
        if (az - expected).abs() > TOLERANCE {
            return Err(InvalidInputError::new(format!(
                "fetch table azimuths must start at 0 and step by {}, row {} has azimuth {}",
                resolution,
                i + 1,
                az
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_empty_and_non_positive() {
        assert!(FetchVector::new(vec![]).is_err());
        assert!(FetchVector::new(vec![100.0, 0.0]).is_err());
        assert!(FetchVector::new(vec![100.0, -5.0]).is_err());
        assert!(FetchVector::new(vec![100.0, f64::NAN]).is_err());
        assert!(FetchVector::new(vec![100.0]).is_ok());
    }

    #[test]
    fn test_azimuths() {
        let fv = FetchVector::new(vec![453.0, 489.0, 469.0, 455.0]).unwrap();
        assert_eq!(fv.angular_resolution(), 90.0);

        let pairs: Vec<_> = fv.iter().collect();
        assert_eq!(
            pairs,
            vec![(0.0, 453.0), (90.0, 489.0), (180.0, 469.0), (270.0, 455.0)]
        );
    }

    #[test]
    fn test_from_reader() {
        let table = "Azimuth,Fetch\n0,150.5\n90,300\n180,220.25\n270,199\n";
        let fv = FetchVector::from_reader(table.as_bytes()).unwrap();
        assert_eq!(fv.distances(), &[150.5, 300.0, 220.25, 199.0]);
    }

    #[test]
    fn test_from_reader_quoted_header() {
        // As written by R's write.csv(..., row.names = FALSE)
        let table = "\"Azimuth\",\"Fetch\"\n0,453\n90,489\n180,469\n270,455\n";
        let fv = FetchVector::from_reader(table.as_bytes()).unwrap();
        assert_eq!(fv.distances(), &[453.0, 489.0, 469.0, 455.0]);

        let table = "azimuth , fetch\r\n\"0\",\"150.5\"\r\n\r\n180, 300\r\n";
        let fv = FetchVector::from_reader(table.as_bytes()).unwrap();
        assert_eq!(fv.distances(), &[150.5, 300.0]);
    }

    #[test]
    fn test_from_reader_rejects_bad_tables() {
        let bad_header = "Angle,Distance\n0,1\n180,2\n";
        assert!(FetchVector::from_reader(bad_header.as_bytes()).is_err());

        let uneven = "Azimuth,Fetch\n0,1\n100,2\n180,3\n270,4\n";
        assert!(FetchVector::from_reader(uneven.as_bytes()).is_err());

        let not_from_north = "Azimuth,Fetch\n5,1\n185,2\n";
        assert!(FetchVector::from_reader(not_from_north.as_bytes()).is_err());

        let no_rows = "Azimuth,Fetch\n";
        assert!(FetchVector::from_reader(no_rows.as_bytes()).is_err());

        let extra_column = "Azimuth,Fetch\n0,1,2\n";
        assert!(FetchVector::from_reader(extra_column.as_bytes()).is_err());

        let not_a_number = "Azimuth,Fetch\n0,far\n";
        assert!(FetchVector::from_reader(not_a_number.as_bytes()).is_err());

        assert!(FetchVector::from_reader("".as_bytes()).is_err());
    }
}
