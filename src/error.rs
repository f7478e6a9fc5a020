use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Result type used throughout the crate.
pub type FetchResult<T> = Result<T, Box<dyn Error>>;

/// A polygon needs at least 3 distinct vertices before it can be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientVerticesError {
    /// The number of distinct vertices that were supplied.
    pub distinct: usize,
}

impl Display for InsufficientVerticesError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "a polygon requires at least 3 distinct vertices, only {} supplied",
            self.distinct
        )
    }
}

impl Error for InsufficientVerticesError {}

/// One or more transects never crossed the region of interest boundary.
///
/// This means the transects were too short or the boundary is malformed (e.g. the tower is
/// outside of it). All of the missed azimuths are reported, not just the first.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionMissError {
    /// Azimuths, in degrees, of every transect that missed.
    pub azimuths: Vec<f64>,
    /// The transect length in meters that was used.
    pub transect_length: f64,
}

impl Display for IntersectionMissError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{} transect(s) did not reach the boundary within {} m, azimuths: ",
            self.azimuths.len(),
            self.transect_length
        )?;

        for (i, az) in self.azimuths.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", az)?;
        }

        Ok(())
    }
}

impl Error for IntersectionMissError {}

/// Input data or a configuration value is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInputError {
    pub msg: String,
}

impl InvalidInputError {
    pub(crate) fn new<S: Into<String>>(msg: S) -> Self {
        InvalidInputError { msg: msg.into() }
    }
}

impl Display for InvalidInputError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for InvalidInputError {}
