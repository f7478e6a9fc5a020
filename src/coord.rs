/*!
 * Coordinates and simple geographic calculations.
 *
 * The distance calculations are done with the `geo` crate, the unit vector conversions used for
 * great circle arc intersection are done here.
 */

use geo::{Distance, Haversine, Point};

/// A geographic coordinate on the WGS84 datum, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Create a new coordinate from a latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Coord { lat, lon }
    }

    /// Check that the latitude and longitude are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Are these two points within `eps` degrees of each other in both latitude and longitude.
    pub fn is_close(&self, other: Coord, eps: f64) -> bool {
        (self.lat - other.lat).abs() < eps && (self.lon - other.lon).abs() < eps
    }

    /// Unit vector pointing from the center of a spherical earth to this coordinate.
    pub(crate) fn to_unit_vector(self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }

    /// Inverse of `to_unit_vector`, the vector does not need to be normalized.
    pub(crate) fn from_vector(v: [f64; 3]) -> Self {
        let horiz = f64::hypot(v[0], v[1]);
        Coord {
            lat: f64::atan2(v[2], horiz).to_degrees(),
            lon: f64::atan2(v[1], v[0]).to_degrees(),
        }
    }
}

impl From<Coord> for Point<f64> {
    fn from(c: Coord) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Point<f64>> for Coord {
    fn from(p: Point<f64>) -> Self {
        Coord {
            lat: p.y(),
            lon: p.x(),
        }
    }
}

impl From<Coord> for geo::Coord<f64> {
    fn from(c: Coord) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl From<geo::Coord<f64>> for Coord {
    fn from(c: geo::Coord<f64>) -> Self {
        Coord { lat: c.y, lon: c.x }
    }
}

/// A coordinate on a projected plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarCoord {
    pub x: f64,
    pub y: f64,
}

impl PlanarCoord {
    pub fn new(x: f64, y: f64) -> Self {
        PlanarCoord { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance_to(&self, other: PlanarCoord) -> f64 {
        f64::hypot(other.x - self.x, other.y - self.y)
    }

    /// Compass bearing (degrees clockwise from +Y) from this point to `other`, in [0, 360).
    pub fn bearing_to(&self, other: PlanarCoord) -> f64 {
        let bearing = f64::atan2(other.x - self.x, other.y - self.y).to_degrees();
        bearing.rem_euclid(360.0)
    }
}

/**
 * The great circle distance on a spherical earth.
 *
 * #Arguments
 * * a - the first point.
 * * b - the second point.
 *
 * #Returns
 * The distance between the points in meters.
 */
pub fn great_circle_distance(a: Coord, b: Coord) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}
