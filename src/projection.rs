/*!
 * Universal Transverse Mercator projection on the WGS84 ellipsoid.
 *
 * The transforms themselves are done by `proj4rs`, this module only picks the zone and builds the
 * projection definitions.
 */

use crate::{
    coord::{Coord, PlanarCoord},
    error::InvalidInputError,
    FetchResult,
};
use proj4rs::{proj::Proj, transform::transform};
use strum::{Display, IntoStaticStr};

const GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Which hemisphere's false northing a UTM zone uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum Hemisphere {
    #[strum(serialize = "N")]
    North,
    #[strum(serialize = "S")]
    South,
}

/// A 6° UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}{}", self.number, self.hemisphere)
    }
}

impl UtmZone {
    /// Create a zone, the zone number must be in 1 to 60 inclusive.
    pub fn new(number: u8, hemisphere: Hemisphere) -> Result<Self, InvalidInputError> {
        if !(1..=60).contains(&number) {
            return Err(InvalidInputError::new(format!(
                "UTM zone must be between 1 and 60, found {}",
                number
            )));
        }

        Ok(UtmZone { number, hemisphere })
    }

    /// The standard zone containing this coordinate.
    ///
    /// The Norway and Svalbard exceptions are not applied.
    pub fn containing(coord: Coord) -> Self {
        let number = (((coord.lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1;
        let hemisphere = if coord.lat < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        };

        UtmZone {
            number: number as u8,
            hemisphere,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }

    /// The proj definition string for this zone.
    pub fn proj_string(&self) -> String {
        match self.hemisphere {
            Hemisphere::North => format!(
                "+proj=utm +zone={} +datum=WGS84 +units=m +no_defs",
                self.number
            ),
            Hemisphere::South => format!(
                "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
                self.number
            ),
        }
    }
}

/// Transforms between geographic coordinates and a single UTM zone.
pub struct UtmProjection {
    zone: UtmZone,
    geographic: Proj,
    utm: Proj,
}

impl UtmProjection {
    pub fn new(zone: UtmZone) -> FetchResult<Self> {
        let geographic = Proj::from_proj_string(GEOGRAPHIC)?;
        let utm = Proj::from_proj_string(&zone.proj_string())?;

        Ok(UtmProjection {
            zone,
            geographic,
            utm,
        })
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Project a geographic coordinate to easting (x) and northing (y) in meters.
    pub fn forward(&self, coord: Coord) -> FetchResult<PlanarCoord> {
        let mut pnt = (coord.lon.to_radians(), coord.lat.to_radians(), 0.0);
        transform(&self.geographic, &self.utm, &mut pnt)?;

        Ok(PlanarCoord::new(pnt.0, pnt.1))
    }

    /// Transform an easting (x) and northing (y) in this zone back to a geographic coordinate.
    pub fn inverse(&self, pnt: PlanarCoord) -> FetchResult<Coord> {
        let mut pnt = (pnt.x, pnt.y, 0.0);
        transform(&self.utm, &self.geographic, &mut pnt)?;

        Ok(Coord::new(pnt.1.to_degrees(), pnt.0.to_degrees()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zone_containing() {
        let z = UtmZone::containing(Coord::new(45.0, -123.0));
        assert_eq!(z.number(), 10);
        assert_eq!(z.hemisphere(), Hemisphere::North);
        assert_eq!(z.central_meridian(), -123.0);

        let z = UtmZone::containing(Coord::new(-33.9, 18.4));
        assert_eq!(z.number(), 34);
        assert_eq!(z.hemisphere(), Hemisphere::South);
        assert_eq!(z.to_string(), "34S");

        assert_eq!(UtmZone::containing(Coord::new(0.0, 180.0)).number(), 1);
        assert_eq!(UtmZone::containing(Coord::new(0.0, -180.0)).number(), 1);
    }

    #[test]
    fn test_zone_range() {
        assert!(UtmZone::new(0, Hemisphere::North).is_err());
        assert!(UtmZone::new(61, Hemisphere::North).is_err());
        assert!(UtmZone::new(60, Hemisphere::South).is_ok());
    }

    #[test]
    fn test_proj_strings() {
        let north = UtmZone::new(10, Hemisphere::North).unwrap();
        assert_eq!(
            north.proj_string(),
            "+proj=utm +zone=10 +datum=WGS84 +units=m +no_defs"
        );

        let south = UtmZone::new(34, Hemisphere::South).unwrap();
        assert!(south.proj_string().contains("+zone=34 +south"));
    }

    #[test]
    fn test_central_meridian_and_equator() {
        let proj = UtmProjection::new(UtmZone::new(31, Hemisphere::North).unwrap()).unwrap();
        let p = proj.forward(Coord::new(0.0, 3.0)).unwrap();
        assert!((p.x - 500_000.0).abs() < 1.0e-3);
        assert!(p.y.abs() < 1.0e-3);
    }

    #[test]
    fn test_known_northing_on_central_meridian() {
        // Meridian arc length to 45N on WGS84 is 4,984,944.378 m, scaled by k0 = 0.9996.
        let proj = UtmProjection::new(UtmZone::new(10, Hemisphere::North).unwrap()).unwrap();
        let p = proj.forward(Coord::new(45.0, -123.0)).unwrap();
        assert!((p.x - 500_000.0).abs() < 1.0e-3);
        assert!((p.y - 4_984_944.378 * 0.9996).abs() < 0.05, "{}", p.y);
    }

    #[test]
    fn test_round_trip() {
        for &(lat, lon) in &[
            (45.123, -121.456),
            (-33.9, 18.4),
            (64.2, 25.9),
            (0.5, -0.5),
            (-12.0, 130.7),
        ] {
            let c = Coord::new(lat, lon);
            let proj = UtmProjection::new(UtmZone::containing(c)).unwrap();
            let back = proj.inverse(proj.forward(c).unwrap()).unwrap();
            assert!(c.is_close(back, 1.0e-8), "{:?} != {:?}", c, back);
        }
    }

    #[test]
    fn test_southern_false_northing() {
        let proj = UtmProjection::new(UtmZone::new(34, Hemisphere::South).unwrap()).unwrap();
        let p = proj.forward(Coord::new(-1.0e-9, 21.0)).unwrap();
        assert!((p.y - 10_000_000.0).abs() < 0.01);
    }

    #[test]
    fn test_grid_distance_close_to_ground_distance() {
        let c = Coord::new(40.0, -105.0);
        let proj = UtmProjection::new(UtmZone::containing(c)).unwrap();
        let p = proj.forward(c).unwrap();
        let north = proj.forward(Coord::new(40.001, -105.0)).unwrap();

        // ~111 m, scale factor near the central meridian is within a few parts in 10,000
        let ground = crate::coord::great_circle_distance(c, Coord::new(40.001, -105.0));
        assert!((p.distance_to(north) - ground).abs() / ground < 0.005);
    }
}
