/*!
 * The region of interest boundary.
 */

use crate::{coord::Coord, error::InvalidInputError, FetchResult};
use geo::{Geometry, GeometryCollection, LineString};
use kml::Kml;
use std::path::Path;

/// A closed ring of geographic coordinates, the first and last coordinate are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiBoundary {
    ring: Vec<Coord>,
}

impl RoiBoundary {
    /**
     * Create a boundary from a ring of coordinates.
     *
     * If the ring is not closed, it will be. Elevation is never part of a [Coord], so nothing
     * needs stripping here.
     *
     * # Errors
     * If there are fewer than 3 distinct vertices or any coordinate is invalid.
     */
    pub fn new(mut ring: Vec<Coord>) -> Result<Self, InvalidInputError> {
        if let Some(bad) = ring.iter().find(|c| !c.is_valid()) {
            return Err(InvalidInputError::new(format!(
                "invalid coordinate in region of interest: {},{}",
                bad.lat, bad.lon
            )));
        }

        let mut distinct: Vec<Coord> = Vec::with_capacity(3);
        for c in &ring {
            if !distinct.contains(c) {
                distinct.push(*c);
                if distinct.len() == 3 {
                    break;
                }
            }
        }
        if distinct.len() < 3 {
            return Err(InvalidInputError::new(
                "region of interest needs at least 3 distinct vertices",
            ));
        }

        if ring.first() != ring.last() {
            let first = ring[0];
            ring.push(first);
        }

        Ok(RoiBoundary { ring })
    }

    /// Load the first polygon found in a KML file.
    pub fn from_kml<P: AsRef<Path>>(pth: P) -> FetchResult<Self> {
        let contents = std::fs::read_to_string(pth.as_ref())?;
        let roi = Self::from_kml_str(&contents)?;

        log::info!(
            "loaded region of interest with {} vertices from {}",
            roi.ring.len(),
            pth.as_ref().display()
        );

        Ok(roi)
    }

    /// Parse the first polygon (or closed line string) in a KML document.
    ///
    /// Any altitude values in the document are dropped.
    pub fn from_kml_str(contents: &str) -> FetchResult<Self> {
        let kml: Kml<f64> = contents.parse()?;
        let collection = GeometryCollection::try_from(kml)?;

        let mut rings = vec![];
        collect_rings(collection, &mut rings);

        let mut rings = rings.into_iter();
        let ring = rings
            .next()
            .ok_or_else(|| InvalidInputError::new("no polygon found in KML document"))?;

        let extra = rings.count();
        if extra > 0 {
            log::warn!(
                "KML document has {} additional polygon(s), only the first is used",
                extra
            );
        }

        let ring: Vec<Coord> = ring.coords().map(|c| Coord::from(*c)).collect();

        Ok(Self::new(ring)?)
    }

    /// All the vertices, including the closing vertex.
    pub fn vertices(&self) -> &[Coord] {
        &self.ring
    }

    /// Iterate over the edges of the ring as pairs of end points.
    pub fn edges(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.ring.windows(2).map(|w| (w[0], w[1]))
    }
}

fn collect_rings(collection: GeometryCollection<f64>, rings: &mut Vec<LineString<f64>>) {
    for geom in collection {
        match geom {
            Geometry::Polygon(poly) => {
                let (exterior, _interiors) = poly.into_inner();
                rings.push(exterior);
            }
            Geometry::MultiPolygon(mp) => {
                for poly in mp {
                    let (exterior, _interiors) = poly.into_inner();
                    rings.push(exterior);
                }
            }
            Geometry::LineString(ls) if ls.is_closed() && ls.0.len() > 3 => rings.push(ls),
            Geometry::GeometryCollection(inner) => collect_rings(inner, rings),
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ROI_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
<name>roi</name>
<Placemark>
<name>tower</name>
<Point><coordinates>-120.0,45.0,0</coordinates></Point>
</Placemark>
<Placemark>
<name>roi</name>
<Polygon>
<outerBoundaryIs>
<LinearRing>
<coordinates>
-120.01,44.99,512.5 -119.99,44.99,512.5 -119.99,45.01,512.5 -120.01,45.01,512.5 -120.01,44.99,512.5
</coordinates>
</LinearRing>
</outerBoundaryIs>
</Polygon>
</Placemark>
</Document>
</kml>
"#;

    #[test]
    fn test_closes_open_ring() {
        let roi = RoiBoundary::new(vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 1.0),
            Coord::new(1.0, 1.0),
        ])
        .unwrap();

        assert_eq!(roi.vertices().len(), 4);
        assert_eq!(roi.vertices().first(), roi.vertices().last());
        assert_eq!(roi.edges().count(), 3);
    }

    #[test]
    fn test_rejects_degenerate_ring() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 1.0);
        assert!(RoiBoundary::new(vec![a, b, a]).is_err());
        assert!(RoiBoundary::new(vec![a, b, Coord::new(91.0, 0.0)]).is_err());
    }

    #[test]
    fn test_from_kml_str() {
        let roi = RoiBoundary::from_kml_str(ROI_KML).unwrap();

        assert_eq!(roi.vertices().len(), 5);
        assert_eq!(roi.vertices()[0], Coord::new(44.99, -120.01));
        assert_eq!(roi.vertices()[2], Coord::new(45.01, -119.99));
    }

    #[test]
    fn test_from_kml_str_without_polygon() {
        let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Placemark>
<Point><coordinates>-120.0,45.0,0</coordinates></Point>
</Placemark></Document></kml>"#;

        assert!(RoiBoundary::from_kml_str(kml).is_err());
    }
}
