/*!
 * KML overlays for checking results by eye over satellite imagery.
 *
 * The overlays are built as `kml` documents in memory, they are only a few hundred placemarks at
 * most, and written out in one go.
 */

use crate::{
    coord::{great_circle_distance, Coord},
    intersect::Intersection,
    polygon::Reconstruction,
    report::Extraction,
    roi::RoiBoundary,
    FetchResult,
};
use kml::{
    types::{
        Coord as KmlCoord, Element, Geometry, Icon, IconStyle, LineString, LineStyle, LinearRing,
        Placemark, Point, PolyStyle, Polygon, Style,
    },
    Kml, KmlDocument, KmlWriter,
};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const TOWER_STYLE: &str = "tower";
const FETCH_STYLE: &str = "fetch";
const ROI_STYLE: &str = "roi";
const TRANSECT_STYLE: &str = "transect";
const PLANAR_STYLE: &str = "planar";
const SPHERICAL_STYLE: &str = "spherical";

const TOWER_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";
const HIT_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/shaded_dot.png";

/*-------------------------------------------------------------------------------------------------
 *                                     Building blocks
 *-----------------------------------------------------------------------------------------------*/
fn kml_coord(c: &Coord) -> KmlCoord {
    KmlCoord::new(c.lon, c.lat, None)
}

fn name_element(name: &str) -> Kml {
    Kml::Element(Element {
        name: "name".into(),
        content: Some(name.into()),
        ..Element::default()
    })
}

fn icon_style(href: &str, color: &str, scale: f64) -> IconStyle {
    IconStyle {
        scale,
        color: color.to_owned(),
        icon: Icon {
            href: href.to_owned(),
            ..Icon::default()
        },
        ..IconStyle::default()
    }
}

fn line_style(color: &str, width: f64) -> LineStyle {
    LineStyle {
        color: color.to_owned(),
        width,
        ..LineStyle::default()
    }
}

fn styles() -> Vec<Kml> {
    let style = |id: &str| Style {
        id: Some(id.to_owned()),
        ..Style::default()
    };

    vec![
        Kml::Style(Style {
            icon: Some(icon_style(TOWER_ICON, "ffffffff", 1.2)),
            ..style(TOWER_STYLE)
        }),
        Kml::Style(Style {
            line: Some(line_style("ff00ffff", 2.0)),
            poly: Some(PolyStyle {
                color: "4000ffff".to_owned(),
                fill: true,
                outline: true,
                ..PolyStyle::default()
            }),
            ..style(FETCH_STYLE)
        }),
        Kml::Style(Style {
            line: Some(line_style("ff0000ff", 2.0)),
            poly: Some(PolyStyle {
                fill: false,
                outline: true,
                ..PolyStyle::default()
            }),
            ..style(ROI_STYLE)
        }),
        Kml::Style(Style {
            line: Some(line_style("80ffffff", 1.0)),
            ..style(TRANSECT_STYLE)
        }),
        Kml::Style(Style {
            icon: Some(icon_style(HIT_ICON, "ff00ff00", 0.5)),
            ..style(PLANAR_STYLE)
        }),
        Kml::Style(Style {
            icon: Some(icon_style(HIT_ICON, "ffff0000", 0.5)),
            ..style(SPHERICAL_STYLE)
        }),
    ]
}

fn placemark(
    name: Option<String>,
    description: Option<String>,
    style: &str,
    geometry: Geometry,
) -> Kml {
    Kml::Placemark(Placemark {
        name,
        description,
        geometry: Some(geometry),
        style_url: Some(format!("#{}", style)),
        ..Placemark::default()
    })
}

fn folder(name: &str, elements: Vec<Kml>) -> Kml {
    let mut contents = Vec::with_capacity(elements.len() + 1);
    contents.push(name_element(name));
    contents.extend(elements);

    Kml::Folder {
        attrs: HashMap::new(),
        elements: contents,
    }
}

fn polygon(ring: &[Coord]) -> Geometry {
    Geometry::Polygon(Polygon {
        outer: LinearRing {
            coords: ring.iter().map(kml_coord).collect(),
            ..LinearRing::default()
        },
        tessellate: true,
        ..Polygon::default()
    })
}

fn line_string(coords: &[Coord]) -> Geometry {
    Geometry::LineString(LineString {
        coords: coords.iter().map(kml_coord).collect(),
        tessellate: true,
        ..LineString::default()
    })
}

fn point(c: &Coord) -> Geometry {
    Geometry::Point(Point::from(kml_coord(c)))
}

fn tower_placemark(tower: Coord) -> Kml {
    placemark(
        Some("Tower".to_owned()),
        Some(format!("{:.6}, {:.6}", tower.lat, tower.lon)),
        TOWER_STYLE,
        point(&tower),
    )
}

fn roi_placemark(roi: &RoiBoundary) -> Kml {
    placemark(
        Some("Region of interest".to_owned()),
        None,
        ROI_STYLE,
        polygon(roi.vertices()),
    )
}

fn hit_folder(name: &str, style: &str, tower: Coord, hits: &[Intersection]) -> Kml {
    let placemarks = hits
        .iter()
        .map(|hit| {
            let description = format!(
                "Azimuth: {}\u{b0}, great circle distance: {:.1} m",
                hit.azimuth,
                great_circle_distance(tower, hit.point)
            );
            placemark(
                Some(hit.azimuth.to_string()),
                Some(description),
                style,
                point(&hit.point),
            )
        })
        .collect();

    folder(name, placemarks)
}

fn document(name: &str, elements: Vec<Kml>) -> Kml {
    let mut contents = vec![name_element(name)];
    contents.extend(styles());
    contents.extend(elements);

    Kml::KmlDocument(KmlDocument {
        attrs: [("xmlns".to_owned(), KML_NAMESPACE.to_owned())]
            .into_iter()
            .collect(),
        elements: vec![Kml::Document {
            attrs: HashMap::new(),
            elements: contents,
        }],
        ..KmlDocument::default()
    })
}

/*-------------------------------------------------------------------------------------------------
 *                                        Overlays
 *-----------------------------------------------------------------------------------------------*/

/// The reconstructed fetch boundary around the tower, optionally with the ROI for reference.
pub fn reconstruction_overlay(
    tower: Coord,
    reconstruction: &Reconstruction<Coord>,
    roi: Option<&RoiBoundary>,
) -> Kml {
    let mut elements = vec![tower_placemark(tower)];

    if let Some(roi) = roi {
        elements.push(roi_placemark(roi));
    }

    let mut description = format!(
        "{} vertices, {} per sector",
        reconstruction.polygon.len(),
        reconstruction.per_sector
    );
    if let Some(warning) = reconstruction.warning {
        description.push_str(&format!(". Warning: {}", warning));
    }

    elements.push(placemark(
        Some("Fetch boundary".to_owned()),
        Some(description),
        FETCH_STYLE,
        polygon(reconstruction.polygon.vertices()),
    ));

    document("Fetch boundary reconstruction", elements)
}

/// The ROI, the transects clipped at their spherical intersections, and both sets of
/// intersection points.
pub fn extraction_overlay(tower: Coord, roi: &RoiBoundary, extraction: &Extraction) -> Kml {
    let transects = extraction
        .intersections
        .spherical
        .iter()
        .map(|hit| placemark(None, None, TRANSECT_STYLE, line_string(&[tower, hit.point])))
        .collect();

    let elements = vec![
        tower_placemark(tower),
        roi_placemark(roi),
        folder("Transects", transects),
        hit_folder(
            "Planar intersections",
            PLANAR_STYLE,
            tower,
            &extraction.intersections.planar,
        ),
        hit_folder(
            "Spherical intersections",
            SPHERICAL_STYLE,
            tower,
            &extraction.intersections.spherical,
        ),
    ];

    document("Fetch boundary extraction", elements)
}

/// Write a KML document, with an XML declaration, and flush the output.
pub fn write_kml<W: Write>(mut out: W, doc: &Kml) -> FetchResult<()> {
    out.write_all(XML_DECLARATION.as_bytes())?;
    KmlWriter::from_writer(&mut out).write(doc)?;
    out.flush()?;

    Ok(())
}

/// Save a KML document to a file, any failure to write the whole file is returned.
pub fn save_kml<P: AsRef<Path>>(pth: P, doc: &Kml) -> FetchResult<()> {
    let f = File::create(pth.as_ref())?;
    let mut out = BufWriter::new(f);
    write_kml(&mut out, doc)?;
    out.into_inner()?.sync_all()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fetch::FetchVector, polygon::reconstruct_geographic, projection::*, report::extract_fetch,
        report::ExtractionConfig,
    };

    fn square(center: Coord, half: f64) -> RoiBoundary {
        RoiBoundary::new(vec![
            Coord::new(center.lat - half, center.lon - half),
            Coord::new(center.lat - half, center.lon + half),
            Coord::new(center.lat + half, center.lon + half),
            Coord::new(center.lat + half, center.lon - half),
        ])
        .unwrap()
    }

    #[test]
    fn test_reconstruction_overlay_reads_back() {
        let tower = Coord::new(45.0, -120.0);
        let fetch = FetchVector::new(vec![453.0, 489.0, 469.0, 455.0]).unwrap();
        let proj = UtmProjection::new(UtmZone::containing(tower)).unwrap();
        let rec = reconstruct_geographic(tower, &fetch, 1.0, &proj).unwrap();

        let mut buf: Vec<u8> = vec![];
        write_kml(&mut buf, &reconstruction_overlay(tower, &rec, None)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains(KML_NAMESPACE));
        assert_eq!(text.matches("<Placemark>").count(), 2);
        assert!(text.contains("<styleUrl>#fetch</styleUrl>"));

        // The boundary is the only polygon, so it reads back as a region of interest.
        let back = RoiBoundary::from_kml_str(&text).unwrap();
        assert_eq!(back.vertices().len(), 365);
        assert_eq!(back.vertices(), rec.polygon.vertices());
    }

    #[test]
    fn test_reconstruction_overlay_with_roi() {
        let tower = Coord::new(45.0, -120.0);
        let fetch = FetchVector::new(vec![453.0, 489.0, 469.0, 455.0]).unwrap();
        let proj = UtmProjection::new(UtmZone::containing(tower)).unwrap();
        let rec = reconstruct_geographic(tower, &fetch, 1.0, &proj).unwrap();
        let roi = square(tower, 0.01);

        let mut buf: Vec<u8> = vec![];
        write_kml(&mut buf, &reconstruction_overlay(tower, &rec, Some(&roi))).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.matches("<Placemark>").count(), 3);
        assert_eq!(RoiBoundary::from_kml_str(&text).unwrap(), roi);
    }

    #[test]
    fn test_extraction_overlay_has_every_hit() {
        let tower = Coord::new(45.0, -120.0);
        let roi = square(tower, 0.01);
        let extraction = extract_fetch(tower, &roi, ExtractionConfig::default()).unwrap();

        let mut buf: Vec<u8> = vec![];
        write_kml(&mut buf, &extraction_overlay(tower, &roi, &extraction)).unwrap();
        let text = String::from_utf8(buf).unwrap();

        // tower + ROI + 72 transects + 72 planar + 72 spherical
        assert_eq!(text.matches("<Placemark>").count(), 2 + 3 * 72);
        assert_eq!(text.matches("<Folder>").count(), 3);
        assert_eq!(text.matches("<styleUrl>#planar</styleUrl>").count(), 72);
    }

    #[test]
    fn test_save_reports_failure() {
        let tower = Coord::new(45.0, -120.0);
        let fetch = FetchVector::new(vec![453.0, 489.0, 469.0]).unwrap();
        let proj = UtmProjection::new(UtmZone::containing(tower)).unwrap();
        let rec = reconstruct_geographic(tower, &fetch, 1.0, &proj).unwrap();
        let doc = reconstruction_overlay(tower, &rec, None);

        let mut bad = std::env::temp_dir();
        bad.push(format!("fetchbound-missing-{}", std::process::id()));
        bad.push("overlay.kml");
        assert!(save_kml(&bad, &doc).is_err());

        let mut good = std::env::temp_dir();
        good.push(format!("fetchbound-overlay-{}.kml", std::process::id()));
        save_kml(&good, &doc).unwrap();
        let text = std::fs::read_to_string(&good).unwrap();
        assert!(text.trim_end().ends_with("</kml>"));
        let _ = std::fs::remove_file(&good);
    }
}
