/*!
 * Find where each transect first crosses the region of interest boundary.
 *
 * There are two ways to do the geometry. In [IntersectionMode::Planar] longitude and latitude
 * are treated as x and y on a flat plane and edges are straight lines in that plane, which is
 * what a 2-D map plot draws. In [IntersectionMode::Spherical] every edge is a great circle arc on
 * the sphere, which is what gives accurate distances. The results differ slightly and both are
 * needed, so the mode is always passed explicitly.
 */

use crate::{
    coord::{great_circle_distance, Coord},
    error::IntersectionMissError,
    roi::RoiBoundary,
    transect::Transect,
};
use geo::{
    algorithm::line_intersection::{line_intersection, LineIntersection},
    Line,
};
use strum::{Display, EnumIter, IntoStaticStr};

/// Tolerance in radians for deciding a point lies on a great circle arc, about 6 mm.
const ARC_EPS: f64 = 1.0e-9;

/// How to do the intersection geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum IntersectionMode {
    /// Longitude and latitude as a flat plane, for plotting alignment.
    Planar,
    /// Great circle arcs on the sphere, for distance accuracy.
    Spherical,
}

/// Where a transect first crossed the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub azimuth: f64,
    pub point: Coord,
}

/**
 * Find the intersection nearest the tower for every transect.
 *
 * # Errors
 * If any transect does not cross the boundary. Every azimuth that missed is listed in the
 * [IntersectionMissError], there are no partial results.
 */
pub fn intersect_transects(
    boundary: &RoiBoundary,
    transects: &[Transect],
    mode: IntersectionMode,
    transect_length: f64,
) -> Result<Vec<Intersection>, IntersectionMissError> {
    let mut hits = Vec::with_capacity(transects.len());
    let mut missed = vec![];

    for transect in transects {
        let nearest = match mode {
            IntersectionMode::Planar => nearest_planar(boundary, transect),
            IntersectionMode::Spherical => nearest_spherical(boundary, transect),
        };

        match nearest {
            Some(point) => hits.push(Intersection {
                azimuth: transect.azimuth,
                point,
            }),
            None => missed.push(transect.azimuth),
        }
    }

    if !missed.is_empty() {
        return Err(IntersectionMissError {
            azimuths: missed,
            transect_length,
        });
    }

    log::debug!(
        "{} mode: {} transects intersected the boundary",
        Into::<&'static str>::into(mode),
        hits.len()
    );

    Ok(hits)
}

/// Intersections computed in both modes for the same transects.
#[derive(Debug, Clone)]
pub struct DualIntersections {
    pub planar: Vec<Intersection>,
    pub spherical: Vec<Intersection>,
}

impl DualIntersections {
    /// Run [intersect_transects] once in each mode.
    pub fn compute(
        boundary: &RoiBoundary,
        transects: &[Transect],
        transect_length: f64,
    ) -> Result<Self, IntersectionMissError> {
        let spherical = intersect_transects(
            boundary,
            transects,
            IntersectionMode::Spherical,
            transect_length,
        )?;
        let planar = intersect_transects(
            boundary,
            transects,
            IntersectionMode::Planar,
            transect_length,
        )?;

        Ok(DualIntersections { planar, spherical })
    }

    /// Get the results for one of the modes.
    pub fn get(&self, mode: IntersectionMode) -> &[Intersection] {
        match mode {
            IntersectionMode::Planar => &self.planar,
            IntersectionMode::Spherical => &self.spherical,
        }
    }

    /// The largest distance in meters between the planar and spherical point for an azimuth,
    /// along with that azimuth.
    pub fn max_disagreement(&self) -> Option<(f64, f64)> {
        self.planar
            .iter()
            .zip(self.spherical.iter())
            .map(|(p, s)| {
                debug_assert_eq!(p.azimuth, s.azimuth);
                let d = great_circle_distance(p.point, s.point);
                log::debug!("azimuth {:5.1}: modes differ by {:.3} m", p.azimuth, d);
                (p.azimuth, d)
            })
            .fold(None, |acc: Option<(f64, f64)>, (az, d)| match acc {
                Some((_, max_d)) if max_d >= d => acc,
                _ => Some((az, d)),
            })
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                          Planar
 *-----------------------------------------------------------------------------------------------*/
/// Shift a longitude by whole turns so it lies within 180 degrees of `reference`.
fn unwrap_lon(lon: f64, reference: f64) -> f64 {
    lon - 360.0 * ((lon - reference) / 360.0).round()
}

fn nearest_planar(boundary: &RoiBoundary, transect: &Transect) -> Option<Coord> {
    // Everything goes on the same longitude branch as the tower, so a transect or an edge that
    // crosses the antimeridian stays a short line instead of wrapping around the plane.
    let reference = transect.start.lon;
    let planar = |c: Coord| geo::Coord {
        x: unwrap_lon(c.lon, reference),
        y: c.lat,
    };

    let start = planar(transect.start);
    let ray = Line::new(start, planar(transect.end));

    let dist2 = |c: &geo::Coord<f64>| (c.x - start.x).powi(2) + (c.y - start.y).powi(2);

    let mut best: Option<(f64, geo::Coord<f64>)> = None;
    let mut consider = |c: geo::Coord<f64>| {
        let d = dist2(&c);
        if best.map(|(bd, _)| d < bd).unwrap_or(true) {
            best = Some((d, c));
        }
    };

    for (a, b) in boundary.edges() {
        let edge = Line::new(planar(a), planar(b));
        match line_intersection(ray, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => consider(intersection),
            Some(LineIntersection::Collinear { intersection }) => {
                consider(intersection.start);
                consider(intersection.end);
            }
            None => {}
        }
    }

    best.map(|(_, c)| Coord::new(c.y, unwrap_lon(c.x, 0.0)))
}

/*-------------------------------------------------------------------------------------------------
 *                                         Spherical
 *-----------------------------------------------------------------------------------------------*/
type Vec3 = [f64; 3];

fn cross(u: Vec3, v: Vec3) -> Vec3 {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn dot(u: Vec3, v: Vec3) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn norm(u: Vec3) -> f64 {
    dot(u, u).sqrt()
}

fn scale(u: Vec3, s: f64) -> Vec3 {
    [u[0] * s, u[1] * s, u[2] * s]
}

/// Angle in radians between two vectors, stable for small angles.
fn angle(u: Vec3, v: Vec3) -> f64 {
    f64::atan2(norm(cross(u, v)), dot(u, v))
}

/// Does the unit vector `p` lie on the minor arc from `a` to `b`.
fn on_arc(p: Vec3, a: Vec3, b: Vec3) -> bool {
    (angle(a, p) + angle(p, b) - angle(a, b)).abs() < ARC_EPS
}

/// Intersection points of the minor arcs a-b and c-d, there can be up to 2 if they overlap.
fn arc_intersections(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec<Vec3> {
    const PARALLEL_EPS: f64 = 1.0e-15;

    let n1 = cross(a, b);
    let n2 = cross(c, d);
    if norm(n1) < PARALLEL_EPS || norm(n2) < PARALLEL_EPS {
        // Zero length arc.
        return vec![];
    }

    let line = cross(n1, n2);
    let len = norm(line);
    if len < PARALLEL_EPS {
        // Both arcs lie on the same great circle.
        return [a, b, c, d]
            .into_iter()
            .filter(|p| on_arc(*p, a, b) && on_arc(*p, c, d))
            .collect();
    }

    let p = scale(line, 1.0 / len);
    [p, scale(p, -1.0)]
        .into_iter()
        .filter(|p| on_arc(*p, a, b) && on_arc(*p, c, d))
        .collect()
}

fn nearest_spherical(boundary: &RoiBoundary, transect: &Transect) -> Option<Coord> {
    let a = transect.start.to_unit_vector();
    let b = transect.end.to_unit_vector();

    boundary
        .edges()
        .flat_map(|(c, d)| arc_intersections(a, b, c.to_unit_vector(), d.to_unit_vector()))
        .map(|p| (angle(a, p), p))
        .fold(None, |acc: Option<(f64, Vec3)>, (ang, p)| match acc {
            Some((best, _)) if best <= ang => acc,
            _ => Some((ang, p)),
        })
        .map(|(_, p)| Coord::from_vector(p))
}
