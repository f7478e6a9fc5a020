/*!
 * Rebuild a fetch boundary polygon from a fetch vector.
 *
 * The fetch vector is subdivided with [AngleSamples], every sample is offset from the tower with
 * [polar_to_cartesian], and the resulting ring is closed with [Polygon::close_ring]. Working in
 * a projected (UTM) plane keeps the offsets in meters; [reconstruct_geographic] handles the trip
 * into and back out of that plane.
 */

use crate::{
    coord::{Coord, PlanarCoord},
    error::InsufficientVerticesError,
    fetch::FetchVector,
    projection::UtmProjection,
    sampler::{AngleSamples, ResolutionWarning},
    FetchResult,
};

/**
 * Offset a point by `distance` along a compass `azimuth`.
 *
 * The azimuth is in degrees clockwise from north, so azimuth 0 maps to +y and azimuth 90 maps
 * to +x.
 */
pub fn polar_to_cartesian(origin: PlanarCoord, distance: f64, azimuth: f64) -> PlanarCoord {
    let theta = std::f64::consts::FRAC_PI_2 - azimuth.to_radians();

    PlanarCoord {
        x: distance * theta.cos() + origin.x,
        y: distance * theta.sin() + origin.y,
    }
}

/// A closed ring of vertices, the first and last vertex are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<C> {
    vertices: Vec<C>,
}

impl<C: Copy + PartialEq> Polygon<C> {
    /**
     * Close an ordered list of vertices into a polygon by repeating the first vertex at the end.
     *
     * No de-duplication is done and the ring is not checked for self intersection.
     *
     * # Errors
     * If there are fewer than 3 distinct vertices.
     */
    pub fn close_ring(mut vertices: Vec<C>) -> Result<Self, InsufficientVerticesError> {
        let distinct = count_distinct(&vertices, 3);
        if distinct < 3 {
            return Err(InsufficientVerticesError { distinct });
        }

        let first = vertices[0];
        vertices.push(first);

        Ok(Polygon { vertices })
    }

    /// All the vertices, including the closing vertex.
    pub fn vertices(&self) -> &[C] {
        &self.vertices
    }

    /// The number of vertices, including the closing vertex.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false, a polygon has at least 4 vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Transform every vertex, keeping the ring closed, stopping at the first failure.
    pub fn try_map<D, E, F>(&self, f: F) -> Result<Polygon<D>, E>
    where
        F: FnMut(&C) -> Result<D, E>,
    {
        let vertices = self.vertices.iter().map(f).collect::<Result<Vec<D>, E>>()?;
        Ok(Polygon { vertices })
    }
}

/// Count distinct values, stopping early once `enough` have been found.
fn count_distinct<C: PartialEq>(vertices: &[C], enough: usize) -> usize {
    let mut seen: Vec<&C> = Vec::with_capacity(enough);
    for v in vertices {
        if !seen.contains(&v) {
            seen.push(v);
            if seen.len() >= enough {
                break;
            }
        }
    }

    seen.len()
}

/// The outcome of rebuilding a boundary.
#[derive(Debug, Clone)]
pub struct Reconstruction<C> {
    pub polygon: Polygon<C>,
    /// Number of vertices contributed by each fetch sector.
    pub per_sector: usize,
    /// Set if the subdivision step was coarser than the fetch resolution.
    pub warning: Option<ResolutionWarning>,
}

/**
 * Rebuild the boundary polygon around a planar `origin`.
 *
 * # Arguments
 * origin - the tower position on the plane.
 * boundary - the fetch distances in meters.
 * step - the subdivision step in degrees.
 */
pub fn reconstruct_boundary(
    origin: PlanarCoord,
    boundary: &FetchVector,
    step: f64,
) -> FetchResult<Reconstruction<PlanarCoord>> {
    let samples = AngleSamples::generate(boundary, step)?;

    let vertices: Vec<PlanarCoord> = samples
        .iter()
        .map(|(azimuth, distance)| polar_to_cartesian(origin, distance, azimuth))
        .collect();

    let polygon = Polygon::close_ring(vertices)?;

    log::info!(
        "reconstructed boundary with {} vertices from {} fetch distances",
        polygon.len(),
        boundary.len()
    );

    Ok(Reconstruction {
        polygon,
        per_sector: samples.per_sector(),
        warning: samples.warning(),
    })
}

/// Rebuild the boundary polygon around a tower given in geographic coordinates.
///
/// The tower is projected into `projection`, the polygon is built in that plane, and every
/// vertex is transformed back to geographic coordinates.
pub fn reconstruct_geographic(
    tower: Coord,
    boundary: &FetchVector,
    step: f64,
    projection: &UtmProjection,
) -> FetchResult<Reconstruction<Coord>> {
    let origin = projection.forward(tower)?;
    log::debug!(
        "tower {:.6},{:.6} -> UTM {} {:.1}E {:.1}N",
        tower.lat,
        tower.lon,
        projection.zone(),
        origin.x,
        origin.y
    );

    let Reconstruction {
        polygon,
        per_sector,
        warning,
    } = reconstruct_boundary(origin, boundary, step)?;

    Ok(Reconstruction {
        polygon: polygon.try_map(|v| projection.inverse(*v))?,
        per_sector,
        warning,
    })
}
