/*!
 * Reconcile an eddy-covariance fetch boundary with a region of interest.
 *
 * There are two independent pipelines.
 *
 * Boundary extraction ([extract_fetch]) casts a fan of great circle transects from the tower,
 * finds where each first crosses the region of interest boundary, and reports the distance to
 * that crossing for every azimuth as a [FetchTable].
 *
 * Boundary reconstruction ([reconstruct_geographic]) goes the other way, it takes a
 * [FetchVector] of distances around the tower and rebuilds the boundary [Polygon] from it so it
 * can be laid over a map.
 */

pub use coord::{great_circle_distance, Coord, PlanarCoord};
pub use error::{FetchResult, InsufficientVerticesError, IntersectionMissError, InvalidInputError};
pub use fetch::FetchVector;
pub use intersect::{intersect_transects, DualIntersections, Intersection, IntersectionMode};
pub use overlay::{extraction_overlay, reconstruction_overlay, save_kml, write_kml};
pub use polygon::{
    polar_to_cartesian, reconstruct_boundary, reconstruct_geographic, Polygon, Reconstruction,
};
pub use projection::{Hemisphere, UtmProjection, UtmZone};
pub use report::{extract_fetch, Extraction, ExtractionConfig, FetchRow, FetchTable};
pub use roi::RoiBoundary;
pub use sampler::{AngleSamples, ResolutionWarning};
pub use transect::{generate_transects, Transect, DEFAULT_AZIMUTH_STEP, DEFAULT_TRANSECT_LENGTH};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod coord;
mod error;
mod fetch;
mod intersect;
mod overlay;
mod polygon;
mod projection;
mod report;
mod roi;
mod sampler;
mod transect;
