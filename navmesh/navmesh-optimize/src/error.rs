//! Error types for navigation mesh optimization.

use thiserror::Error;

/// Result type for optimization operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur while optimizing a navigation mesh.
///
/// Degenerate geometry never shows up here: collapsed or out-of-range
/// triangles are dropped, parallel segments count as "no intersection".
/// Only conditions that leave the pipeline without anything to work on are
/// reported.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The flat index list does not describe whole triangles.
    #[error("index count {count} is not a multiple of 3")]
    InvalidIndexCount {
        /// Length of the index list.
        count: usize,
    },

    /// The optimization parameters are inconsistent.
    #[error("invalid optimization parameters: {reason}")]
    InvalidParams {
        /// Which check failed.
        reason: String,
    },

    /// No triangle can be reached from the clean point.
    ///
    /// Raised when no vertex belongs to a triangle with at least one
    /// neighbor, so there is nothing to seed the traversal with.
    #[error(
        "no reachable mesh: none of {triangle_count} triangles over {vertex_count} vertices has a neighbor"
    )]
    NoReachableMesh {
        /// Vertex count after deduplication.
        vertex_count: usize,
        /// Triangle count after deduplication.
        triangle_count: usize,
    },

    /// The clean point is too far away from every candidate seed vertex.
    #[error("clean point is {distance} away from the mesh (max {max_distance})")]
    CleanPointOutOfRange {
        /// Distance to the nearest candidate vertex.
        distance: f64,
        /// Configured maximum seed distance.
        max_distance: f64,
    },
}
