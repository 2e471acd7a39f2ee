//! Navigation mesh optimization.
//!
//! Turns a raw triangulated navigation mesh, as exported by a level editor,
//! into a clean mesh for runtime pathfinding:
//! - Near-coincident vertices are merged
//! - Triangles get shared-edge neighbor lists
//! - Only the part reachable from a known "clean point" is kept
//! - Holes left by that cut are re-triangulated
//! - Every shared edge gets a passage width
//!
//! All 2D decisions are taken on the XZ plane; Y is height.
//!
//! # Layer 0
//!
//! No I/O and no global state. Loading meshes from disk lives in
//! `navmesh-io`.
//!
//! # Example
//!
//! ```
//! use navmesh_optimize::{OptimizeParams, optimize_with_params};
//! use nalgebra::Point3;
//!
//! // A unit square and a far-away triangle that nothing connects to.
//! let vertices = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(50.0, 0.0, 50.0),
//!     Point3::new(51.0, 0.0, 50.0),
//!     Point3::new(50.0, 0.0, 51.0),
//! ];
//! let indices = [0, 1, 2, 0, 2, 3, 4, 5, 6];
//!
//! let params = OptimizeParams::default();
//! let mesh = optimize_with_params(&Point3::new(0.5, 0.0, 0.5), &vertices, &indices, &params).unwrap();
//!
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.triangle_count(), 2);
//! println!("{}", mesh.summary());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
pub mod border;
pub mod connectivity;
pub mod dedup;
mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod holes;
mod optimize;
mod params;
mod result;
mod validate;

pub use adjacency::TriangleAdjacency;
pub use error::{OptimizeError, OptimizeResult};
pub use optimize::{optimize, optimize_with_params};
pub use params::OptimizeParams;
pub use result::{NavMeshOptimized, OptimizeSummary};
pub use validate::{NavMeshReport, validate_navmesh};

// Re-export commonly used items from submodules
pub use border::set_border_widths;
pub use connectivity::{ConnectedMesh, extract_connected, find_seed_vertex};
pub use dedup::{DedupResult, dedup_vertices};
pub use graph::{NavTriangle, TriangleGraph};
pub use grid::{GridCell, SpatialGrid};
pub use holes::{HoleFillResult, fill_holes, relax_vertices};
