//! The optimization pipeline.

use nalgebra::Point3;
use tracing::{info, info_span};

use crate::border::set_border_widths;
use crate::connectivity::extract_connected;
use crate::dedup::dedup_vertices;
use crate::error::{OptimizeError, OptimizeResult};
use crate::graph::TriangleGraph;
use crate::holes::{HoleFillResult, fill_holes};
use crate::params::OptimizeParams;
use crate::result::{NavMeshOptimized, OptimizeSummary};

/// Optimize a raw navigation mesh with default parameters.
///
/// See [`optimize_with_params`].
///
/// # Errors
///
/// Same as [`optimize_with_params`].
///
/// # Example
///
/// ```
/// use navmesh_optimize::optimize;
/// use nalgebra::Point3;
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 1.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let indices = [0, 1, 2, 0, 2, 3];
///
/// let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &vertices, &indices).unwrap();
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.triangle_count(), 2);
/// assert_eq!(mesh.triangles()[0].neighbors, vec![1]);
/// ```
pub fn optimize(
    clean_point: &Point3<f64>,
    vertices: &[Point3<f64>],
    indices: &[u32],
) -> OptimizeResult<NavMeshOptimized> {
    optimize_with_params(clean_point, vertices, indices, &OptimizeParams::default())
}

/// Optimize a raw navigation mesh.
///
/// Runs, in order:
/// 1. vertex deduplication ([`dedup_vertices`](crate::dedup_vertices))
/// 2. triangle graph construction ([`TriangleGraph::build`])
/// 3. extraction of the component reachable from `clean_point`
///    ([`extract_connected`](crate::extract_connected))
/// 4. hole filling, unless disabled ([`fill_holes`](crate::fill_holes))
/// 5. the final graph with border widths
///    ([`set_border_widths`](crate::set_border_widths))
///
/// Every stage works on the complete output of the previous one. The input
/// slices are not modified, so repeated runs are independent.
///
/// By default the clean point may be any distance from the mesh: the
/// nearest vertex with a connected triangle becomes the seed, even when it
/// is far from where the clean point was placed. Callers that want a
/// distant clean point to be fatal set
/// [`OptimizeParams::with_max_seed_distance`].
///
/// # Errors
///
/// - [`OptimizeError::InvalidParams`] if `params` fails validation
/// - [`OptimizeError::InvalidIndexCount`] if `indices.len()` is not a multiple of 3
/// - [`OptimizeError::NoReachableMesh`] if no triangle has a neighbor
/// - [`OptimizeError::CleanPointOutOfRange`] if `params.max_seed_distance` is exceeded
pub fn optimize_with_params(
    clean_point: &Point3<f64>,
    vertices: &[Point3<f64>],
    indices: &[u32],
    params: &OptimizeParams,
) -> OptimizeResult<NavMeshOptimized> {
    params.validate()?;
    if indices.len() % 3 != 0 {
        return Err(OptimizeError::InvalidIndexCount {
            count: indices.len(),
        });
    }

    let _span = info_span!(
        "optimize",
        vertices = vertices.len(),
        triangles = indices.len() / 3
    )
    .entered();

    info!(count = vertices.len(), "Start vertex count");

    let faces: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let dedup = dedup_vertices(vertices, &faces, params);
    info!(count = dedup.vertices.len(), "Vertex count after overlap check");

    let graph = TriangleGraph::build(&dedup.vertices, &dedup.faces, params.max_neighbors);
    let connected = extract_connected(clean_point, &dedup.vertices, &graph, params)?;
    let triangles_connected = connected.faces.len();

    let filled = if params.fill_holes {
        fill_holes(&connected.vertices, &connected.faces, &connected.grid, params)
    } else {
        HoleFillResult {
            vertices: connected.vertices,
            faces: connected.faces,
            vertices_relaxed: 0,
            triangles_added: 0,
        }
    };

    let mut final_graph = TriangleGraph::build(&filled.vertices, &filled.faces, params.max_neighbors);
    set_border_widths(&filled.vertices, &mut final_graph.triangles);

    let summary = OptimizeSummary {
        input_vertices: vertices.len(),
        input_triangles: faces.len(),
        vertices_merged: dedup.vertices_merged,
        degenerate_dropped: dedup.degenerate_dropped,
        deduplicated_vertices: dedup.vertices.len(),
        triangles_connected,
        triangles_discarded: connected.discarded,
        vertices_relaxed: filled.vertices_relaxed,
        triangles_added: filled.triangles_added,
        non_manifold_edges: final_graph.adjacency.non_manifold_edge_count(),
        capped_triangles: graph.capped_triangles + final_graph.capped_triangles,
        final_vertices: filled.vertices.len(),
        final_triangles: final_graph.len(),
    };

    info!(
        vertices = summary.final_vertices,
        indices = summary.final_triangles * 3,
        triangles = summary.final_triangles,
        "Optimization complete"
    );

    Ok(NavMeshOptimized::new(
        filled.vertices,
        final_graph,
        params.index_group_size,
        summary,
    ))
}
