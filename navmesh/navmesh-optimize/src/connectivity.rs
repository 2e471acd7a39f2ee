//! Extraction of the component reachable from the clean point.

use std::collections::VecDeque;

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::dedup::index_u32;
use crate::error::{OptimizeError, OptimizeResult};
use crate::graph::TriangleGraph;
use crate::grid::SpatialGrid;
use crate::params::OptimizeParams;

/// The reachable part of a mesh, re-indexed.
#[derive(Debug, Clone)]
pub struct ConnectedMesh {
    /// Vertices referenced by reachable triangles, in first-seen order.
    pub vertices: Vec<Point3<f64>>,
    /// Reachable triangles in traversal order, remapped onto `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Vertex grid over `vertices`.
    pub grid: SpatialGrid,
    /// Index of the seed vertex in the input vertex list.
    pub seed_vertex: usize,
    /// Triangles of the input that were not reached.
    pub discarded: usize,
}

/// Find the seed vertex for the traversal.
///
/// The seed is the vertex nearest to `clean_point` (3D) among vertices that
/// belong to at least one triangle with a neighbor. Ties keep the lowest
/// index. Returns the index and squared distance.
#[must_use]
pub fn find_seed_vertex(
    clean_point: &Point3<f64>,
    vertices: &[Point3<f64>],
    graph: &TriangleGraph,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, vertex) in vertices.iter().enumerate() {
        let has_connected_triangle = graph
            .triangles_for_vertex(index_u32(idx))
            .iter()
            .any(|&t| !graph.triangles[t].is_isolated());
        if !has_connected_triangle {
            continue;
        }

        let distance_sq = (vertex - clean_point).norm_squared();
        if best.is_none_or(|(_, best_sq)| distance_sq < best_sq) {
            best = Some((idx, distance_sq));
        }
    }

    best
}

/// Keep only the triangles reachable from the clean point.
///
/// Seeds a FIFO queue with every triangle touching the seed vertex (see
/// [`find_seed_vertex`]) and walks neighbor links breadth-first. The result
/// holds a fresh vertex list containing only referenced vertices, in the
/// order the traversal first meets them. Reached triangles with a vertex id
/// past the end of `vertices` are dropped and counted as discarded.
///
/// # Errors
///
/// Returns [`OptimizeError::NoReachableMesh`] if no triangle has a neighbor,
/// or [`OptimizeError::CleanPointOutOfRange`] if the seed is farther away
/// than `params.max_seed_distance`.
pub fn extract_connected(
    clean_point: &Point3<f64>,
    vertices: &[Point3<f64>],
    graph: &TriangleGraph,
    params: &OptimizeParams,
) -> OptimizeResult<ConnectedMesh> {
    let Some((seed_vertex, distance_sq)) = find_seed_vertex(clean_point, vertices, graph) else {
        return Err(OptimizeError::NoReachableMesh {
            vertex_count: vertices.len(),
            triangle_count: graph.len(),
        });
    };

    let distance = distance_sq.sqrt();
    if let Some(max_distance) = params.max_seed_distance {
        if distance > max_distance {
            return Err(OptimizeError::CleanPointOutOfRange {
                distance,
                max_distance,
            });
        }
    }
    debug!(seed_vertex, distance, "Traversal seed selected");

    let mut queued = vec![false; graph.len()];
    let mut queue = VecDeque::new();
    for &t in graph.triangles_for_vertex(index_u32(seed_vertex)) {
        queued[t] = true;
        queue.push_back(t);
    }

    let mut connected = Vec::new();
    while let Some(t) = queue.pop_front() {
        connected.push(t);
        for &n in &graph.triangles[t].neighbors {
            if !queued[n] {
                queued[n] = true;
                queue.push_back(n);
            }
        }
    }

    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut out_vertices = Vec::new();
    let mut faces = Vec::with_capacity(connected.len());
    for &t in &connected {
        let ids = graph.triangles[t].vertices;
        if ids.iter().any(|&v| v as usize >= vertices.len()) {
            continue;
        }
        let face = ids.map(|v| {
            *remap.entry(v).or_insert_with(|| {
                out_vertices.push(vertices[v as usize]);
                index_u32(out_vertices.len() - 1)
            })
        });
        faces.push(face);
    }

    let grid = SpatialGrid::from_points(&out_vertices, params.dedup_group_size);
    let discarded = graph.len() - faces.len();

    info!(
        connected = faces.len(),
        discarded,
        vertices = out_vertices.len(),
        "Connected NavTriangle count"
    );

    Ok(ConnectedMesh {
        vertices: out_vertices,
        faces,
        grid,
        seed_vertex,
        discarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit squares 10 apart, each made of two triangles.
    fn two_islands() -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for offset in [0.0, 10.0] {
            let base = index_u32(vertices.len());
            vertices.extend([
                Point3::new(offset, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 1.0),
                Point3::new(offset, 0.0, 1.0),
            ]);
            faces.push([base, base + 1, base + 2]);
            faces.push([base, base + 2, base + 3]);
        }
        (vertices, faces)
    }

    #[test]
    fn keeps_island_of_clean_point() {
        let (vertices, faces) = two_islands();
        let graph = TriangleGraph::build(&vertices, &faces, 3);

        let mesh = extract_connected(
            &Point3::new(10.5, 0.0, 0.5),
            &vertices,
            &graph,
            &OptimizeParams::default(),
        )
        .unwrap();

        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices[0], Point3::new(10.0, 0.0, 0.0));
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.discarded, 2);
        assert_eq!(mesh.seed_vertex, 4);
        assert_eq!(mesh.grid.len(), 4);
    }

    #[test]
    fn triangles_past_the_vertex_list_are_dropped() {
        let (vertices, faces) = two_islands();
        let graph = TriangleGraph::build(&vertices, &faces, 3);

        // Vertex 3 is missing from the slice; triangle [0, 2, 3] must go.
        let mesh = extract_connected(
            &Point3::new(0.5, 0.0, 0.5),
            &vertices[..3],
            &graph,
            &OptimizeParams::default(),
        )
        .unwrap();

        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.discarded, 3);
    }

    #[test]
    fn seed_skips_isolated_triangles() {
        let (mut vertices, mut faces) = two_islands();
        // A lone triangle right under the clean point.
        vertices.extend([
            Point3::new(20.0, 0.0, 0.0),
            Point3::new(21.0, 0.0, 0.0),
            Point3::new(20.0, 0.0, 1.0),
        ]);
        faces.push([8, 9, 10]);
        let graph = TriangleGraph::build(&vertices, &faces, 3);

        let (seed, _) = find_seed_vertex(&Point3::new(20.0, 0.0, 0.0), &vertices, &graph).unwrap();
        assert_eq!(seed, 5); // (11, 0, 0)
    }

    #[test]
    fn seed_tie_keeps_lowest_index() {
        let (vertices, faces) = two_islands();
        let graph = TriangleGraph::build(&vertices, &faces, 3);
        let (seed, distance_sq) =
            find_seed_vertex(&Point3::new(0.5, 0.0, 0.5), &vertices, &graph).unwrap();
        assert_eq!(seed, 0);
        assert!((distance_sq - 0.5).abs() < 1e-12);
    }

    #[test]
    fn no_neighbors_is_an_error() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let graph = TriangleGraph::build(&vertices, &[[0, 1, 2]], 3);

        let err = extract_connected(
            &Point3::origin(),
            &vertices,
            &graph,
            &OptimizeParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::NoReachableMesh {
                vertex_count: 3,
                triangle_count: 1
            }
        ));
    }

    #[test]
    fn clean_point_too_far() {
        let (vertices, faces) = two_islands();
        let graph = TriangleGraph::build(&vertices, &faces, 3);
        let params = OptimizeParams::default().with_max_seed_distance(2.0);

        let err = extract_connected(&Point3::new(0.0, 50.0, 0.0), &vertices, &graph, &params)
            .unwrap_err();
        assert!(matches!(err, OptimizeError::CleanPointOutOfRange { .. }));

        assert!(extract_connected(&Point3::new(0.0, 1.0, 0.0), &vertices, &graph, &params).is_ok());
    }
}
