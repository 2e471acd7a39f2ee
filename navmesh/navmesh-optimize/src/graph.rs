//! Triangle records and shared-edge adjacency.

use nalgebra::{Point3, Vector3};
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::TriangleAdjacency;
use crate::geometry::shared_between;

/// A triangle of the navigation mesh with its edge neighbors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavTriangle {
    /// Position of this triangle in the triangle list.
    pub id: usize,
    /// Vertex ids `(a, b, c)`.
    pub vertices: [u32; 3],
    /// Ids of triangles sharing an edge with this one, in discovery order.
    pub neighbors: Vec<usize>,
    /// Passage width per neighbor slot. Empty until border widths are set.
    pub border_widths: Vec<f64>,
    /// Unit direction from `a` to `b` (zero for a collapsed edge).
    pub ab: Vector3<f64>,
    /// Unit direction from `b` to `c`.
    pub bc: Vector3<f64>,
    /// Unit direction from `c` to `a`.
    pub ca: Vector3<f64>,
}

impl NavTriangle {
    fn new(id: usize, face: [u32; 3], vertices: &[Point3<f64>]) -> Self {
        let [a, b, c] = face;
        Self {
            id,
            vertices: face,
            neighbors: Vec::new(),
            border_widths: Vec::new(),
            ab: edge_direction(vertices, a, b),
            bc: edge_direction(vertices, b, c),
            ca: edge_direction(vertices, c, a),
        }
    }

    /// Whether the triangle has no edge neighbor.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.neighbors.is_empty()
    }
}

fn edge_direction(vertices: &[Point3<f64>], from: u32, to: u32) -> Vector3<f64> {
    match (vertices.get(from as usize), vertices.get(to as usize)) {
        (Some(from), Some(to)) => (to - from)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros),
        _ => Vector3::zeros(),
    }
}

/// Triangles with neighbor lists plus the vertex incidence they were built from.
#[derive(Debug, Clone)]
pub struct TriangleGraph {
    /// Triangles, indexed by id.
    pub triangles: Vec<NavTriangle>,
    /// Vertex and edge incidence of `triangles`.
    pub adjacency: TriangleAdjacency,
    /// Triangles that matched more neighbors than the cap allows.
    pub capped_triangles: usize,
}

impl TriangleGraph {
    /// Build triangles and their shared-edge neighbors.
    ///
    /// Two triangles are neighbors when they share exactly two vertex ids.
    /// Candidates are gathered from the triangles touching `a`, then `b`,
    /// then `c`, and at most `max_neighbors` matches are kept. Triangles with
    /// more matches indicate non-manifold input and are logged, not rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use navmesh_optimize::TriangleGraph;
    /// use nalgebra::Point3;
    ///
    /// let vertices = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 1.0),
    ///     Point3::new(0.0, 0.0, 1.0),
    /// ];
    /// let graph = TriangleGraph::build(&vertices, &[[0, 1, 2], [0, 2, 3]], 3);
    ///
    /// assert_eq!(graph.triangles[0].neighbors, vec![1]);
    /// assert_eq!(graph.triangles[1].neighbors, vec![0]);
    /// ```
    #[must_use]
    pub fn build(vertices: &[Point3<f64>], faces: &[[u32; 3]], max_neighbors: usize) -> Self {
        let adjacency = TriangleAdjacency::build(faces);
        let mut triangles: Vec<NavTriangle> = faces
            .iter()
            .enumerate()
            .map(|(id, &face)| NavTriangle::new(id, face, vertices))
            .collect();

        let mut capped_triangles = 0;
        let mut visited = Vec::new();

        for triangle in &mut triangles {
            visited.clear();
            let mut matches = 0;

            for &v in &triangle.vertices {
                for &candidate in adjacency.triangles_for_vertex(v) {
                    if candidate == triangle.id || visited.contains(&candidate) {
                        continue;
                    }
                    visited.push(candidate);

                    if shared_between(&triangle.vertices, &faces[candidate], 3).len() == 2 {
                        matches += 1;
                        if triangle.neighbors.len() < max_neighbors {
                            triangle.neighbors.push(candidate);
                        }
                    }
                }
            }

            if matches > max_neighbors {
                capped_triangles += 1;
            }
        }

        info!(count = triangles.len(), "NavTriangles created");

        let non_manifold = adjacency.non_manifold_edge_count();
        if non_manifold > 0 || capped_triangles > 0 {
            warn!(
                non_manifold_edges = non_manifold,
                capped_triangles, max_neighbors, "Non-manifold input, extra neighbors ignored"
            );
        }

        Self {
            triangles,
            adjacency,
            capped_triangles,
        }
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the graph has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangles using a vertex.
    #[must_use]
    pub fn triangles_for_vertex(&self, v: u32) -> &[usize] {
        self.adjacency.triangles_for_vertex(v)
    }

    /// Vertex id triples of all triangles, in id order.
    #[must_use]
    pub fn faces(&self) -> Vec<[u32; 3]> {
        self.triangles.iter().map(|t| t.vertices).collect()
    }
}
