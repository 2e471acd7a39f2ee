//! Vertex and edge incidence for triangle lists.
//!
//! Rebuilt from scratch after every structural change; never patched.

use hashbrown::HashMap;

/// Incidence lookups for a list of index triples.
///
/// Provides:
/// - Triangles touching a vertex, in ascending triangle order
/// - Triangles sharing an undirected edge
/// - Boundary edges (one triangle) and non-manifold edges (more than two)
#[derive(Debug, Clone, Default)]
pub struct TriangleAdjacency {
    /// Maps vertex id to the triangles that use it. Each triangle at most once.
    vertex_to_triangles: HashMap<u32, Vec<usize>>,
    /// Maps edge (v0, v1) with v0 < v1 to the triangles that use it.
    edge_to_triangles: HashMap<(u32, u32), Vec<usize>>,
}

impl TriangleAdjacency {
    /// Build incidence from index triples. Triangle ids are positions in `faces`.
    ///
    /// # Example
    ///
    /// ```
    /// use navmesh_optimize::TriangleAdjacency;
    ///
    /// let faces = [[0, 1, 2], [0, 2, 3]];
    /// let adj = TriangleAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.triangles_for_vertex(2), &[0, 1]);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut vertex_to_triangles: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut edge_to_triangles: HashMap<(u32, u32), Vec<usize>> = HashMap::new();

        for (tri, face) in faces.iter().enumerate() {
            for &v in face {
                let list = vertex_to_triangles.entry(v).or_default();
                // Triangles arrive in ascending order, so a repeat is always last.
                if list.last() != Some(&tri) {
                    list.push(tri);
                }
            }

            for (v0, v1) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                if v0 != v1 {
                    edge_to_triangles
                        .entry(normalize_edge(v0, v1))
                        .or_default()
                        .push(tri);
                }
            }
        }

        Self {
            vertex_to_triangles,
            edge_to_triangles,
        }
    }

    /// Triangles using a vertex, or an empty slice.
    #[must_use]
    pub fn triangles_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_triangles
            .get(&v)
            .map_or(&[], Vec::as_slice)
    }

    /// Triangles using an undirected edge.
    ///
    /// Returns `None` if no triangle uses the edge.
    #[must_use]
    pub fn triangles_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_triangles
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Iterate over edges used by exactly one triangle, in arbitrary order.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_triangles
            .iter()
            .filter(|(_, tris)| tris.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Number of edges used by exactly one triangle.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_triangles
            .values()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    /// Iterate over edges used by more than two triangles, in arbitrary order.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_triangles
            .iter()
            .filter(|(_, tris)| tris.len() > 2)
            .map(|(&edge, _)| edge)
    }

    /// Number of edges used by more than two triangles.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_triangles
            .values()
            .filter(|tris| tris.len() > 2)
            .count()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_triangles.len()
    }

    /// Number of vertices used by at least one triangle.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_triangles.len()
    }
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
