//! The optimized mesh and its pipeline summary.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::TriangleAdjacency;
use crate::graph::{NavTriangle, TriangleGraph};
use crate::grid::{GridCell, SpatialGrid};

/// Counts collected while running the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizeSummary {
    /// Vertices in the raw input.
    pub input_vertices: usize,
    /// Triangles in the raw input.
    pub input_triangles: usize,
    /// Vertices merged into a nearby survivor.
    pub vertices_merged: usize,
    /// Triangles dropped as degenerate after merging.
    pub degenerate_dropped: usize,
    /// Vertices left after deduplication.
    pub deduplicated_vertices: usize,
    /// Triangles reachable from the clean point.
    pub triangles_connected: usize,
    /// Triangles discarded as unreachable.
    pub triangles_discarded: usize,
    /// Vertices pushed out of foreign triangles.
    pub vertices_relaxed: usize,
    /// Triangles added by hole filling.
    pub triangles_added: usize,
    /// Edges shared by more than two triangles in the final mesh.
    pub non_manifold_edges: usize,
    /// Triangles that matched more neighbors than the cap, in any stage.
    pub capped_triangles: usize,
    /// Vertices in the output.
    pub final_vertices: usize,
    /// Triangles in the output.
    pub final_triangles: usize,
}

impl OptimizeSummary {
    /// Check if the pipeline changed anything beyond vertex order.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_merged > 0
            || self.degenerate_dropped > 0
            || self.triangles_discarded > 0
            || self.vertices_relaxed > 0
            || self.triangles_added > 0
    }
}

impl std::fmt::Display for OptimizeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Optimize: {} -> {} verts ({} merged), {} -> {} tris ({} degenerate, {} unreachable, {} filled)",
            self.input_vertices,
            self.final_vertices,
            self.vertices_merged,
            self.input_triangles,
            self.final_triangles,
            self.degenerate_dropped,
            self.triangles_discarded,
            self.triangles_added
        )
    }
}

/// A cleaned navigation mesh ready for pathfinding.
///
/// Holds the final vertices and triangles together with two lookups: the
/// triangles using each vertex, and the triangles near a position.
#[derive(Debug, Clone)]
pub struct NavMeshOptimized {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<NavTriangle>,
    adjacency: TriangleAdjacency,
    triangles_by_cell: SpatialGrid,
    summary: OptimizeSummary,
}

impl NavMeshOptimized {
    /// Assemble the result from the final graph.
    ///
    /// Each triangle is indexed once in every distinct cell (of size
    /// `index_group_size`) that one of its vertices falls into.
    pub(crate) fn new(
        vertices: Vec<Point3<f64>>,
        graph: TriangleGraph,
        index_group_size: f64,
        summary: OptimizeSummary,
    ) -> Self {
        let mut triangles_by_cell = SpatialGrid::new(index_group_size);
        for triangle in &graph.triangles {
            let mut cells: Vec<GridCell> = triangle
                .vertices
                .iter()
                .filter_map(|&v| vertices.get(v as usize))
                .map(|p| GridCell::of(p, index_group_size))
                .collect();
            cells.sort_unstable();
            cells.dedup();
            for cell in cells {
                triangles_by_cell.insert_into(cell, triangle.id);
            }
        }

        Self {
            vertices,
            triangles: graph.triangles,
            adjacency: graph.adjacency,
            triangles_by_cell,
            summary,
        }
    }

    /// Final vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Final triangles with neighbor ids and border widths.
    #[must_use]
    pub fn triangles(&self) -> &[NavTriangle] {
        &self.triangles
    }

    /// Flat index list, three entries per triangle.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flat_map(|t| t.vertices).collect()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of entries in the flat index list.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Ids of triangles using vertex `v`, ascending.
    #[must_use]
    pub fn triangles_for_vertex(&self, v: u32) -> &[usize] {
        self.adjacency.triangles_for_vertex(v)
    }

    /// Ids of triangles indexed in the 3x3 cell neighborhood of `point`.
    ///
    /// Sorted and free of duplicates. A triangle is only found through the
    /// cells its vertices fall into, so very large triangles can be missed
    /// from points near their middle.
    #[must_use]
    pub fn triangles_near(&self, point: &Point3<f64>) -> Vec<usize> {
        let mut ids: Vec<usize> = self.triangles_by_cell.neighbors_of(point).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// The position → triangle index.
    #[must_use]
    pub fn triangle_index(&self) -> &SpatialGrid {
        &self.triangles_by_cell
    }

    /// Counts collected while optimizing.
    #[must_use]
    pub fn summary(&self) -> &OptimizeSummary {
        &self.summary
    }

    /// Split into vertices and triangles.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<NavTriangle>) {
        (self.vertices, self.triangles)
    }
}
