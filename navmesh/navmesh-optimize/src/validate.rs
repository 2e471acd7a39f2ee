//! Post-hoc checks of an optimized navigation mesh.

use std::collections::VecDeque;

use nalgebra::{Point2, Point3};

use crate::adjacency::TriangleAdjacency;
use crate::geometry::{Rect, point_in_triangle, to_xz};
use crate::graph::NavTriangle;
use crate::holes::TriangleBins;
use crate::params::OptimizeParams;

/// Findings of [`validate_navmesh`].
#[derive(Debug, Clone, Default)]
pub struct NavMeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of triangles.
    pub triangle_count: usize,
    /// Total number of distinct edges.
    pub edge_count: usize,

    /// Triangles referencing a vertex that does not exist.
    pub out_of_bounds_triangles: usize,
    /// Neighbor links `(t, n)` where `n` does not list `t` back.
    pub asymmetric_neighbors: usize,
    /// Edges shared by more than two triangles.
    pub non_manifold_edge_count: usize,
    /// Edges used by a single triangle (the outline of the walkable area).
    pub boundary_edge_count: usize,
    /// Triangle pairs whose interiors overlap on the XZ plane.
    pub overlapping_pairs: usize,
    /// Triangles not reachable from triangle 0 through neighbor links.
    pub unreachable_triangles: usize,
}

impl NavMeshReport {
    /// Check whether any invariant is violated.
    ///
    /// Boundary edges are expected and do not count.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Sum of all violation counts.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.out_of_bounds_triangles
            + self.asymmetric_neighbors
            + self.non_manifold_edge_count
            + self.overlapping_pairs
            + self.unreachable_triangles
    }

    /// Whether every triangle is reachable from every other.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.unreachable_triangles == 0
    }
}

impl std::fmt::Display for NavMeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NavMesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Edges: {} ({} boundary)", self.edge_count, self.boundary_edge_count)?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            if self.out_of_bounds_triangles > 0 {
                writeln!(f, "    Out-of-bounds triangles: {}", self.out_of_bounds_triangles)?;
            }
            if self.asymmetric_neighbors > 0 {
                writeln!(f, "    Asymmetric neighbor links: {}", self.asymmetric_neighbors)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.overlapping_pairs > 0 {
                writeln!(f, "    Overlapping triangle pairs: {}", self.overlapping_pairs)?;
            }
            if self.unreachable_triangles > 0 {
                writeln!(f, "    Unreachable triangles: {}", self.unreachable_triangles)?;
            }
        }

        Ok(())
    }
}

/// Check an optimized mesh against the pipeline's output invariants.
///
/// # Example
///
/// ```
/// use navmesh_optimize::{OptimizeParams, optimize, validate_navmesh};
/// use nalgebra::Point3;
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 1.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &vertices, &[0, 1, 2, 0, 2, 3]).unwrap();
///
/// let report = validate_navmesh(mesh.vertices(), mesh.triangles(), &OptimizeParams::default());
/// assert!(!report.has_issues());
/// assert_eq!(report.boundary_edge_count, 4);
/// ```
#[must_use]
pub fn validate_navmesh(
    vertices: &[Point3<f64>],
    triangles: &[NavTriangle],
    params: &OptimizeParams,
) -> NavMeshReport {
    let faces: Vec<[u32; 3]> = triangles.iter().map(|t| t.vertices).collect();
    let adjacency = TriangleAdjacency::build(&faces);

    let in_bounds = |face: &[u32; 3]| face.iter().all(|&v| (v as usize) < vertices.len());
    let out_of_bounds_triangles = faces.iter().filter(|f| !in_bounds(f)).count();

    let asymmetric_neighbors = triangles
        .iter()
        .flat_map(|t| t.neighbors.iter().map(move |&n| (t.id, n)))
        .filter(|&(t, n)| triangles.get(n).is_none_or(|other| !other.neighbors.contains(&t)))
        .count();

    let overlapping_pairs = if out_of_bounds_triangles == 0 {
        count_overlapping_pairs(vertices, &faces, params)
    } else {
        0
    };

    NavMeshReport {
        vertex_count: vertices.len(),
        triangle_count: triangles.len(),
        edge_count: adjacency.edge_count(),
        out_of_bounds_triangles,
        asymmetric_neighbors,
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        overlapping_pairs,
        unreachable_triangles: count_unreachable(triangles),
    }
}

/// Pairs with overlapping bounding rectangles where a corner or the
/// centroid of one lies inside the other.
fn count_overlapping_pairs(
    vertices: &[Point3<f64>],
    faces: &[[u32; 3]],
    params: &OptimizeParams,
) -> usize {
    let flat: Vec<Point2<f64>> = vertices.iter().map(to_xz).collect();
    let corners: Vec<[Point2<f64>; 3]> = faces
        .iter()
        .map(|face| face.map(|v| flat[v as usize]))
        .collect();
    let bounds: Vec<Rect> = corners
        .iter()
        .map(|[a, b, c]| Rect::of_triangle(a, b, c))
        .collect();

    let mut bins = TriangleBins::new(params.dedup_group_size);
    for (id, rect) in bounds.iter().enumerate() {
        bins.insert(id, rect);
    }

    let tol = params.point_tolerance;
    let covers = |outer: &[Point2<f64>; 3], inner: &[Point2<f64>; 3]| {
        let [a, b, c] = inner;
        let centroid = Point2::from((a.coords + b.coords + c.coords) / 3.0);
        [centroid, *a, *b, *c]
            .iter()
            .any(|p| point_in_triangle(p, &outer[0], &outer[1], &outer[2], tol))
    };

    let mut count = 0;
    for (i, rect) in bounds.iter().enumerate() {
        for j in bins.query(rect) {
            if j <= i || !rect.overlaps(&bounds[j]) {
                continue;
            }
            if covers(&corners[i], &corners[j]) || covers(&corners[j], &corners[i]) {
                count += 1;
            }
        }
    }
    count
}

fn count_unreachable(triangles: &[NavTriangle]) -> usize {
    if triangles.is_empty() {
        return 0;
    }

    let mut seen = vec![false; triangles.len()];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    let mut reached = 0;

    while let Some(t) = queue.pop_front() {
        reached += 1;
        for &n in &triangles[t].neighbors {
            if n < seen.len() && !seen[n] {
                seen[n] = true;
                queue.push_back(n);
            }
        }
    }

    triangles.len() - reached
}
