//! Re-closing the boundary left behind by component extraction.
//!
//! Two steps, each a single pass:
//!
//! 1. **Relaxation**: a vertex whose XZ projection lies strictly inside a
//!    triangle it does not belong to is pushed just past the nearest edge of
//!    that triangle. All containment tests use the positions from before the
//!    pass; pushes from several triangles add up.
//! 2. **Re-triangulation**: any three vertices that are pairwise connected
//!    by existing edges, but have no triangle, get one unless it would
//!    overlap existing geometry. Accepted triangles take part in the overlap
//!    checks of every later candidate.

use hashbrown::HashSet;
use nalgebra::{Point2, Point3, Vector2, Vector3};
use tracing::debug;

use crate::dedup::index_u32;
use crate::geometry::{
    Rect, closest_point_on_segment, point_in_triangle, to_xz, triangle_intersect,
};
use crate::grid::{GridCell, SpatialGrid};
use crate::params::OptimizeParams;

/// Output of [`fill_holes`].
#[derive(Debug, Clone)]
pub struct HoleFillResult {
    /// Vertices after relaxation. Same count and order as the input.
    pub vertices: Vec<Point3<f64>>,
    /// Input triangles followed by the added ones.
    pub faces: Vec<[u32; 3]>,
    /// Number of vertices that were pushed at least once.
    pub vertices_relaxed: usize,
    /// Number of triangles appended.
    pub triangles_added: usize,
}

/// Relax vertices and fill holes.
///
/// `grid` must index `vertices` (as returned by
/// [`extract_connected`](crate::extract_connected)). Faces with a vertex id
/// past the end of `vertices` are kept in the output but take no part in
/// relaxation or re-triangulation.
///
/// # Example
///
/// ```
/// use navmesh_optimize::{OptimizeParams, SpatialGrid, fill_holes};
/// use nalgebra::Point3;
///
/// // Three triangles around a missing middle one; all of its edges remain.
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 2.0),
///     Point3::new(1.0, 0.0, -1.0),
///     Point3::new(2.5, 0.0, 1.5),
///     Point3::new(-0.5, 0.0, 1.5),
/// ];
/// let faces = [[0, 1, 3], [1, 2, 4], [2, 0, 5]];
/// let params = OptimizeParams::default();
/// let grid = SpatialGrid::from_points(&vertices, params.dedup_group_size);
///
/// let filled = fill_holes(&vertices, &faces, &grid, &params);
/// assert_eq!(filled.triangles_added, 1);
/// assert_eq!(filled.faces.last(), Some(&[0, 1, 2]));
/// ```
#[must_use]
pub fn fill_holes(
    vertices: &[Point3<f64>],
    faces: &[[u32; 3]],
    grid: &SpatialGrid,
    params: &OptimizeParams,
) -> HoleFillResult {
    let (relaxed, vertices_relaxed) = relax_vertices(vertices, faces, grid, params);
    let filled = retriangulate(&relaxed, faces, params);
    let triangles_added = filled.len() - faces.len();

    debug!(vertices_relaxed, triangles_added, "Hole filling complete");

    HoleFillResult {
        vertices: relaxed,
        faces: filled,
        vertices_relaxed,
        triangles_added,
    }
}

/// Push vertices out of triangles that contain them.
///
/// For every triangle, in ascending order, and every vertex not part of it
/// whose XZ position is inside, the vertex moves along the direction to the
/// nearest point on the triangle's edges by that distance plus
/// `params.relax_epsilon`. Heights are unchanged.
///
/// Every containment test uses the positions from before the pass, and the
/// pushes are applied together at the end. This differs from an in-place
/// pass, where later tests see triangles whose corners have already moved.
/// The result therefore does not depend on triangle order beyond the
/// summing of pushes. Faces with an out-of-range vertex id are skipped.
///
/// Returns the relaxed vertices and the number of vertices moved.
#[must_use]
pub fn relax_vertices(
    vertices: &[Point3<f64>],
    faces: &[[u32; 3]],
    grid: &SpatialGrid,
    params: &OptimizeParams,
) -> (Vec<Point3<f64>>, usize) {
    let flat: Vec<Point2<f64>> = vertices.iter().map(to_xz).collect();
    let mut offsets = vec![Vector2::zeros(); vertices.len()];
    let mut moved = vec![false; vertices.len()];

    for face in faces {
        let Some([a, b, c]) = corners(&flat, face) else {
            continue;
        };
        let bounds = Rect::of_triangle(&a, &b, &c);

        for idx in grid.ids_in_region(&bounds.min, &bounds.max) {
            if idx >= flat.len() || face.contains(&index_u32(idx)) {
                continue;
            }
            let p = flat[idx];
            if !point_in_triangle(&p, &a, &b, &c, params.point_tolerance) {
                continue;
            }

            let close = nearest_edge_point(&p, &a, &b, &c);
            let offset = close - p;
            if let Some(direction) = offset.try_normalize(0.0) {
                offsets[idx] += direction * (offset.norm() + params.relax_epsilon);
                moved[idx] = true;
            }
        }
    }

    let relaxed = vertices
        .iter()
        .zip(&offsets)
        .map(|(v, o)| v + Vector3::new(o.x, 0.0, o.y))
        .collect();

    (relaxed, moved.iter().filter(|&&m| m).count())
}

/// Closest point to `p` on edges `ab`, `ac`, `bc`; earlier edges win ties.
fn nearest_edge_point(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> Point2<f64> {
    let on_ab = closest_point_on_segment(p, a, b);
    let on_ac = closest_point_on_segment(p, a, c);
    let on_bc = closest_point_on_segment(p, b, c);

    let d_ab = (on_ab - p).norm();
    let d_ac = (on_ac - p).norm();
    let d_bc = (on_bc - p).norm();

    if d_ab < d_ac && d_ab < d_bc {
        on_ab
    } else if d_ac < d_bc {
        on_ac
    } else {
        on_bc
    }
}

/// XZ corners of a face, or `None` if an id is out of range.
fn corners(flat: &[Point2<f64>], face: &[u32; 3]) -> Option<[Point2<f64>; 3]> {
    Some([
        *flat.get(face[0] as usize)?,
        *flat.get(face[1] as usize)?,
        *flat.get(face[2] as usize)?,
    ])
}

/// Vertex connection lists, sorted ascending, built from existing edges.
///
/// Faces with an out-of-range id contribute no connections.
fn connections(vertex_count: usize, faces: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let mut lists = vec![Vec::new(); vertex_count];
    for &[a, b, c] in faces {
        if [a, b, c].iter().any(|&v| v as usize >= vertex_count) {
            continue;
        }
        for (from, to) in [(a, b), (a, c), (b, a), (b, c), (c, a), (c, b)] {
            lists[from as usize].push(to);
        }
    }
    for list in &mut lists {
        list.sort_unstable();
        list.dedup();
    }
    lists
}

/// Most cells a triangle is binned into before it counts as oversized.
const MAX_CELLS_PER_TRIANGLE: u128 = 64;

/// Triangles binned into every grid cell their bounding rectangle touches.
///
/// Triangles whose rectangle spans more than [`MAX_CELLS_PER_TRIANGLE`]
/// cells are kept in a separate list returned by every query, so insertion
/// cost does not grow with triangle area.
pub(crate) struct TriangleBins {
    grid: SpatialGrid,
    oversized: Vec<usize>,
}

impl TriangleBins {
    pub(crate) fn new(group_size: f64) -> Self {
        Self {
            grid: SpatialGrid::new(group_size),
            oversized: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: usize, bounds: &Rect) {
        let gs = self.grid.group_size();
        let lo = GridCell::of_xz(&bounds.min, gs);
        let hi = GridCell::of_xz(&bounds.max, gs);

        let span_x = u128::from(hi.x.abs_diff(lo.x)) + 1;
        let span_z = u128::from(hi.z.abs_diff(lo.z)) + 1;
        if span_x * span_z > MAX_CELLS_PER_TRIANGLE {
            self.oversized.push(id);
            return;
        }

        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                self.grid.insert_into(GridCell::new(x, z), id);
            }
        }
    }

    /// Distinct triangle ids whose cells overlap `bounds`, plus every
    /// oversized triangle, ascending.
    pub(crate) fn query(&self, bounds: &Rect) -> Vec<usize> {
        let mut ids = self.grid.ids_in_region(&bounds.min, &bounds.max);
        ids.extend_from_slice(&self.oversized);
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Number of triangles kept outside the grid.
    #[cfg(test)]
    fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    /// Number of non-empty grid cells.
    #[cfg(test)]
    fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }
}

fn sorted_triple(face: [u32; 3]) -> [u32; 3] {
    let mut key = face;
    key.sort_unstable();
    key
}

/// Add triangles for closed vertex triples that have none.
///
/// Candidates `(original, other, final)` satisfy `original < other < final`;
/// `other` and `final` are both connected to `original`, and `final` is
/// connected to `other`. Connections come from `faces` and are not updated
/// as triangles are added. A candidate is rejected when the triangle exists,
/// when a corner or the centroid lies inside an existing triangle with an
/// overlapping bounding rectangle, or when its edges cross an existing
/// triangle's edges.
fn retriangulate(
    vertices: &[Point3<f64>],
    faces: &[[u32; 3]],
    params: &OptimizeParams,
) -> Vec<[u32; 3]> {
    let flat: Vec<Point2<f64>> = vertices.iter().map(to_xz).collect();
    let connections = connections(vertices.len(), faces);

    let mut out = faces.to_vec();
    let mut existing: HashSet<[u32; 3]> = faces.iter().map(|&f| sorted_triple(f)).collect();
    let mut bins = TriangleBins::new(params.dedup_group_size);
    for (id, face) in faces.iter().enumerate() {
        if let Some([a, b, c]) = corners(&flat, face) {
            bins.insert(id, &Rect::of_triangle(&a, &b, &c));
        }
    }

    for (original, originals) in connections.iter().enumerate() {
        let original = index_u32(original);

        for (pos, &other) in originals.iter().enumerate() {
            if other <= original {
                continue;
            }

            for &last in &originals[pos + 1..] {
                if !connections[last as usize].contains(&other) {
                    continue;
                }

                let candidate = [original, other, last];
                if existing.contains(&sorted_triple(candidate)) {
                    continue;
                }

                let [a, b, c] = candidate.map(|v| flat[v as usize]);
                let bounds = Rect::of_triangle(&a, &b, &c);
                let centroid = Point2::from((a.coords + b.coords + c.coords) / 3.0);

                let denied = bins.query(&bounds).into_iter().any(|id| {
                    let Some([ap, bp, cp]) = corners(&flat, &out[id]) else {
                        return false;
                    };
                    if !bounds.overlaps(&Rect::of_triangle(&ap, &bp, &cp)) {
                        return false;
                    }
                    let tol = params.point_tolerance;
                    [centroid, a, b, c]
                        .iter()
                        .any(|p| point_in_triangle(p, &ap, &bp, &cp, tol))
                        || triangle_intersect(&a, &b, &c, &ap, &bp, &cp, params.segment_tolerance)
                });
                if denied {
                    continue;
                }

                debug!(a = original, b = other, c = last, "Filled hole triangle");
                bins.insert(out.len(), &bounds);
                existing.insert(sorted_triple(candidate));
                out.push(candidate);
            }
        }
    }

    out
}
