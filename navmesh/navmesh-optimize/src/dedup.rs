//! Merging of near-coincident vertices.

use nalgebra::Point3;
use tracing::{debug, warn};

use crate::grid::SpatialGrid;
use crate::params::OptimizeParams;

/// Output of [`dedup_vertices`].
#[derive(Debug, Clone)]
pub struct DedupResult {
    /// Surviving vertices, in ascending original order.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles remapped onto `vertices`, degenerate ones removed.
    pub faces: Vec<[u32; 3]>,
    /// Number of vertices merged into a survivor.
    pub vertices_merged: usize,
    /// Triangles dropped for a repeated or out-of-range index.
    pub degenerate_dropped: usize,
}

/// Merge vertices within `params.overlap_distance` (3D) of each other.
///
/// Vertices are visited in ascending index order; each unmerged vertex
/// absorbs every unmerged candidate from its 3x3 grid neighborhood that lies
/// within the merge distance. The lowest index of a close group therefore
/// survives. Merged vertices are removed from the vertex list and all
/// remaining indices shift down accordingly. Triangles that end up with a
/// repeated index, or that referenced an index out of range, are dropped.
///
/// Vertices that survive are kept even when no triangle references them.
///
/// # Example
///
/// ```
/// use navmesh_optimize::{dedup_vertices, OptimizeParams};
/// use nalgebra::Point3;
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.05, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let faces = [[1, 2, 3]];
///
/// let result = dedup_vertices(&vertices, &faces, &OptimizeParams::default());
/// assert_eq!(result.vertices.len(), 3);
/// assert_eq!(result.faces, vec![[0, 1, 2]]);
/// ```
#[must_use]
pub fn dedup_vertices(
    vertices: &[Point3<f64>],
    faces: &[[u32; 3]],
    params: &OptimizeParams,
) -> DedupResult {
    let mut grid = SpatialGrid::from_points(vertices, params.dedup_group_size);
    let mut remap: Vec<usize> = (0..vertices.len()).collect();
    let mut merged = vec![false; vertices.len()];
    let mut vertices_merged = 0;
    let mut candidates = Vec::new();

    for (idx, vertex) in vertices.iter().enumerate() {
        if merged[idx] {
            continue;
        }

        candidates.clear();
        candidates.extend(grid.neighbors_of(vertex));

        for &other in &candidates {
            if other == idx || merged[other] {
                continue;
            }
            if (vertex - vertices[other]).norm() <= params.overlap_distance {
                merged[other] = true;
                remap[other] = idx;
                grid.remove(other, &vertices[other]);
                vertices_merged += 1;
            }
        }
    }

    // Resolve transitive merges
    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target] != target {
            target = remap[target];
        }
        remap[i] = target;
    }

    // Surviving vertex i moves down by the number of merged vertices below it.
    let mut compacted = vec![0_u32; vertices.len()];
    let mut kept = Vec::with_capacity(vertices.len() - vertices_merged);
    for (idx, vertex) in vertices.iter().enumerate() {
        if !merged[idx] {
            compacted[idx] = index_u32(kept.len());
            kept.push(*vertex);
        }
    }

    let mut out_faces = Vec::with_capacity(faces.len());
    let mut degenerate_dropped = 0;
    for face in faces {
        let resolved = face.map(|v| {
            let v = v as usize;
            (v < vertices.len()).then(|| compacted[remap[v]])
        });
        match resolved {
            [Some(a), Some(b), Some(c)] if a != b && b != c && a != c => {
                out_faces.push([a, b, c]);
            }
            _ => degenerate_dropped += 1,
        }
    }

    debug!(
        merged = vertices_merged,
        remaining = kept.len(),
        "Vertex deduplication complete"
    );
    if degenerate_dropped > 0 {
        warn!(
            dropped = degenerate_dropped,
            "Dropped degenerate triangles after vertex merge"
        );
    }

    DedupResult {
        vertices: kept,
        faces: out_faces,
        vertices_merged,
        degenerate_dropped,
    }
}

/// Convert a vertex position into an index value.
#[inline]
#[allow(clippy::cast_possible_truncation)]
// Vertex counts are bounded by the u32 index format
pub(crate) fn index_u32(idx: usize) -> u32 {
    idx as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn close_pair_merges_to_lowest_index() {
        let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.05, 0.0, 0.0)];
        let result = dedup_vertices(&vertices, &[], &OptimizeParams::default());

        assert_eq!(result.vertices.len(), 1);
        assert_relative_eq!(result.vertices[0].x, 0.0);
        assert_eq!(result.vertices_merged, 1);
    }

    #[test]
    fn distant_pair_stays_distinct() {
        let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.31, 0.0, 0.0)];
        let result = dedup_vertices(&vertices, &[], &OptimizeParams::default());
        assert_eq!(result.vertices.len(), 2);
        assert_eq!(result.vertices_merged, 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.25, 0.0, 0.0)];
        let params = OptimizeParams::default().with_overlap_distance(0.25);
        let result = dedup_vertices(&vertices, &[], &params);
        assert_eq!(result.vertices.len(), 1);
    }

    #[test]
    fn height_counts_towards_distance() {
        // Same XZ position, one meter apart vertically: a bridge over a floor.
        let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let result = dedup_vertices(&vertices, &[], &OptimizeParams::default());
        assert_eq!(result.vertices.len(), 2);
    }

    #[test]
    fn merge_across_cell_border() {
        let vertices = [Point3::new(4.95, 0.0, 0.0), Point3::new(5.05, 0.0, 0.0)];
        let result = dedup_vertices(&vertices, &[], &OptimizeParams::default());
        assert_eq!(result.vertices.len(), 1);
    }

    #[test]
    fn indices_shift_down_after_removal() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0), // merged into 0
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(2.1, 0.0, 2.0), // merged into 3
            Point3::new(0.0, 0.0, 2.0),
        ];
        let faces = [[1, 2, 4], [0, 4, 5]];
        let result = dedup_vertices(&vertices, &faces, &OptimizeParams::default());

        assert_eq!(result.vertices.len(), 4);
        assert_eq!(result.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(result.degenerate_dropped, 0);
    }

    #[test]
    fn chain_resolves_to_first_survivor() {
        // 0 and 1 are close, 1 and 2 are close, 0 and 2 are not.
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.25, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(3.0, 0.0, 3.0),
        ];
        let result = dedup_vertices(&vertices, &[[1, 2, 3]], &OptimizeParams::default());

        // 1 merges into 0, 2 survives because 1 was already merged.
        assert_eq!(result.vertices.len(), 3);
        assert_eq!(result.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn collapsed_triangles_are_dropped() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let faces = [[0, 1, 2], [0, 2, 7]];
        let result = dedup_vertices(&vertices, &faces, &OptimizeParams::default());

        assert!(result.faces.is_empty());
        assert_eq!(result.degenerate_dropped, 2);
    }

    #[test]
    fn empty_input() {
        let result = dedup_vertices(&[], &[], &OptimizeParams::default());
        assert!(result.vertices.is_empty());
        assert!(result.faces.is_empty());
    }
}
