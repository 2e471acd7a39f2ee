//! Passage widths across shared triangle edges.

use nalgebra::Point3;

use crate::geometry::shared_between;
use crate::graph::NavTriangle;

/// Fill `border_widths` of every triangle.
///
/// For neighbor slot `i` the width starts as the 3D length of the edge shared
/// with that neighbor. If a later slot holds a neighbor that is itself a
/// neighbor of slot `i` (slot `i + 2` is tried before `i + 1`), the chained
/// edge length is added and the sum is stored in both slots. Slots are
/// processed in order, so a later slot overwrites the value a chain wrote
/// into it. Triangles without neighbors get no widths.
///
/// # Example
///
/// ```
/// use navmesh_optimize::{TriangleGraph, set_border_widths};
/// use nalgebra::Point3;
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 1.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let mut graph = TriangleGraph::build(&vertices, &[[0, 1, 2], [0, 2, 3]], 3);
/// set_border_widths(&vertices, &mut graph.triangles);
///
/// assert!((graph.triangles[0].border_widths[0] - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn set_border_widths(vertices: &[Point3<f64>], triangles: &mut [NavTriangle]) {
    let widths: Vec<Vec<f64>> = triangles
        .iter()
        .map(|triangle| border_widths(vertices, triangles, triangle))
        .collect();

    for (triangle, widths) in triangles.iter_mut().zip(widths) {
        triangle.border_widths = widths;
    }
}

/// Width per neighbor slot of one triangle.
#[must_use]
pub fn border_widths(
    vertices: &[Point3<f64>],
    triangles: &[NavTriangle],
    triangle: &NavTriangle,
) -> Vec<f64> {
    let neighbors = &triangle.neighbors;
    let mut widths = vec![0.0; neighbors.len()];

    for (i, &other_id) in neighbors.iter().enumerate() {
        let other = &triangles[other_id];
        let Some(mut width) = shared_edge_length(vertices, triangle, other) else {
            continue;
        };

        let chained = if i + 2 < neighbors.len() {
            [i + 2, i + 1]
                .into_iter()
                .find(|&slot| other.neighbors.contains(&neighbors[slot]))
        } else if i + 1 < neighbors.len() {
            Some(i + 1).filter(|&slot| other.neighbors.contains(&neighbors[slot]))
        } else {
            None
        };

        if let Some(slot) = chained {
            if let Some(extra) = shared_edge_length(vertices, triangle, &triangles[neighbors[slot]])
            {
                width += extra;
                widths[slot] = width;
            }
        }

        widths[i] = width;
    }

    widths
}

/// 3D length of the edge shared with `other`, if two vertex ids are shared.
fn shared_edge_length(
    vertices: &[Point3<f64>],
    triangle: &NavTriangle,
    other: &NavTriangle,
) -> Option<f64> {
    match shared_between(&triangle.vertices, &other.vertices, 2)[..] {
        [a, b] => {
            let a = vertices.get(a as usize)?;
            let b = vertices.get(b as usize)?;
            Some((a - b).norm())
        }
        _ => None,
    }
}
