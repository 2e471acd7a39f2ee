//! 2D predicates on the XZ plane.
//!
//! Navigation meshes are treated as height fields: adjacency, containment and
//! overlap are all decided on the XZ projection, and the Y coordinate is only
//! carried along for the final 3D output. [`to_xz`] and [`from_xz_plus_y`]
//! are the only places the projection happens.
//!
//! Every predicate takes its tolerance explicitly; see
//! [`OptimizeParams`](crate::OptimizeParams) for the defaults.

use nalgebra::{Point2, Point3};

/// Project a 3D point onto the XZ plane.
///
/// The returned point stores X in `.x` and Z in `.y`.
#[inline]
#[must_use]
pub fn to_xz(point: &Point3<f64>) -> Point2<f64> {
    Point2::new(point.x, point.z)
}

/// Lift an XZ point back to 3D with the given height.
#[inline]
#[must_use]
pub fn from_xz_plus_y(point: &Point2<f64>, y: f64) -> Point3<f64> {
    Point3::new(point.x, y, point.y)
}

/// Whether `p` lies inside triangle `(a, b, c)`.
///
/// Solves `p = a + w1 (b - a) + w2 (c - a)` in closed form and accepts when
/// `w1 >= tolerance`, `w2 >= tolerance` and `w1 + w2 <= 1 - tolerance`.
/// Points on or within `tolerance` of an edge are therefore outside. `w2`
/// is recovered from the Z row, or from the X row when `c` and `a` share a
/// Z coordinate. Degenerate triangles contain nothing.
///
/// The X-row fallback is a departure from the plain closed form, which
/// divides by `c.z - a.z` unconditionally. There that case yields a
/// non-finite `w2` and rejects every point, so triangles with `c.z == a.z`
/// never contain anything. Here they contain their interior like any other
/// triangle.
///
/// # Example
///
/// ```
/// use navmesh_optimize::geometry::point_in_triangle;
/// use nalgebra::Point2;
///
/// let (a, b, c) = (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
/// assert!(point_in_triangle(&Point2::new(0.7, 0.3), &a, &b, &c, 0.001));
/// assert!(!point_in_triangle(&Point2::new(0.5, 0.0), &a, &b, &c, 0.001)); // on edge ab
/// ```
#[must_use]
pub fn point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let denominator = (b.y - a.y) * (c.x - a.x) - (b.x - a.x) * (c.y - a.y);
    if denominator == 0.0 {
        return false;
    }

    let w1 = (a.x * (c.y - a.y) + (p.y - a.y) * (c.x - a.x) - p.x * (c.y - a.y)) / denominator;

    let w2 = if c.y - a.y == 0.0 {
        (p.x - a.x - w1 * (b.x - a.x)) / (c.x - a.x)
    } else {
        (p.y - a.y - w1 * (b.y - a.y)) / (c.y - a.y)
    };

    w1 >= tolerance && w2 >= tolerance && w1 + w2 <= 1.0 - tolerance
}

/// Whether segments `(s1, e1)` and `(s2, e2)` properly cross.
///
/// Intersects the two supporting lines. Returns `false` for parallel lines,
/// for an intersection exactly at one of the four endpoints, and for an
/// intersection outside either segment's bounding box shrunk by `tolerance`
/// on all four sides. Because the box is shrunk on both axes, a segment that
/// is exactly axis-aligned never reports a crossing.
#[must_use]
pub fn segment_intersect(
    s1: &Point2<f64>,
    e1: &Point2<f64>,
    s2: &Point2<f64>,
    e2: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let a1 = e1.y - s1.y;
    let b1 = s1.x - e1.x;
    let c1 = a1 * s1.x + b1 * s1.y;

    let a2 = e2.y - s2.y;
    let b2 = s2.x - e2.x;
    let c2 = a2 * s2.x + b2 * s2.y;

    let denominator = a1 * b2 - a2 * b1;
    if denominator == 0.0 {
        return false;
    }

    let point = Point2::new(
        (b2 * c1 - b1 * c2) / denominator,
        (a1 * c2 - a2 * c1) / denominator,
    );

    if point == *s1 || point == *e1 || point == *s2 || point == *e2 {
        return false;
    }

    strictly_within(point.x, s1.x, e1.x, tolerance)
        && strictly_within(point.x, s2.x, e2.x, tolerance)
        && strictly_within(point.y, s1.y, e1.y, tolerance)
        && strictly_within(point.y, s2.y, e2.y, tolerance)
}

#[inline]
fn strictly_within(value: f64, a: f64, b: f64, tolerance: f64) -> bool {
    value > a.min(b) + tolerance && value < a.max(b) - tolerance
}

/// Whether any edge of triangle `a` crosses any edge of triangle `b`.
///
/// Only crossings are detected. A triangle fully inside the other has no
/// crossing edges; callers check containment with [`point_in_triangle`].
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn triangle_intersect(
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    a3: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
    b3: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let a_edges = [(a1, a2), (a1, a3), (a2, a3)];
    let b_edges = [(b1, b2), (b1, b3), (b2, b3)];

    b_edges.iter().any(|(bs, be)| {
        a_edges
            .iter()
            .any(|(as_, ae)| segment_intersect(as_, ae, bs, be, tolerance))
    })
}

/// Closest point to `p` on the segment from `start` to `end`.
///
/// A zero-length segment returns `start`.
#[must_use]
pub fn closest_point_on_segment(
    p: &Point2<f64>,
    start: &Point2<f64>,
    end: &Point2<f64>,
) -> Point2<f64> {
    let heading = end - start;
    let length = heading.norm();
    if length == 0.0 {
        return *start;
    }

    let direction = heading / length;
    let projection = (p - start).dot(&direction).clamp(0.0, length);

    start + direction * projection
}

/// Vertex ids of `other` that also appear in `target`, at most `max`.
///
/// Ids are returned in the order they appear in `other`.
///
/// # Example
///
/// ```
/// use navmesh_optimize::geometry::shared_between;
///
/// assert_eq!(shared_between(&[0, 1, 2], &[2, 3, 0], 3), vec![2, 0]);
/// assert_eq!(shared_between(&[0, 1, 2], &[2, 3, 0], 1), vec![2]);
/// ```
#[must_use]
pub fn shared_between(target: &[u32; 3], other: &[u32; 3], max: usize) -> Vec<u32> {
    other
        .iter()
        .copied()
        .filter(|id| target.contains(id))
        .take(max)
        .collect()
}

/// Axis-aligned rectangle on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl Rect {
    /// Bounding rectangle of a triangle.
    #[must_use]
    pub fn of_triangle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
            max: Point2::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
        }
    }

    /// Whether two rectangles overlap. Touching edges count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.max.y < other.min.y
            || self.min.x > other.max.x
            || self.min.y > other.max.y)
    }
}
