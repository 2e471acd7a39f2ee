//! Quantized XZ grid for proximity lookups.
//!
//! The grid buckets integer ids (vertex or triangle ids) by the cell their
//! XZ position falls into. Buckets are small, so removal is a linear scan.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the XZ plane.
///
/// Computed as `(floor(x / group_size), floor(z / group_size))`, with a true
/// mathematical floor so negative coordinates land in the correct cell.
///
/// # Example
///
/// ```
/// use navmesh_optimize::GridCell;
/// use nalgebra::Point3;
///
/// let cell = GridCell::of(&Point3::new(-0.5, 3.0, 12.0), 5.0);
/// assert_eq!(cell, GridCell::new(-1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    /// Cell index along X.
    pub x: i64,
    /// Cell index along Z.
    pub z: i64,
}

impl GridCell {
    /// Create a cell from its integer coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Cell containing a 3D point (Y is ignored).
    #[inline]
    #[must_use]
    pub fn of(point: &Point3<f64>, group_size: f64) -> Self {
        Self::of_xz(&Point2::new(point.x, point.z), group_size)
    }

    /// Cell containing a point already projected onto XZ.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    // Truncation is intended: cell indices of real-world meshes fit in i64
    pub fn of_xz(point: &Point2<f64>, group_size: f64) -> Self {
        Self {
            x: (point.x / group_size).floor() as i64,
            z: (point.y / group_size).floor() as i64,
        }
    }

    /// Offset this cell by whole cells.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i64, dz: i64) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// The 3x3 Moore neighborhood of this cell, including the cell itself.
    ///
    /// Ordered by X offset, then Z offset, each from -1 to 1.
    #[must_use]
    pub fn neighborhood(self) -> [Self; 9] {
        let mut cells = [self; 9];
        let mut i = 0;
        for dx in -1..=1 {
            for dz in -1..=1 {
                cells[i] = self.offset(dx, dz);
                i += 1;
            }
        }
        cells
    }
}

/// Sparse cell → id-list map over the XZ plane.
///
/// # Example
///
/// ```
/// use navmesh_optimize::SpatialGrid;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 4.0), Point3::new(40.0, 0.0, 0.0)];
/// let grid = SpatialGrid::from_points(&points, 5.0);
///
/// let near: Vec<usize> = grid.neighbors_of(&points[0]).collect();
/// assert_eq!(near, vec![0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    group_size: f64,
    cells: HashMap<GridCell, Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid with the given cell size.
    #[must_use]
    pub fn new(group_size: f64) -> Self {
        Self {
            group_size,
            cells: HashMap::new(),
        }
    }

    /// Build a grid holding every point's index.
    #[must_use]
    pub fn from_points(points: &[Point3<f64>], group_size: f64) -> Self {
        let mut grid = Self::new(group_size);
        for (idx, point) in points.iter().enumerate() {
            grid.insert(idx, point);
        }
        grid
    }

    /// Cell size of this grid.
    #[inline]
    #[must_use]
    pub fn group_size(&self) -> f64 {
        self.group_size
    }

    /// Cell a point falls into under this grid's cell size.
    #[inline]
    #[must_use]
    pub fn cell_of(&self, point: &Point3<f64>) -> GridCell {
        GridCell::of(point, self.group_size)
    }

    /// Append an id to the bucket of the cell containing `point`.
    pub fn insert(&mut self, id: usize, point: &Point3<f64>) {
        let cell = self.cell_of(point);
        self.insert_into(cell, id);
    }

    /// Append an id to a specific cell's bucket.
    pub fn insert_into(&mut self, cell: GridCell, id: usize) {
        self.cells.entry(cell).or_default().push(id);
    }

    /// Remove an id from the bucket of the cell containing `point`.
    ///
    /// Returns `true` if the id was present.
    pub fn remove(&mut self, id: usize, point: &Point3<f64>) -> bool {
        let cell = self.cell_of(point);
        let Some(bucket) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&other| other == id) else {
            return false;
        };
        bucket.remove(pos);
        if bucket.is_empty() {
            self.cells.remove(&cell);
        }
        true
    }

    /// Ids stored in a single cell.
    #[must_use]
    pub fn ids_in(&self, cell: GridCell) -> &[usize] {
        self.cells.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// Ids in the 3x3 neighborhood of the cell containing `point`.
    ///
    /// Ids appear in bucket order, neighborhood cell by cell.
    pub fn neighbors_of(&self, point: &Point3<f64>) -> impl Iterator<Item = usize> + '_ {
        self.cell_of(point)
            .neighborhood()
            .into_iter()
            .flat_map(move |cell| self.ids_in(cell).iter().copied())
    }

    /// Ids in every cell overlapping the XZ rectangle `[min, max]`.
    #[must_use]
    pub fn ids_in_region(&self, min: &Point2<f64>, max: &Point2<f64>) -> Vec<usize> {
        let lo = GridCell::of_xz(min, self.group_size);
        let hi = GridCell::of_xz(max, self.group_size);

        let span_x = u128::from(hi.x.abs_diff(lo.x)) + 1;
        let span_z = u128::from(hi.z.abs_diff(lo.z)) + 1;

        let mut ids = Vec::new();
        if span_x * span_z > self.cells.len() as u128 {
            // Region covers more cells than exist; walk the map instead.
            for (cell, bucket) in &self.cells {
                if (lo.x..=hi.x).contains(&cell.x) && (lo.z..=hi.z).contains(&cell.z) {
                    ids.extend_from_slice(bucket);
                }
            }
        } else {
            for x in lo.x..=hi.x {
                for z in lo.z..=hi.z {
                    ids.extend_from_slice(self.ids_in(GridCell::new(x, z)));
                }
            }
        }
        ids
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of stored ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Whether the grid stores no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
