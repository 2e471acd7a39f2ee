//! Tunable tolerances for the optimization pipeline.

use crate::error::{OptimizeError, OptimizeResult};

/// Configuration parameters for [`optimize_with_params`](crate::optimize_with_params).
///
/// All distances are in mesh units. Grid sizes differ between the
/// deduplication stage and the final triangle index, so both are explicit.
///
/// # Example
///
/// ```
/// use navmesh_optimize::OptimizeParams;
///
/// let params = OptimizeParams::default()
///     .with_overlap_distance(0.1)
///     .with_max_seed_distance(25.0);
///
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct OptimizeParams {
    /// 3D distance at or below which two vertices are merged.
    ///
    /// Default: `0.3`
    pub overlap_distance: f64,

    /// Cell size of the XZ vertex grid used for deduplication and extraction.
    ///
    /// Must be at least `overlap_distance`, otherwise the 3x3 cell
    /// neighborhood no longer covers every merge candidate.
    /// Default: `5.0`
    pub dedup_group_size: f64,

    /// Cell size of the triangle index stored in the result.
    ///
    /// Default: `10.0`
    pub index_group_size: f64,

    /// Weight tolerance of the point-in-triangle test.
    ///
    /// Default: `0.001`
    pub point_tolerance: f64,

    /// Bounding-box shrink applied by the segment intersection test.
    ///
    /// Default: `0.001`
    pub segment_tolerance: f64,

    /// Extra distance a relaxed vertex is pushed past the nearest edge.
    ///
    /// Default: `0.01`
    pub relax_epsilon: f64,

    /// Maximum number of edge neighbors kept per triangle.
    ///
    /// Default: `3`
    pub max_neighbors: usize,

    /// Reject the clean point when the nearest seed vertex is farther away.
    ///
    /// With `None` a clean point far outside the mesh still seeds from the
    /// nearest connected vertex.
    ///
    /// Default: `None` (any distance)
    pub max_seed_distance: Option<f64>,

    /// Whether to run the hole-filling stage.
    ///
    /// Default: `true`
    pub fill_holes: bool,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self {
            overlap_distance: 0.3,
            dedup_group_size: 5.0,
            index_group_size: 10.0,
            point_tolerance: 0.001,
            segment_tolerance: 0.001,
            relax_epsilon: 0.01,
            max_neighbors: 3,
            max_seed_distance: None,
            fill_holes: true,
        }
    }
}

impl OptimizeParams {
    /// Set the vertex merge distance.
    #[must_use]
    pub fn with_overlap_distance(mut self, distance: f64) -> Self {
        self.overlap_distance = distance;
        self
    }

    /// Set the deduplication grid cell size.
    #[must_use]
    pub fn with_dedup_group_size(mut self, size: f64) -> Self {
        self.dedup_group_size = size;
        self
    }

    /// Set the cell size of the result's triangle index.
    #[must_use]
    pub fn with_index_group_size(mut self, size: f64) -> Self {
        self.index_group_size = size;
        self
    }

    /// Set the point-in-triangle weight tolerance.
    #[must_use]
    pub fn with_point_tolerance(mut self, tolerance: f64) -> Self {
        self.point_tolerance = tolerance;
        self
    }

    /// Set the segment intersection tolerance.
    #[must_use]
    pub fn with_segment_tolerance(mut self, tolerance: f64) -> Self {
        self.segment_tolerance = tolerance;
        self
    }

    /// Set the extra relaxation push distance.
    #[must_use]
    pub fn with_relax_epsilon(mut self, epsilon: f64) -> Self {
        self.relax_epsilon = epsilon;
        self
    }

    /// Set the neighbor cap per triangle.
    #[must_use]
    pub fn with_max_neighbors(mut self, max: usize) -> Self {
        self.max_neighbors = max;
        self
    }

    /// Reject clean points farther than `distance` from the mesh.
    #[must_use]
    pub fn with_max_seed_distance(mut self, distance: f64) -> Self {
        self.max_seed_distance = Some(distance);
        self
    }

    /// Enable or disable hole filling.
    #[must_use]
    pub fn with_fill_holes(mut self, fill: bool) -> Self {
        self.fill_holes = fill;
        self
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::InvalidParams`] if a size or distance is not
    /// finite and positive, a tolerance is negative, the neighbor cap is
    /// zero, or the merge distance exceeds the dedup cell size.
    pub fn validate(&self) -> OptimizeResult<()> {
        let positive = [
            ("overlap_distance", self.overlap_distance),
            ("dedup_group_size", self.dedup_group_size),
            ("index_group_size", self.index_group_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{name} must be finite and positive, got {value}")));
            }
        }

        let non_negative = [
            ("point_tolerance", self.point_tolerance),
            ("segment_tolerance", self.segment_tolerance),
            ("relax_epsilon", self.relax_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be finite and non-negative, got {value}")));
            }
        }

        if self.max_neighbors == 0 {
            return Err(invalid("max_neighbors must be at least 1".to_string()));
        }

        if self.overlap_distance > self.dedup_group_size {
            return Err(invalid(format!(
                "overlap_distance {} exceeds dedup_group_size {}",
                self.overlap_distance, self.dedup_group_size
            )));
        }

        if let Some(max) = self.max_seed_distance {
            if max.is_nan() || max < 0.0 {
                return Err(invalid(format!("max_seed_distance must be non-negative, got {max}")));
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> OptimizeError {
    OptimizeError::InvalidParams { reason }
}
