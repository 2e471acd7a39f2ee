//! Command-line flags for `OptimizeParams`.

use clap::Args;
use navmesh_optimize::OptimizeParams;

/// Pipeline tolerances, one flag per `OptimizeParams` field.
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// Distance at or below which two vertices merge
    #[arg(long, default_value_t = 0.3)]
    overlap_distance: f64,

    /// Grid cell size for deduplication and hole filling
    #[arg(long, default_value_t = 5.0)]
    dedup_group_size: f64,

    /// Grid cell size for the result's triangle index
    #[arg(long, default_value_t = 10.0)]
    index_group_size: f64,

    /// Barycentric weight tolerance of the point-in-triangle test
    #[arg(long, default_value_t = 0.001)]
    point_tolerance: f64,

    /// Bounding box shrink of the segment intersection test
    #[arg(long, default_value_t = 0.001)]
    segment_tolerance: f64,

    /// Extra push past the nearest edge when relaxing vertices
    #[arg(long, default_value_t = 0.01)]
    relax_epsilon: f64,

    /// Maximum neighbors kept per triangle
    #[arg(long, default_value_t = 3)]
    max_neighbors: usize,

    /// Reject a clean point farther than this from the mesh
    #[arg(long)]
    max_seed_distance: Option<f64>,

    /// Skip relaxation and hole filling
    #[arg(long)]
    no_fill_holes: bool,
}

impl ParamArgs {
    /// Build the pipeline parameters. Validation happens in the pipeline.
    pub fn to_params(&self) -> OptimizeParams {
        let params = OptimizeParams::default()
            .with_overlap_distance(self.overlap_distance)
            .with_dedup_group_size(self.dedup_group_size)
            .with_index_group_size(self.index_group_size)
            .with_point_tolerance(self.point_tolerance)
            .with_segment_tolerance(self.segment_tolerance)
            .with_relax_epsilon(self.relax_epsilon)
            .with_max_neighbors(self.max_neighbors)
            .with_fill_holes(!self.no_fill_holes);

        match self.max_seed_distance {
            Some(distance) => params.with_max_seed_distance(distance),
            None => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        params: ParamArgs,
    }

    #[test]
    fn defaults_match_library() {
        let cli = TestCli::parse_from(["test"]);
        let params = cli.params.to_params();
        let defaults = OptimizeParams::default();

        assert!((params.overlap_distance - defaults.overlap_distance).abs() < f64::EPSILON);
        assert!((params.dedup_group_size - defaults.dedup_group_size).abs() < f64::EPSILON);
        assert!((params.index_group_size - defaults.index_group_size).abs() < f64::EPSILON);
        assert!((params.relax_epsilon - defaults.relax_epsilon).abs() < f64::EPSILON);
        assert_eq!(params.max_neighbors, defaults.max_neighbors);
        assert_eq!(params.max_seed_distance, None);
        assert!(params.fill_holes);
    }

    #[test]
    fn flags_override() {
        let cli = TestCli::parse_from([
            "test",
            "--overlap-distance",
            "0.5",
            "--max-seed-distance",
            "12",
            "--no-fill-holes",
        ]);
        let params = cli.params.to_params();

        assert!((params.overlap_distance - 0.5).abs() < f64::EPSILON);
        assert_eq!(params.max_seed_distance, Some(12.0));
        assert!(!params.fill_holes);
    }
}
