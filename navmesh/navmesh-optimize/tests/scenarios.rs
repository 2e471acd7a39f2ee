//! End-to-end scenarios for the optimization pipeline.
//!
//! Run with: cargo test -p navmesh-optimize --test scenarios

use approx::assert_relative_eq;
use nalgebra::Point3;
use navmesh_optimize::{
    OptimizeError, OptimizeParams, dedup_vertices, optimize, optimize_with_params,
    validate_navmesh,
};

// =============================================================================
// Fixtures
// =============================================================================

fn square() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, 1.0),
    ]
}

/// A four-triangle fan around `center`.
fn fan(center: Point3<f64>, base: u32) -> (Vec<Point3<f64>>, Vec<u32>) {
    let vertices = vec![
        center,
        center + nalgebra::Vector3::new(1.0, 0.0, 0.0),
        center + nalgebra::Vector3::new(0.0, 0.0, 1.0),
        center + nalgebra::Vector3::new(-1.0, 0.0, 0.0),
        center + nalgebra::Vector3::new(0.0, 0.0, -1.0),
    ];
    let c = base;
    let indices = vec![
        c, c + 1, c + 2, //
        c, c + 2, c + 3, //
        c, c + 3, c + 4, //
        c, c + 4, c + 1,
    ];
    (vertices, indices)
}

/// A `size` x `size` unit lattice, optionally without the triangle `[v, v+1, v+size+1]`.
fn lattice(size: u32, skip: Option<u32>) -> (Vec<Point3<f64>>, Vec<u32>) {
    let vertices = (0..size * size)
        .map(|i| Point3::new(f64::from(i % size), 0.0, f64::from(i / size)))
        .collect();
    let mut indices = Vec::new();
    for z in 0..size - 1 {
        for x in 0..size - 1 {
            let v = z * size + x;
            if skip != Some(v) {
                indices.extend([v, v + 1, v + size + 1]);
            }
            indices.extend([v, v + size + 1, v + size]);
        }
    }
    (vertices, indices)
}

// =============================================================================
// Single square
// =============================================================================

#[test]
fn square_is_fully_connected() {
    let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &square(), &[0, 1, 2, 0, 2, 3]).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    for triangle in mesh.triangles() {
        assert_eq!(triangle.neighbors.len(), 1);
    }
    assert_eq!(mesh.triangles()[0].neighbors, vec![1]);
    assert_eq!(mesh.triangles()[1].neighbors, vec![0]);
}

#[test]
fn square_border_is_the_diagonal() {
    let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &square(), &[0, 1, 2, 0, 2, 3]).unwrap();

    for triangle in mesh.triangles() {
        assert_eq!(triangle.border_widths.len(), 1);
        assert_relative_eq!(triangle.border_widths[0], 2.0_f64.sqrt(), epsilon = 1e-12);
    }
}

#[test]
fn square_is_idempotent() {
    let clean = Point3::new(0.5, 0.0, 0.5);
    let once = optimize(&clean, &square(), &[0, 1, 2, 0, 2, 3]).unwrap();
    let twice = optimize(&clean, once.vertices(), &once.indices()).unwrap();

    assert_eq!(once.vertices(), twice.vertices());
    assert_eq!(once.indices(), twice.indices());
    assert_eq!(once.triangles(), twice.triangles());
    assert_eq!(once.vertices(), square().as_slice());
    assert!(!once.summary().had_changes());
    assert!(!twice.summary().had_changes());
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn close_pair_keeps_lowest_index() {
    let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.05, 0.0, 0.0)];
    let result = dedup_vertices(&vertices, &[], &OptimizeParams::default());

    assert_eq!(result.vertices, vec![Point3::new(0.0, 0.0, 0.0)]);
    assert_eq!(result.vertices_merged, 1);
}

#[test]
fn merge_distance_is_inclusive() {
    let params = OptimizeParams::default();
    let at = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.3, 0.0, 0.0)];
    let past = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.31, 0.0, 0.0)];

    assert_eq!(dedup_vertices(&at, &[], &params).vertices.len(), 1);
    assert_eq!(dedup_vertices(&past, &[], &params).vertices.len(), 2);
}

#[test]
fn close_pair_is_redirected_in_pipeline() {
    // Vertex 1 duplicates vertex 0; the second triangle only knows the duplicate.
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.05, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let indices = [0, 2, 3, 1, 3, 4];

    let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &vertices, &indices).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.vertices()[0], Point3::new(0.0, 0.0, 0.0));
    assert!(!mesh.vertices().contains(&Point3::new(0.05, 0.0, 0.0)));
    assert_eq!(mesh.indices(), vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.triangles()[0].neighbors, vec![1]);
}

// =============================================================================
// Connectivity
// =============================================================================

#[test]
fn only_fan_of_clean_point_survives() {
    let (mut vertices, mut indices) = fan(Point3::new(0.0, 0.0, 0.0), 0);
    let (vb, ib) = fan(Point3::new(50.0, 0.0, 50.0), 5);
    vertices.extend(vb);
    indices.extend(ib);

    let mesh = optimize(&Point3::new(0.1, 0.0, 0.1), &vertices, &indices).unwrap();

    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.triangle_count(), 4);
    assert!(mesh.vertices().iter().all(|v| v.x < 25.0 && v.z < 25.0));
    assert_eq!(mesh.summary().triangles_discarded, 4);

    let report = validate_navmesh(mesh.vertices(), mesh.triangles(), &OptimizeParams::default());
    assert!(report.is_connected());
}

#[test]
fn clean_point_picks_the_far_fan() {
    let (mut vertices, mut indices) = fan(Point3::new(0.0, 0.0, 0.0), 0);
    let (vb, ib) = fan(Point3::new(50.0, 0.0, 50.0), 5);
    vertices.extend(vb);
    indices.extend(ib);

    let mesh = optimize(&Point3::new(49.0, 0.0, 50.0), &vertices, &indices).unwrap();

    assert_eq!(mesh.triangle_count(), 4);
    assert!(mesh.vertices().iter().all(|v| v.x > 25.0));
}

#[test]
fn distant_clean_point_can_be_rejected() {
    let params = OptimizeParams::default().with_max_seed_distance(5.0);
    let err = optimize_with_params(
        &Point3::new(100.0, 0.0, 100.0),
        &square(),
        &[0, 1, 2, 0, 2, 3],
        &params,
    )
    .unwrap_err();

    assert!(matches!(err, OptimizeError::CleanPointOutOfRange { .. }));
}

#[test]
fn lone_triangles_are_unreachable() {
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let err = optimize(&Point3::origin(), &vertices, &[0, 1, 2]).unwrap_err();

    assert!(matches!(
        err,
        OptimizeError::NoReachableMesh {
            triangle_count: 1,
            ..
        }
    ));
}

// =============================================================================
// Hole filling
// =============================================================================

#[test]
fn missing_triangle_is_restored() {
    let (vertices, indices) = lattice(5, Some(6));
    let mesh = optimize(&Point3::new(0.1, 0.0, 0.1), &vertices, &indices).unwrap();

    assert_eq!(mesh.summary().triangles_added, 1);
    assert_eq!(mesh.triangle_count(), 32);

    let report = validate_navmesh(mesh.vertices(), mesh.triangles(), &OptimizeParams::default());
    assert!(!report.has_issues(), "{report}");
    assert_eq!(report.boundary_edge_count, 16);
}

#[test]
fn complete_lattice_gets_nothing_added() {
    let (vertices, indices) = lattice(5, None);
    let mesh = optimize(&Point3::new(2.0, 0.0, 2.0), &vertices, &indices).unwrap();

    assert_eq!(mesh.summary().triangles_added, 0);
    assert_eq!(mesh.summary().vertices_relaxed, 0);
    assert_eq!(mesh.triangle_count(), 32);
}

// =============================================================================
// Large coordinates
// =============================================================================

#[test]
fn wide_square_is_optimized() {
    let side = 10_000.0;
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(side, 0.0, 0.0),
        Point3::new(side, 0.0, side),
        Point3::new(0.0, 0.0, side),
    ];
    let mesh = optimize(&Point3::new(1.0, 0.0, 1.0), &vertices, &[0, 1, 2, 0, 2, 3]).unwrap();

    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.summary().triangles_added, 0);

    let report = validate_navmesh(mesh.vertices(), mesh.triangles(), &OptimizeParams::default());
    assert!(!report.has_issues(), "{report}");
}

#[test]
fn far_vertex_is_optimized() {
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0e12, 0.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let mesh = optimize(&Point3::new(0.5, 0.0, 0.5), &vertices, &[0, 1, 2, 0, 2, 3]).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

// =============================================================================
// Lookups
// =============================================================================

#[test]
fn lattice_lookups() {
    let (vertices, indices) = lattice(5, None);
    let mesh = optimize(&Point3::new(0.0, 0.0, 0.0), &vertices, &indices).unwrap();

    // Every triangle lies in a single 10-unit cell.
    assert_eq!(mesh.triangles_near(&Point3::new(1.0, 0.0, 1.0)).len(), 32);
    assert!(mesh.triangles_near(&Point3::new(100.0, 0.0, 100.0)).is_empty());

    for (v, _) in mesh.vertices().iter().enumerate() {
        let v = u32::try_from(v).unwrap();
        for &t in mesh.triangles_for_vertex(v) {
            assert!(mesh.triangles()[t].vertices.contains(&v));
        }
    }
}
