//! Raw navmesh exports.
//!
//! The level editor writes one JSON object per mesh:
//!
//! ```text
//! {
//!   "cleanPoint": { "x": 0.5, "y": 0.0, "z": 0.5 },
//!   "x": [0.0, 1.0, ...],
//!   "y": [0.0, 0.0, ...],
//!   "z": [0.0, 0.0, ...],
//!   "indices": [0, 1, 2, ...],
//!   "finalVertexCount": 4,
//!   "finalIndicesCount": 6,
//!   "finalTriangleCount": 2
//! }
//! ```
//!
//! The three `final*` counts are optional and only used to check a result.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use navmesh_optimize::NavMeshOptimized;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, IoResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImport {
    clean_point: RawPoint,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_vertex_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_indices_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_triangle_count: Option<usize>,
}

/// Counts an export claims the optimized mesh should have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedCounts {
    /// Expected final vertex count.
    pub vertices: Option<usize>,
    /// Expected final flat index count.
    pub indices: Option<usize>,
    /// Expected final triangle count.
    pub triangles: Option<usize>,
}

impl ExpectedCounts {
    /// The counts of an optimized mesh.
    #[must_use]
    pub fn of(mesh: &NavMeshOptimized) -> Self {
        Self {
            vertices: Some(mesh.vertex_count()),
            indices: Some(mesh.index_count()),
            triangles: Some(mesh.triangle_count()),
        }
    }

    /// Whether no count is given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_none() && self.indices.is_none() && self.triangles.is_none()
    }

    /// Compare the given counts with `mesh`.
    ///
    /// Counts that are not given are skipped.
    #[must_use]
    pub fn compare(&self, mesh: &NavMeshOptimized) -> CountComparison {
        let checks = [
            ("Vertex", self.vertices, mesh.vertex_count()),
            ("Indices", self.indices, mesh.index_count()),
            ("Triangle", self.triangles, mesh.triangle_count()),
        ]
        .into_iter()
        .filter_map(|(label, expected, actual)| {
            expected.map(|expected| CountCheck {
                label,
                expected,
                actual,
            })
        })
        .collect();

        CountComparison { checks }
    }
}

/// One expected-versus-actual count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountCheck {
    /// What is counted.
    pub label: &'static str,
    /// Count from the export.
    pub expected: usize,
    /// Count of the optimized mesh.
    pub actual: usize,
}

impl CountCheck {
    /// Whether both counts agree.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }

    /// `expected - actual`.
    #[must_use]
    pub fn difference(&self) -> i64 {
        let expected = i64::try_from(self.expected).unwrap_or(i64::MAX);
        let actual = i64::try_from(self.actual).unwrap_or(i64::MAX);
        expected - actual
    }
}

/// Result of [`ExpectedCounts::compare`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountComparison {
    /// The individual checks, vertices first.
    pub checks: Vec<CountCheck>,
}

impl CountComparison {
    /// Whether every given count matches.
    #[must_use]
    pub fn all_match(&self) -> bool {
        self.checks.iter().all(CountCheck::matches)
    }
}

impl fmt::Display for CountComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(
                f,
                "{} count match: {} | {}",
                check.label,
                check.matches(),
                check.difference()
            )?;
        }
        Ok(())
    }
}

/// A raw navmesh as exported by the level editor.
#[derive(Debug, Clone, PartialEq)]
pub struct NavMeshImport {
    /// A point known to lie on the walkable area.
    pub clean_point: Point3<f64>,
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Flat triangle index list.
    pub indices: Vec<u32>,
    /// Optional counts to check the optimized mesh against.
    pub expected: ExpectedCounts,
}

impl NavMeshImport {
    /// Build an export from an optimized mesh, with its own counts as expected.
    ///
    /// Loading the result and optimizing it again should reproduce the counts.
    #[must_use]
    pub fn from_optimized(clean_point: Point3<f64>, mesh: &NavMeshOptimized) -> Self {
        Self {
            clean_point,
            vertices: mesh.vertices().to_vec(),
            indices: mesh.indices(),
            expected: ExpectedCounts::of(mesh),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete triangles in the index list.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn from_raw(raw: RawImport) -> IoResult<Self> {
        if raw.x.len() != raw.y.len() || raw.x.len() != raw.z.len() {
            return Err(IoError::MismatchedCoordinates {
                x: raw.x.len(),
                y: raw.y.len(),
                z: raw.z.len(),
            });
        }

        let RawPoint { x, y, z } = raw.clean_point;
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(IoError::invalid_content("clean point is not finite"));
        }

        let vertices = raw
            .x
            .iter()
            .zip(&raw.y)
            .zip(&raw.z)
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
            .collect();

        Ok(Self {
            clean_point: Point3::new(x, y, z),
            vertices,
            indices: raw.indices,
            expected: ExpectedCounts {
                vertices: raw.final_vertex_count,
                indices: raw.final_indices_count,
                triangles: raw.final_triangle_count,
            },
        })
    }

    fn to_raw(&self) -> RawImport {
        RawImport {
            clean_point: RawPoint {
                x: self.clean_point.x,
                y: self.clean_point.y,
                z: self.clean_point.z,
            },
            x: self.vertices.iter().map(|v| v.x).collect(),
            y: self.vertices.iter().map(|v| v.y).collect(),
            z: self.vertices.iter().map(|v| v.z).collect(),
            indices: self.indices.clone(),
            final_vertex_count: self.expected.vertices,
            final_indices_count: self.expected.indices,
            final_triangle_count: self.expected.triangles,
        }
    }
}

/// Parse an export from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, a field is missing, or the
/// coordinate arrays differ in length.
///
/// # Example
///
/// ```
/// use navmesh_io::parse_import;
///
/// let json = r#"{
///     "cleanPoint": { "x": 0.5, "y": 0.0, "z": 0.5 },
///     "x": [0.0, 1.0, 1.0, 0.0],
///     "y": [0.0, 0.0, 0.0, 0.0],
///     "z": [0.0, 0.0, 1.0, 1.0],
///     "indices": [0, 1, 2, 0, 2, 3]
/// }"#;
///
/// let import = parse_import(json).unwrap();
/// assert_eq!(import.vertex_count(), 4);
/// assert!(import.expected.is_empty());
/// ```
pub fn parse_import(json: &str) -> IoResult<NavMeshImport> {
    let raw: RawImport = serde_json::from_str(json)?;
    NavMeshImport::from_raw(raw)
}

/// Load an export from a file.
///
/// The editor writes these with a `.txt` extension; any extension is accepted.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, otherwise the
/// errors of [`parse_import`].
///
/// # Example
///
/// ```no_run
/// use navmesh_io::load_import;
///
/// let import = load_import("JsonFiles/S 1.txt").unwrap();
/// println!("{} vertices", import.vertex_count());
/// ```
pub fn load_import<P: AsRef<Path>>(path: P) -> IoResult<NavMeshImport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(path, e))?;

    let raw: RawImport = serde_json::from_reader(BufReader::new(file))?;
    let import = NavMeshImport::from_raw(raw)?;

    debug!(
        path = %path.display(),
        vertices = import.vertex_count(),
        indices = import.indices.len(),
        "Loaded navmesh export"
    );
    Ok(import)
}

/// Write an export to a file in the editor's JSON format.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_import<P: AsRef<Path>>(import: &NavMeshImport, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &import.to_raw())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SQUARE: &str = r#"{
        "cleanPoint": { "x": 0.5, "y": 0.25, "z": 0.5 },
        "x": [0.0, 1.0, 1.0, 0.0],
        "y": [0.0, 0.0, 0.5, 0.0],
        "z": [0.0, 0.0, 1.0, 1.0],
        "indices": [0, 1, 2, 0, 2, 3],
        "finalVertexCount": 4,
        "finalIndicesCount": 6,
        "finalTriangleCount": 2
    }"#;

    fn optimized_square() -> NavMeshOptimized {
        let import = parse_import(SQUARE).unwrap();
        navmesh_optimize::optimize(&import.clean_point, &import.vertices, &import.indices).unwrap()
    }

    #[test]
    fn parses_editor_format() {
        let import = parse_import(SQUARE).unwrap();

        assert_eq!(import.vertex_count(), 4);
        assert_eq!(import.triangle_count(), 2);
        assert_relative_eq!(import.clean_point.y, 0.25);
        assert_relative_eq!(import.vertices[2].y, 0.5);
        assert_eq!(import.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(import.expected.vertices, Some(4));
        assert_eq!(import.expected.indices, Some(6));
        assert_eq!(import.expected.triangles, Some(2));
    }

    #[test]
    fn rejects_mismatched_arrays() {
        let json = r#"{
            "cleanPoint": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "x": [0.0, 1.0], "y": [0.0], "z": [0.0, 1.0],
            "indices": []
        }"#;

        let err = parse_import(json).unwrap_err();
        assert!(matches!(
            err,
            IoError::MismatchedCoordinates { x: 2, y: 1, z: 2 }
        ));
    }

    #[test]
    fn rejects_negative_index() {
        let json = r#"{
            "cleanPoint": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "x": [0.0], "y": [0.0], "z": [0.0],
            "indices": [-1, 0, 0]
        }"#;

        assert!(matches!(parse_import(json), Err(IoError::Json(_))));
    }

    #[test]
    fn rejects_missing_clean_point() {
        let json = r#"{ "x": [], "y": [], "z": [], "indices": [] }"#;
        assert!(matches!(parse_import(json), Err(IoError::Json(_))));
    }

    #[test]
    fn compare_counts() {
        let mesh = optimized_square();
        let comparison = parse_import(SQUARE).unwrap().expected.compare(&mesh);

        assert_eq!(comparison.checks.len(), 3);
        assert!(comparison.all_match());
        assert!(format!("{comparison}").contains("Vertex count match: true | 0"));

        let off = ExpectedCounts {
            triangles: Some(5),
            ..ExpectedCounts::default()
        };
        let comparison = off.compare(&mesh);
        assert_eq!(comparison.checks.len(), 1);
        assert!(!comparison.all_match());
        assert_eq!(comparison.checks[0].difference(), 3);
    }

    #[test]
    fn roundtrip_file() {
        let mesh = optimized_square();
        let export = NavMeshImport::from_optimized(Point3::new(0.5, 0.0, 0.5), &mesh);

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("square.txt");
        save_import(&export, &path).unwrap();

        let loaded = load_import(&path).unwrap();
        assert_eq!(loaded, export);
        assert_eq!(loaded.expected, ExpectedCounts::of(&mesh));
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_import("nonexistent_navmesh_12345.txt");
        if let Err(IoError::FileNotFound { path }) = result {
            assert!(path.to_string_lossy().contains("nonexistent"));
        } else {
            panic!("expected FileNotFound");
        }
    }
}
