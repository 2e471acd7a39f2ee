//! Timing reports as CSV.
//!
//! One row per optimized mesh:
//!
//! ```text
//! AverageCount,VertexCount,IndicesCount,TriangleCount,TotalTime,AverageTime
//! 10,4,6,2,1.250,0.125
//! ```
//!
//! Times are in milliseconds.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use navmesh_optimize::NavMeshOptimized;
use tracing::info;

use crate::error::IoResult;

/// CSV header line.
pub const REPORT_HEADER: &str =
    "AverageCount,VertexCount,IndicesCount,TriangleCount,TotalTime,AverageTime";

/// Timing of repeated runs on one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow {
    /// Number of runs the time was summed over.
    pub average_count: usize,
    /// Final vertex count.
    pub vertex_count: usize,
    /// Final flat index count.
    pub indices_count: usize,
    /// Final triangle count.
    pub triangle_count: usize,
    /// Summed wall-clock time of all runs.
    pub total_time: Duration,
}

impl ReportRow {
    /// A row for `runs` repeats producing `mesh` in `total_time`.
    #[must_use]
    pub fn new(mesh: &NavMeshOptimized, runs: usize, total_time: Duration) -> Self {
        Self {
            average_count: runs,
            vertex_count: mesh.vertex_count(),
            indices_count: mesh.index_count(),
            triangle_count: mesh.triangle_count(),
            total_time,
        }
    }

    /// Total time in milliseconds.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_time.as_secs_f64() * 1000.0
    }

    /// Mean time per run in milliseconds, zero without runs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_ms(&self) -> f64 {
        if self.average_count == 0 {
            0.0
        } else {
            self.total_ms() / self.average_count as f64
        }
    }

    fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{:.3},{:.3}",
            self.average_count,
            self.vertex_count,
            self.indices_count,
            self.triangle_count,
            self.total_ms(),
            self.average_ms()
        )
    }
}

/// A collection of [`ReportRow`]s.
#[derive(Debug, Clone, Default)]
pub struct OptimizationReport {
    rows: Vec<ReportRow>,
}

impl OptimizationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    /// All rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the header and every row.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{REPORT_HEADER}")?;
        for row in &self.rows {
            row.write_csv(out)?;
        }
        Ok(())
    }

    /// Write the report to a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv(&mut writer)?;
        writer.flush()?;

        info!(path = %path.display(), rows = self.rows.len(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(runs: usize, millis: u64) -> ReportRow {
        ReportRow {
            average_count: runs,
            vertex_count: 4,
            indices_count: 6,
            triangle_count: 2,
            total_time: Duration::from_millis(millis),
        }
    }

    #[test]
    fn average_time() {
        assert_relative_eq!(row(4, 10).total_ms(), 10.0);
        assert_relative_eq!(row(4, 10).average_ms(), 2.5);
        assert_relative_eq!(row(0, 10).average_ms(), 0.0);
    }

    #[test]
    fn csv_layout() {
        let mut report = OptimizationReport::new();
        report.push(row(4, 10));
        report.push(row(1, 3));

        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines[1], "4,4,6,2,10.000,2.500");
        assert_eq!(lines[2], "1,4,6,2,3.000,3.000");
    }

    #[test]
    fn empty_report_has_header() {
        let report = OptimizationReport::new();
        assert!(report.is_empty());

        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{REPORT_HEADER}\n"));
    }

    #[test]
    fn save_to_file() {
        let mut report = OptimizationReport::new();
        report.push(row(2, 8));

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("report.csv");
        report.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(REPORT_HEADER));
        assert!(text.contains("2,4,6,2,8.000,4.000"));
        assert_eq!(report.len(), 1);
    }
}
