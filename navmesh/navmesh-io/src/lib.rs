//! File I/O for navmesh-optimize.
//!
//! - **Import**: the level editor's JSON export (`cleanPoint`, parallel
//!   `x`/`y`/`z` arrays, `indices`, optional expected counts)
//! - **Report**: CSV timing rows for batch runs
//!
//! # Example
//!
//! ```no_run
//! use navmesh_io::{OptimizationReport, ReportRow, load_import};
//! use std::time::Instant;
//!
//! let import = load_import("JsonFiles/S 1.txt").unwrap();
//!
//! let start = Instant::now();
//! let mesh = navmesh_optimize::optimize(&import.clean_point, &import.vertices, &import.indices).unwrap();
//!
//! let mut report = OptimizationReport::new();
//! report.push(ReportRow::new(&mesh, 1, start.elapsed()));
//! report.save("report.csv").unwrap();
//!
//! print!("{}", import.expected.compare(&mesh));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod import;
mod report;

pub use error::{IoError, IoResult};
pub use import::{
    CountCheck, CountComparison, ExpectedCounts, NavMeshImport, load_import, parse_import,
    save_import,
};
pub use report::{OptimizationReport, REPORT_HEADER, ReportRow};
