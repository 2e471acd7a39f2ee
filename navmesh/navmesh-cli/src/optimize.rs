//! The `optimize` command.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use navmesh_io::{NavMeshImport, OptimizationReport, ReportRow, load_import, save_import};
use navmesh_optimize::{NavMeshOptimized, OptimizeParams, optimize_with_params};
use tracing::info;

/// Options of one `optimize` invocation.
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    pub repeat: u32,
    pub csv: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub check: bool,
    pub params: OptimizeParams,
}

pub fn run(options: &RunOptions) -> Result<()> {
    let repeat = usize::try_from(options.repeat)?;
    let mut report = OptimizationReport::new();
    let mut mismatched = Vec::new();

    if let Some(dir) = &options.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for input in &options.inputs {
        let import = load_import(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;

        println!("Optimization for: {}", input.display());
        println!("  Start vertex count: {}", import.vertex_count());
        println!("  Start indices count: {}", import.indices.len());

        let (mesh, total_time) = run_repeated(&import, repeat, &options.params)
            .with_context(|| format!("Failed to optimize {}", input.display()))?;

        println!("  Final vertex count: {}", mesh.vertex_count());
        println!("  Final indices count: {}", mesh.index_count());
        println!("  Final triangle count: {}", mesh.triangle_count());
        println!("  {}", mesh.summary());

        if !import.expected.is_empty() {
            let comparison = import.expected.compare(&mesh);
            for line in comparison.to_string().lines() {
                println!("  {line}");
            }
            if !comparison.all_match() {
                mismatched.push(input.clone());
            }
        }

        let row = ReportRow::new(&mesh, repeat, total_time);
        if repeat > 1 {
            println!("  Repeat count: {repeat}");
            println!("  Total time for repeats: {:.3}(ms)", row.total_ms());
        }
        println!("  Average time: {:.3}(ms)", row.average_ms());
        println!();
        report.push(row);

        if let Some(dir) = &options.output {
            let path = output_path(dir, input);
            save_import(&NavMeshImport::from_optimized(import.clean_point, &mesh), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Optimized mesh written");
        }
    }

    if let Some(csv) = &options.csv {
        report
            .save(csv)
            .with_context(|| format!("Failed to write report {}", csv.display()))?;
    }

    if options.check && !mismatched.is_empty() {
        bail!(
            "{} of {} files did not match their expected counts",
            mismatched.len(),
            options.inputs.len()
        );
    }

    Ok(())
}

/// Optimize `repeat` times on private copies, returning the last mesh and the summed time.
fn run_repeated(
    import: &NavMeshImport,
    repeat: usize,
    params: &OptimizeParams,
) -> Result<(NavMeshOptimized, Duration)> {
    let mut total = Duration::ZERO;
    let mut last = None;

    for run in 0..repeat {
        let vertices = import.vertices.clone();
        let indices = import.indices.clone();

        let start = Instant::now();
        let mesh = optimize_with_params(&import.clean_point, &vertices, &indices, params)?;
        let elapsed = start.elapsed();
        total += elapsed;

        info!(run = run + 1, ms = elapsed.as_secs_f64() * 1000.0, "Run finished");
        last = Some(mesh);
    }

    match last {
        Some(mesh) => Ok((mesh, total)),
        None => bail!("repeat count must be at least 1"),
    }
}

fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "navmesh.txt".into(), |n| n.to_string_lossy().into_owned());
    dir.join(name)
}
