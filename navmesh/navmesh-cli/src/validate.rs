//! The `validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use navmesh_io::load_import;
use navmesh_optimize::{OptimizeParams, optimize_with_params, validate_navmesh};

pub fn run(inputs: &[PathBuf], params: &OptimizeParams) -> Result<()> {
    let mut failed = 0;

    for input in inputs {
        let import = load_import(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;
        let mesh = optimize_with_params(&import.clean_point, &import.vertices, &import.indices, params)
            .with_context(|| format!("Failed to optimize {}", input.display()))?;

        let report = validate_navmesh(mesh.vertices(), mesh.triangles(), params);
        println!("{}", input.display());
        print!("{report}");
        println!();

        if report.has_issues() {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} meshes have issues", inputs.len());
    }
    Ok(())
}
