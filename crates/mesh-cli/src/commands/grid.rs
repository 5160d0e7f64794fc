//! grid command - extrude a structured footprint over the surface extent.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_core::{QuadMesh, TriSurface};

use super::extrude::run_extrusion;
use crate::{output, Cli, ExtrusionOptions};

pub fn run(
    surface_path: &Path,
    output_path: &Path,
    nx: usize,
    ny: usize,
    tag: i32,
    options: &ExtrusionOptions,
    cli: &Cli,
) -> Result<()> {
    let params = options.to_params()?;

    let surface = TriSurface::load(surface_path)
        .with_context(|| format!("Failed to load reference surface from {:?}", surface_path))?;
    let bounds = surface
        .bounds()
        .context("Reference surface has no vertices")?;

    let (min, max) = bounds.xy_range();
    let base = QuadMesh::structured_grid(min, max, nx, ny, tag)
        .context("Failed to build footprint grid")?;

    output::info(
        &format!(
            "Footprint grid {} x {} over ({:.3}, {:.3}) to ({:.3}, {:.3})",
            nx, ny, min.x, min.y, max.x, max.y
        ),
        cli.format,
        cli.quiet,
    );

    run_extrusion(
        &base,
        &surface,
        &format!("grid {}x{}", nx, ny),
        surface_path,
        output_path,
        &params,
        cli,
    )
}
