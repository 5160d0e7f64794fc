//! Default command - extrude a base mesh along a reference surface.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_core::{QuadMesh, TriSurface};
use mesh_extrude::{extrude, ExtrudeParams, ExtrudeStats};
use serde::Serialize;

use crate::{output, Cli, ExtrusionOptions, OutputFormat};

#[derive(Serialize)]
struct ExtrudeReport {
    base: String,
    surface: String,
    output: String,
    success: bool,
    stats: ExtrudeStats,
}

pub fn run(
    base_path: &Path,
    surface_path: &Path,
    output_path: &Path,
    options: &ExtrusionOptions,
    cli: &Cli,
) -> Result<()> {
    let params = options.to_params()?;

    let base = QuadMesh::load(base_path)
        .with_context(|| format!("Failed to load base mesh from {:?}", base_path))?;
    let surface = TriSurface::load(surface_path)
        .with_context(|| format!("Failed to load reference surface from {:?}", surface_path))?;

    run_extrusion(
        &base,
        &surface,
        &base_path.display().to_string(),
        surface_path,
        output_path,
        &params,
        cli,
    )
}

/// Extrude an already loaded base mesh and write the result.
///
/// Nothing is written unless the whole extrusion succeeded.
pub fn run_extrusion(
    base: &QuadMesh,
    surface: &TriSurface,
    base_label: &str,
    surface_path: &Path,
    output_path: &Path,
    params: &ExtrudeParams,
    cli: &Cli,
) -> Result<()> {
    output::info(
        &format!(
            "Extruding {} quadrilaterals into {} layers...",
            base.element_count(),
            params.layers
        ),
        cli.format,
        cli.quiet,
    );

    let result = extrude(base, surface, params).context("Extrusion failed")?;

    result
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save hexahedral mesh to {:?}", output_path))?;

    let stats = result.stats;
    if stats.degenerate_columns > 0 {
        output::warning(
            &format!("{} degenerate columns were collapsed", stats.degenerate_columns),
            cli.format,
            cli.quiet,
        );
    }

    match cli.format {
        OutputFormat::Json => {
            let report = ExtrudeReport {
                base: base_label.to_string(),
                surface: surface_path.display().to_string(),
                output: output_path.display().to_string(),
                success: true,
                stats,
            };
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                print_text(&stats, output_path);
            }
        }
    }

    Ok(())
}

fn print_text(stats: &ExtrudeStats, output_path: &Path) {
    let b = &stats.surface_bounds;
    println!("Bounding box: ");
    println!(" x ranges from {:.6} to {:.6}", b.min.x, b.max.x);
    println!(" y ranges from {:.6} to {:.6}", b.min.y, b.max.y);
    println!(" z ranges from {:.6} to {:.6}", b.min.z, b.max.z);

    output::success(
        &format!("Hexahedral mesh saved to {}", output_path.display()),
        OutputFormat::Text,
        false,
    );
    println!("  {}: {}", "Layers".cyan(), stats.layers);
    println!("  {}: {}", "Nodes".cyan(), stats.node_count);
    println!("  {}: {}", "Hexahedra".cyan(), stats.element_count);
    if stats.element_count > 0 {
        println!(
            "  {}: {:.3} to {:.3}",
            "Layer thickness".cyan(),
            stats.dz_min,
            stats.dz_max
        );
    }
}
