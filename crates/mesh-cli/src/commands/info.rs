//! info command - display statistics for a base mesh, surface, or volume.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use mesh_core::{HexMesh, MeshError, MeshFormat, QuadMesh, TriSurface};
use nalgebra::Point3;
use serde::Serialize;

use crate::{output, Cli, OutputFormat};

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum MeshKind {
    BaseMesh,
    Surface,
    Volume,
}

impl MeshKind {
    fn label(&self) -> &'static str {
        match self {
            MeshKind::BaseMesh => "quadrilateral base mesh",
            MeshKind::Surface => "triangulated surface",
            MeshKind::Volume => "hexahedral volume mesh",
        }
    }
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
}

impl BoundsInfo {
    fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
        }
    }
}

#[derive(Serialize)]
struct VolumeCheck {
    valid: bool,
    inverted_elements: usize,
    repeated_node_elements: usize,
}

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    format: &'static str,
    kind: MeshKind,
    nodes: usize,
    elements: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_check: Option<VolumeCheck>,
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let format = MeshFormat::from_path(input)
        .with_context(|| format!("Unrecognized file extension for {:?}", input))?;

    let info = match format {
        MeshFormat::Gts | MeshFormat::Stl => surface_info(input, format)?,
        MeshFormat::Gmsh => gmsh_info(input)?,
        MeshFormat::Vtk => bail!("VTK files are output only: {:?}", input),
    };

    match cli.format {
        OutputFormat::Json => output::print(&info, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                print_text(&info);
            }
        }
    }

    Ok(())
}

fn surface_info(input: &Path, format: MeshFormat) -> Result<MeshInfo> {
    let surface = TriSurface::load(input)
        .with_context(|| format!("Failed to load surface from {:?}", input))?;

    Ok(MeshInfo {
        path: input.display().to_string(),
        format: format.name(),
        kind: MeshKind::Surface,
        nodes: surface.vertex_count(),
        elements: surface.triangle_count(),
        bounds: surface.bounds().map(|b| BoundsInfo::new(b.min, b.max)),
        volume_check: None,
    })
}

/// A Gmsh file is reported as a volume if it holds hexahedra, otherwise as
/// a base mesh.
fn gmsh_info(input: &Path) -> Result<MeshInfo> {
    match HexMesh::load(input) {
        Ok(mesh) => Ok(volume_info(input, &mesh)),
        Err(MeshError::EmptyMesh { .. }) => {
            let base = QuadMesh::load(input)
                .with_context(|| format!("Failed to load base mesh from {:?}", input))?;
            Ok(MeshInfo {
                path: input.display().to_string(),
                format: MeshFormat::Gmsh.name(),
                kind: MeshKind::BaseMesh,
                nodes: base.node_count(),
                elements: base.element_count(),
                bounds: base.bounds().map(|(min, max)| {
                    BoundsInfo::new(Point3::new(min.x, min.y, 0.0), Point3::new(max.x, max.y, 0.0))
                }),
                volume_check: None,
            })
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load mesh from {:?}", input)),
    }
}

fn volume_info(input: &Path, mesh: &HexMesh) -> MeshInfo {
    let report = mesh.validate();
    MeshInfo {
        path: input.display().to_string(),
        format: MeshFormat::Gmsh.name(),
        kind: MeshKind::Volume,
        nodes: mesh.node_count(),
        elements: mesh.element_count(),
        bounds: mesh.bounds().map(|(min, max)| BoundsInfo::new(min, max)),
        volume_check: Some(VolumeCheck {
            valid: report.is_valid(),
            inverted_elements: report.inverted_elements,
            repeated_node_elements: report.repeated_node_elements,
        }),
    }
}

fn print_text(info: &MeshInfo) {
    println!("{}", "Mesh Information".bold().underline());
    println!("  {}: {}", "File".cyan(), info.path);
    println!("  {}: {} ({})", "Kind".cyan(), info.kind.label(), info.format);
    println!("  {}: {}", "Nodes".cyan(), info.nodes);
    println!("  {}: {}", "Elements".cyan(), info.elements);

    if let Some(ref b) = info.bounds {
        println!("Bounding box: ");
        println!(" x ranges from {:.6} to {:.6}", b.min[0], b.max[0]);
        println!(" y ranges from {:.6} to {:.6}", b.min[1], b.max[1]);
        println!(" z ranges from {:.6} to {:.6}", b.min[2], b.max[2]);
    }

    if let Some(ref check) = info.volume_check {
        let status = if check.valid {
            "yes".green()
        } else {
            "NO".red()
        };
        println!("  {}: {}", "Valid".cyan(), status);
        if check.inverted_elements > 0 {
            println!(
                "  {}: {}",
                "Inverted elements".yellow(),
                check.inverted_elements
            );
        }
        if check.repeated_node_elements > 0 {
            println!(
                "  {}: {}",
                "Repeated-node elements".yellow(),
                check.repeated_node_elements
            );
        }
    }
}
