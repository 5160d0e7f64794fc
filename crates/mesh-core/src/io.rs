//! Format dispatch for base meshes, reference surfaces and hexahedral output.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::tracing_ext::log_io_operation;
use crate::validate::{validate_quad_mesh, validate_surface};
use crate::{gmsh, gts, vtk, HexMesh, QuadMesh, TriSurface};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Gmsh MSH 2.2 (`.msh`).
    Gmsh,
    /// GNU Triangulated Surface (`.gts`).
    Gts,
    /// STL, ASCII or binary (`.stl`).
    Stl,
    /// Legacy VTK (`.vtk`), output only.
    Vtk,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "msh" => Some(MeshFormat::Gmsh),
                "gts" => Some(MeshFormat::Gts),
                "stl" => Some(MeshFormat::Stl),
                "vtk" => Some(MeshFormat::Vtk),
                _ => None,
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Gmsh => "gmsh",
            MeshFormat::Gts => "gts",
            MeshFormat::Stl => "stl",
            MeshFormat::Vtk => "vtk",
        }
    }
}

fn detect(path: &Path) -> MeshResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| MeshError::unsupported_format(path))
}

/// Load and validate a quadrilateral base mesh (Gmsh only).
pub fn load_quad_mesh(path: &Path) -> MeshResult<QuadMesh> {
    let format = detect(path)?;
    let result = read_quad_mesh(path, format);
    log_io_operation("load_base_mesh", path, Some(format.name()), result.is_ok());
    result
}

fn read_quad_mesh(path: &Path, format: MeshFormat) -> MeshResult<QuadMesh> {
    let mesh = match format {
        MeshFormat::Gmsh => gmsh::read_quad_mesh(path)?,
        _ => return Err(MeshError::unsupported_format(path)),
    };
    validate_quad_mesh(&mesh)?;

    if let Some((min, max)) = mesh.bounds() {
        debug!(
            "Base mesh footprint: [{:.1}, {:.1}] to [{:.1}, {:.1}]",
            min.x, min.y, max.x, max.y
        );
    }
    Ok(mesh)
}

/// Load and validate a reference surface (GTS or STL).
pub fn load_surface(path: &Path) -> MeshResult<TriSurface> {
    let format = detect(path)?;
    let result = read_surface(path, format);
    log_io_operation("load_surface", path, Some(format.name()), result.is_ok());
    result
}

fn read_surface(path: &Path, format: MeshFormat) -> MeshResult<TriSurface> {
    let surface = match format {
        MeshFormat::Gts => gts::read_gts(path)?,
        MeshFormat::Stl => load_stl_surface(path)?,
        _ => return Err(MeshError::unsupported_format(path)),
    };
    validate_surface(&surface)?;

    if let Some(bounds) = surface.bounds() {
        let (z_min, z_max) = bounds.z_range();
        debug!(z_min, z_max, "Surface vertical range");
    }
    Ok(surface)
}

/// Load a surface from STL (binary or ASCII).
fn load_stl_surface(path: &Path) -> MeshResult<TriSurface> {
    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader)
        .map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64))
        .collect();

    let triangles: Vec<[u32; 3]> = stl
        .faces
        .iter()
        .map(|face| {
            [
                face.vertices[0] as u32,
                face.vertices[1] as u32,
                face.vertices[2] as u32,
            ]
        })
        .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
        .collect();

    info!(
        vertices = stl.vertices.len(),
        triangles = triangles.len(),
        "Loaded STL surface from {:?}",
        path
    );
    Ok(TriSurface::new(vertices, triangles))
}

/// Load a hexahedral mesh (Gmsh only).
pub fn load_hex_mesh(path: &Path) -> MeshResult<HexMesh> {
    match detect(path)? {
        MeshFormat::Gmsh => gmsh::read_hex_mesh(path),
        _ => Err(MeshError::unsupported_format(path)),
    }
}

/// Save a hexahedral mesh, choosing Gmsh or VTK from the extension.
pub fn save_hex_mesh(mesh: &HexMesh, path: &Path) -> MeshResult<()> {
    let format = detect(path)?;
    let result = match format {
        MeshFormat::Gmsh => gmsh::write_hex_mesh(mesh, path),
        MeshFormat::Vtk => vtk::write_vtk(mesh, path),
        _ => Err(MeshError::unsupported_format(path)),
    };
    log_io_operation("save_hex_mesh", path, Some(format.name()), result.is_ok());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("a.MSH")), Some(MeshFormat::Gmsh));
        assert_eq!(MeshFormat::from_path(Path::new("b.gts")), Some(MeshFormat::Gts));
        assert_eq!(MeshFormat::from_path(Path::new("c.stl")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("d.vtk")), Some(MeshFormat::Vtk));
        assert_eq!(MeshFormat::from_path(Path::new("e.obj")), None);
        assert_eq!(MeshFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_surface_rejects_gmsh() {
        let err = load_surface(Path::new("terrain.msh")).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_save_rejects_stl() {
        let err = save_hex_mesh(&HexMesh::new(), Path::new("out.stl")).unwrap_err();
        match err {
            MeshError::UnsupportedFormat { extension } => {
                assert_eq!(extension.as_deref(), Some("stl"));
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_load_ascii_stl_surface() {
        let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
        write!(
            file,
            "solid terrain
facet normal 0 0 1
outer loop
vertex 0 0 -5
vertex 10 0 -5
vertex 0 10 -7
endloop
endfacet
endsolid terrain
"
        )
        .unwrap();
        file.flush().unwrap();

        let surface = load_surface(file.path()).unwrap();
        assert_eq!(surface.vertex_count(), 3);
        assert_eq!(surface.triangle_count(), 1);
        assert_eq!(surface.bounds().unwrap().z_range(), (-7.0, -5.0));
    }
}
