//! Mesh data model and file I/O for layered hexahedral meshing.
//!
//! This crate holds the types shared by the extrusion pipeline: the planar
//! quadrilateral base mesh, the triangulated reference surface and the
//! hexahedral volume mesh, along with readers and writers for the formats
//! they travel in.
//!
//! # Features
//!
//! - **Base mesh**: Gmsh MSH 2.2 reader (ASCII and binary), quadrilaterals
//!   with physical and elementary tags
//! - **Reference surface**: GTS and STL readers
//! - **Output**: Gmsh MSH 2.2 writer with a fixed-width layout, legacy VTK
//! - **Validation**: index, coordinate and degeneracy checks on inputs, a
//!   structural report for hexahedral meshes
//!
//! # Coordinate System
//!
//! Right-handed, with Z pointing up. Base meshes live in the XY plane; their
//! Z coordinate is ignored on read.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_core::{HexMesh, QuadMesh, TriSurface};
//!
//! let base = QuadMesh::load("base.msh").unwrap();
//! let surface = TriSurface::load("bathymetry.gts").unwrap();
//! println!(
//!     "{} quads over a surface of {} triangles",
//!     base.element_count(),
//!     surface.triangle_count()
//! );
//!
//! let hex = HexMesh::load("volume.msh").unwrap();
//! hex.save("volume.vtk").unwrap();
//! ```
//!
//! # Supported Formats
//!
//! | Format | Extension | Base mesh | Surface | Hex read | Hex write |
//! |--------|-----------|-----------|---------|----------|-----------|
//! | Gmsh   | `.msh`    | ✓         |         | ✓        | ✓         |
//! | GTS    | `.gts`    |           | ✓       |          |           |
//! | STL    | `.stl`    |           | ✓       |          |           |
//! | VTK    | `.vtk`    |           |         |          | ✓         |

mod error;
pub mod tracing_ext;
mod types;

pub mod gmsh;
pub mod gts;
pub mod io;
pub mod validate;
pub mod vtk;

pub use error::{ErrorCode, MeshError, MeshLocation, MeshResult, RecoverySuggestion};
pub use types::{ElementTags, HexMesh, QuadElement, QuadMesh, SurfaceBounds, TriSurface};

pub use io::{load_hex_mesh, load_quad_mesh, load_surface, save_hex_mesh, MeshFormat};
pub use validate::{validate_hex_mesh, validate_quad_mesh, validate_surface, HexMeshReport};

use std::path::Path;

impl QuadMesh {
    /// Load and validate a base mesh, format chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        io::load_quad_mesh(path.as_ref())
    }
}

impl TriSurface {
    /// Load and validate a reference surface, format chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        io::load_surface(path.as_ref())
    }
}

impl HexMesh {
    /// Load a hexahedral mesh.
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        io::load_hex_mesh(path.as_ref())
    }

    /// Save to `.msh` or `.vtk`.
    pub fn save(&self, path: impl AsRef<Path>) -> MeshResult<()> {
        io::save_hex_mesh(self, path.as_ref())
    }

    /// Structural report, see [`validate_hex_mesh`].
    pub fn validate(&self) -> HexMeshReport {
        validate::validate_hex_mesh(self)
    }
}
