//! Legacy VTK output for hexahedral meshes.
//!
//! Writes an ASCII `UNSTRUCTURED_GRID` with one `VTK_HEXAHEDRON` cell per
//! element and the physical tag as integer cell data, which is enough to
//! inspect an extruded mesh in ParaView.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{MeshError, MeshResult};
use crate::HexMesh;

/// VTK cell type code for an 8-node hexahedron.
pub const VTK_HEXAHEDRON: u8 = 12;

/// Write a hexahedral mesh as legacy VTK.
pub fn write_vtk(mesh: &HexMesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_vtk_to(mesh, &mut writer).map_err(|e| MeshError::io_write(path, e))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;

    info!(
        points = mesh.node_count(),
        cells = mesh.element_count(),
        "Wrote VTK mesh to {:?}",
        path
    );
    Ok(())
}

/// Write a hexahedral mesh as legacy VTK to any writer.
pub fn write_vtk_to<W: Write>(mesh: &HexMesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "extruded hexahedral mesh")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(writer, "POINTS {} double", mesh.node_count())?;
    for p in &mesh.nodes {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    let cells = mesh.element_count();
    writeln!(writer, "CELLS {} {}", cells, cells * 9)?;
    for hex in &mesh.elements {
        write!(writer, "8")?;
        for n in hex {
            write!(writer, " {}", n)?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "CELL_TYPES {}", cells)?;
    for _ in 0..cells {
        writeln!(writer, "{}", VTK_HEXAHEDRON)?;
    }

    writeln!(writer, "CELL_DATA {}", cells)?;
    writeln!(writer, "SCALARS physical_tag int 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for i in 0..cells {
        let tag = mesh.tags.get(i).map(|t| t.physical).unwrap_or(0);
        writeln!(writer, "{}", tag)?;
    }

    Ok(())
}
