//! Gmsh MSH 2.2 I/O.
//!
//! Reads ASCII and binary MSH 2.2 files into a [`QuadMesh`] (the footprint to
//! extrude) or a [`HexMesh`] (a previously emitted volume mesh), and writes
//! hexahedral meshes in the fixed-width ASCII layout downstream solvers expect.
//!
//! ## Element types
//! - 15 = Point, 1 = Line: boundary annotations, skipped when reading a base mesh
//! - 3 = Quadrilateral (4-node): base mesh elements
//! - 5 = Hexahedron (8-node): volume elements

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::tracing_ext::OperationTimer;
use crate::{ElementTags, HexMesh, QuadElement, QuadMesh};

/// Gmsh element type code for a 2-node line.
pub const LINE: i32 = 1;
/// Gmsh element type code for a 3-node triangle.
pub const TRIANGLE: i32 = 2;
/// Gmsh element type code for a 4-node quadrilateral.
pub const QUADRANGLE: i32 = 3;
/// Gmsh element type code for an 8-node hexahedron.
pub const HEXAHEDRON: i32 = 5;
/// Gmsh element type code for a 1-node point.
pub const POINT: i32 = 15;

/// Number of nodes for the fixed-size Gmsh element types.
fn nodes_per_element(kind: i32) -> Option<usize> {
    match kind {
        1 => Some(2),
        2 => Some(3),
        3 => Some(4),
        4 => Some(4),
        5 => Some(8),
        6 => Some(6),
        7 => Some(5),
        8 => Some(3),
        9 => Some(6),
        10 => Some(9),
        11 => Some(10),
        12 => Some(27),
        13 => Some(18),
        14 => Some(14),
        15 => Some(1),
        16 => Some(8),
        17 => Some(20),
        18 => Some(15),
        19 => Some(13),
        _ => None,
    }
}

/// An element as stored in the file, with node ids already mapped to indices.
#[derive(Debug)]
struct RawElement {
    id: usize,
    kind: i32,
    tags: Vec<i32>,
    nodes: Vec<u32>,
}

impl RawElement {
    fn tag(&self, i: usize) -> i32 {
        self.tags.get(i).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct GmshDocument {
    nodes: Vec<Point3<f64>>,
    elements: Vec<RawElement>,
    has_elements_section: bool,
}

/// Byte cursor that serves text lines and raw binary blocks from one buffer.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], path: &'a Path) -> Self {
        Self {
            data,
            pos: 0,
            line: 0,
            path,
        }
    }

    /// Pre-allocation size for `count` records of at least `min_bytes`
    /// each. Counts come from the file and are not trusted.
    fn capacity_hint(&self, count: usize, min_bytes: usize) -> usize {
        count.min((self.data.len() - self.pos) / min_bytes)
    }

    fn error(&self, details: impl std::fmt::Display) -> MeshError {
        MeshError::parse_error(self.path, format!("line {}: {}", self.line, details))
    }

    fn next_line(&mut self) -> MeshResult<Option<&'a str>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        self.line += 1;

        let text = std::str::from_utf8(&rest[..end])
            .map_err(|_| self.error("invalid UTF-8 outside of a binary block"))?;
        Ok(Some(text.trim_end_matches('\r')))
    }

    /// Next non-blank line, or an error naming what was expected.
    fn expect_line(&mut self, what: &str) -> MeshResult<&'a str> {
        while let Some(line) = self.next_line()? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(line);
            }
        }
        Err(self.error(format!("unexpected end of file, expected {}", what)))
    }

    fn expect_count(&mut self, what: &str) -> MeshResult<usize> {
        let line = self.expect_line(what)?;
        line.parse::<usize>()
            .map_err(|_| self.error(format!("invalid {}: '{}'", what, line)))
    }

    fn skip_to(&mut self, marker: &str) -> MeshResult<()> {
        while let Some(line) = self.next_line()? {
            if line.trim() == marker {
                return Ok(());
            }
        }
        Err(self.error(format!("missing {}", marker)))
    }

    fn take(&mut self, n: usize) -> MeshResult<&'a [u8]> {
        if self.data.len() - self.pos < n {
            return Err(self.error("binary block is truncated"));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_i32(&mut self) -> MeshResult<i32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> MeshResult<f64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(f64::from_le_bytes(buf))
    }
}

/// Parse the `$MeshFormat` body. Returns `true` for binary files.
fn parse_mesh_format(cursor: &mut Cursor<'_>) -> MeshResult<bool> {
    let header = cursor.expect_line("format header")?;
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(cursor.error(format!("invalid format header '{}'", header)));
    }
    if !parts[0].starts_with("2.") {
        return Err(cursor.error(format!(
            "unsupported MSH version {}, re-export the mesh as version 2.2",
            parts[0]
        )));
    }

    let binary = match parts[1] {
        "0" => false,
        "1" => true,
        other => return Err(cursor.error(format!("invalid file type '{}'", other))),
    };
    if parts[2] != "8" {
        return Err(cursor.error(format!("unsupported data size {}", parts[2])));
    }

    if binary {
        let one = cursor.read_i32()?;
        if one != 1 {
            return Err(cursor.error("binary mesh was written with a different byte order"));
        }
    }

    cursor.skip_to("$EndMeshFormat")?;
    Ok(binary)
}

fn parse_nodes(
    cursor: &mut Cursor<'_>,
    binary: bool,
    id_map: &mut HashMap<usize, u32>,
) -> MeshResult<Vec<Point3<f64>>> {
    let count = cursor.expect_count("node count")?;
    let mut nodes = Vec::with_capacity(cursor.capacity_hint(count, 8));

    for index in 0..count {
        let (id, point) = if binary {
            let id = cursor.read_i32()?;
            let x = cursor.read_f64()?;
            let y = cursor.read_f64()?;
            let z = cursor.read_f64()?;
            let id = usize::try_from(id)
                .map_err(|_| cursor.error(format!("negative node id {}", id)))?;
            (id, Point3::new(x, y, z))
        } else {
            let line = cursor.expect_line("node")?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return Err(cursor.error(format!("invalid node line '{}'", line)));
            }
            let id: usize = parts[0]
                .parse()
                .map_err(|_| cursor.error(format!("invalid node id '{}'", parts[0])))?;
            let mut xyz = [0.0; 3];
            for (k, value) in xyz.iter_mut().enumerate() {
                *value = parts[k + 1].parse().map_err(|_| {
                    cursor.error(format!("invalid coordinate '{}'", parts[k + 1]))
                })?;
            }
            (id, Point3::new(xyz[0], xyz[1], xyz[2]))
        };

        if id_map.insert(id, index as u32).is_some() {
            return Err(cursor.error(format!("duplicate node id {}", id)));
        }
        nodes.push(point);
    }

    cursor.skip_to("$EndNodes")?;
    Ok(nodes)
}

fn map_node(
    id_map: &HashMap<usize, u32>,
    element_id: usize,
    raw: i64,
    node_count: usize,
) -> MeshResult<u32> {
    usize::try_from(raw)
        .ok()
        .and_then(|raw| id_map.get(&raw).copied())
        .ok_or_else(|| MeshError::invalid_node_index(element_id, raw.max(0) as usize, node_count))
}

fn parse_elements(
    cursor: &mut Cursor<'_>,
    binary: bool,
    id_map: &HashMap<usize, u32>,
) -> MeshResult<Vec<RawElement>> {
    let count = cursor.expect_count("element count")?;
    let node_count = id_map.len();
    let mut elements = Vec::with_capacity(cursor.capacity_hint(count, 8));

    if binary {
        while elements.len() < count {
            let kind = cursor.read_i32()?;
            let following = cursor.read_i32()?;
            let n_tags = cursor.read_i32()?;
            let n_nodes = nodes_per_element(kind)
                .ok_or_else(|| cursor.error(format!("unknown element type {}", kind)))?;
            if following < 0 || n_tags < 0 {
                return Err(cursor.error("invalid element block header"));
            }

            for _ in 0..following {
                let id = cursor.read_i32()?.max(0) as usize;
                let mut tags = Vec::with_capacity(cursor.capacity_hint(n_tags as usize, 4));
                for _ in 0..n_tags {
                    tags.push(cursor.read_i32()?);
                }
                let mut nodes = Vec::with_capacity(n_nodes);
                for _ in 0..n_nodes {
                    let raw = cursor.read_i32()? as i64;
                    nodes.push(map_node(id_map, id, raw, node_count)?);
                }
                elements.push(RawElement {
                    id,
                    kind,
                    tags,
                    nodes,
                });
            }
        }
    } else {
        for _ in 0..count {
            let line = cursor.expect_line("element")?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(cursor.error(format!("invalid element line '{}'", line)));
            }
            let field = |i: usize| -> MeshResult<i64> {
                parts
                    .get(i)
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| cursor.error(format!("invalid element line '{}'", line)))
            };

            let id = field(0)?.max(0) as usize;
            let kind = field(1)? as i32;
            let n_tags = field(2)?.max(0) as usize;
            let tags = (0..n_tags)
                .map(|i| field(3 + i).map(|t| t as i32))
                .collect::<MeshResult<Vec<_>>>()?;

            let node_fields = parts.len().saturating_sub(3 + n_tags);
            if let Some(expected) = nodes_per_element(kind) {
                if node_fields != expected {
                    return Err(cursor.error(format!(
                        "element {} of type {} needs {} nodes, found {}",
                        id, kind, expected, node_fields
                    )));
                }
            }
            let nodes = (0..node_fields)
                .map(|i| map_node(id_map, id, field(3 + n_tags + i)?, node_count))
                .collect::<MeshResult<Vec<_>>>()?;

            elements.push(RawElement {
                id,
                kind,
                tags,
                nodes,
            });
        }
    }

    cursor.skip_to("$EndElements")?;
    Ok(elements)
}

fn parse_document(data: &[u8], path: &Path) -> MeshResult<GmshDocument> {
    let mut cursor = Cursor::new(data, path);
    let mut binary = false;
    let mut saw_format = false;
    let mut id_map: HashMap<usize, u32> = HashMap::new();
    let mut doc = GmshDocument::default();
    let mut saw_nodes = false;

    while let Some(line) = cursor.next_line()? {
        match line.trim() {
            "" => continue,
            "$MeshFormat" => {
                binary = parse_mesh_format(&mut cursor)?;
                saw_format = true;
            }
            "$Nodes" => {
                doc.nodes = parse_nodes(&mut cursor, binary, &mut id_map)?;
                saw_nodes = true;
            }
            "$Elements" => {
                if !saw_nodes {
                    return Err(cursor.error("$Elements section before $Nodes"));
                }
                doc.elements = parse_elements(&mut cursor, binary, &id_map)?;
                doc.has_elements_section = true;
            }
            section if section.starts_with('$') => {
                let marker = format!("$End{}", &section[1..]);
                debug!(section, "Skipping Gmsh section");
                cursor.skip_to(&marker)?;
            }
            other => {
                return Err(cursor.error(format!("unexpected content '{}'", other)));
            }
        }
    }

    if !saw_format {
        return Err(MeshError::parse_error(path, "missing $MeshFormat header"));
    }
    if !saw_nodes {
        return Err(MeshError::parse_error(path, "missing $Nodes section"));
    }

    debug!(
        nodes = doc.nodes.len(),
        elements = doc.elements.len(),
        binary,
        "Parsed Gmsh document"
    );
    Ok(doc)
}

fn read_document(path: &Path) -> MeshResult<GmshDocument> {
    let _timer = OperationTimer::new("read_gmsh");
    let data = std::fs::read(path).map_err(|e| MeshError::io_read(path, e))?;
    parse_document(&data, path)
}

/// Read a quadrilateral base mesh from a Gmsh MSH 2.2 file (ASCII or binary).
///
/// The first element tag is taken as the physical tag and the second as the
/// elementary tag. Point and line elements are skipped; any other element
/// type is rejected.
pub fn read_quad_mesh(path: &Path) -> MeshResult<QuadMesh> {
    let doc = read_document(path)?;

    let mut mesh = QuadMesh::with_capacity(doc.nodes.len(), doc.elements.len());
    mesh.nodes = doc.nodes.iter().map(|p| p.xy()).collect();

    let mut skipped = 0usize;
    for element in &doc.elements {
        match element.kind {
            QUADRANGLE => mesh.elements.push(QuadElement::with_tags(
                [
                    element.nodes[0],
                    element.nodes[1],
                    element.nodes[2],
                    element.nodes[3],
                ],
                element.tag(0),
                element.tag(1),
            )),
            POINT | LINE => skipped += 1,
            other => {
                return Err(MeshError::UnsupportedElement {
                    path: path.to_path_buf(),
                    element_id: element.id,
                    element_type: other,
                });
            }
        }
    }

    if mesh.elements.is_empty() {
        return Err(MeshError::empty_mesh(format!(
            "{} contains no quadrilateral elements",
            path.display()
        )));
    }

    info!(
        nodes = mesh.node_count(),
        quads = mesh.element_count(),
        skipped_boundary_elements = skipped,
        "Loaded base mesh"
    );
    Ok(mesh)
}

/// Read a hexahedral mesh from a Gmsh MSH 2.2 file. Non-hexahedral
/// elements are ignored.
///
/// An empty `$Elements` section is accepted: a zero-layer extrusion writes
/// only the base node layer.
pub fn read_hex_mesh(path: &Path) -> MeshResult<HexMesh> {
    let doc = read_document(path)?;
    let node_layer_only = doc.has_elements_section && doc.elements.is_empty();

    let mut mesh = HexMesh::new();
    for element in doc.elements.iter().filter(|e| e.kind == HEXAHEDRON) {
        let mut hex = [0u32; 8];
        hex.copy_from_slice(&element.nodes);
        mesh.elements.push(hex);
        mesh.tags
            .push(ElementTags::new(element.tag(0), element.tag(1)));
    }
    mesh.nodes = doc.nodes;

    if mesh.elements.is_empty() && !(node_layer_only && !mesh.nodes.is_empty()) {
        return Err(MeshError::empty_mesh(format!(
            "{} contains no hexahedral elements",
            path.display()
        )));
    }

    info!(
        nodes = mesh.node_count(),
        hexahedra = mesh.element_count(),
        "Loaded hexahedral mesh"
    );
    Ok(mesh)
}

/// Write a hexahedral mesh as Gmsh MSH 2.2 ASCII.
pub fn write_hex_mesh(mesh: &HexMesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_hex_mesh_to(mesh, &mut writer).map_err(|e| MeshError::io_write(path, e))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;

    info!(
        nodes = mesh.node_count(),
        hexahedra = mesh.element_count(),
        "Wrote Gmsh mesh to {:?}",
        path
    );
    Ok(())
}

/// Write a hexahedral mesh as Gmsh MSH 2.2 ASCII to any writer.
///
/// Counts are right-aligned to width 10, coordinates use `%8.3f`, node ids
/// in element lines use `%8d`. All ids are 1-based.
pub fn write_hex_mesh_to<W: Write>(mesh: &HexMesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "$MeshFormat")?;
    writeln!(writer, "2.2 0 8")?;
    writeln!(writer, "$EndMeshFormat")?;

    writeln!(writer, "$Nodes")?;
    writeln!(writer, "{:10}", mesh.nodes.len())?;
    for (i, p) in mesh.nodes.iter().enumerate() {
        writeln!(writer, "{} {:8.3} {:8.3} {:8.3}", i + 1, p.x, p.y, p.z)?;
    }
    writeln!(writer, "$EndNodes")?;

    writeln!(writer, "$Elements")?;
    writeln!(writer, "{:10}", mesh.elements.len())?;
    for (i, hex) in mesh.elements.iter().enumerate() {
        let tags = mesh.tags.get(i).copied().unwrap_or_default();
        writeln!(
            writer,
            "{} {} 2 {} {} {:8} {:8} {:8} {:8} {:8} {:8} {:8} {:8}",
            i + 1,
            HEXAHEDRON,
            tags.physical,
            tags.elementary,
            hex[0] + 1,
            hex[1] + 1,
            hex[2] + 1,
            hex[3] + 1,
            hex[4] + 1,
            hex[5] + 1,
            hex[6] + 1,
            hex[7] + 1
        )?;
    }
    writeln!(writer, "$EndElements")?;

    Ok(())
}
