//! Input validation and hexahedral mesh reporting.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::{HexMesh, QuadMesh, TriSurface};

/// Check a base mesh before extrusion.
///
/// Rejects element indices outside the node list, non-finite coordinates and
/// elements that use the same node twice. Winding is not checked.
pub fn validate_quad_mesh(mesh: &QuadMesh) -> MeshResult<()> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("base mesh has no nodes or elements"));
    }

    for (i, p) in mesh.nodes.iter().enumerate() {
        for (name, value) in [("x", p.x), ("y", p.y)] {
            if !value.is_finite() {
                return Err(MeshError::invalid_coordinate(i, name, value));
            }
        }
    }

    let node_count = mesh.node_count();
    for (e, element) in mesh.elements.iter().enumerate() {
        for (k, &n) in element.nodes.iter().enumerate() {
            if n as usize >= node_count {
                return Err(MeshError::invalid_node_index(e, n as usize, node_count));
            }
            if element.nodes[..k].contains(&n) {
                return Err(MeshError::DegenerateElement {
                    element_index: e,
                    node_index: n as usize,
                });
            }
        }
    }

    debug!(
        nodes = node_count,
        elements = mesh.element_count(),
        "Base mesh validation passed"
    );
    Ok(())
}

/// Check a reference surface: non-empty, finite, indices in range.
pub fn validate_surface(surface: &TriSurface) -> MeshResult<()> {
    if surface.is_empty() {
        return Err(MeshError::empty_mesh("surface has no vertices or triangles"));
    }

    for (i, v) in surface.vertices.iter().enumerate() {
        for (name, value) in [("x", v.x), ("y", v.y), ("z", v.z)] {
            if !value.is_finite() {
                return Err(MeshError::invalid_coordinate(i, name, value));
            }
        }
    }

    let vertex_count = surface.vertex_count();
    for (t, tri) in surface.triangles.iter().enumerate() {
        if let Some(&bad) = tri.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(MeshError::invalid_node_index(t, bad as usize, vertex_count));
        }
    }

    debug!(
        vertices = vertex_count,
        triangles = surface.triangle_count(),
        "Surface validation passed"
    );
    Ok(())
}

/// Structural report for a hexahedral mesh.
#[derive(Debug, Clone)]
pub struct HexMeshReport {
    pub node_count: usize,
    pub element_count: usize,
    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,
    /// Element node references outside `0..node_count`.
    pub invalid_index_count: usize,
    /// Elements that list some node more than once.
    pub repeated_node_elements: usize,
    /// Elements whose top face sits below their bottom face.
    pub inverted_elements: usize,
    /// Whether `tags` has exactly one entry per element.
    pub tags_complete: bool,
}

impl HexMeshReport {
    /// Referential integrity holds and every hexahedron has 8 distinct nodes.
    pub fn is_valid(&self) -> bool {
        self.element_count > 0
            && self.invalid_index_count == 0
            && self.repeated_node_elements == 0
            && self.tags_complete
    }
}

impl std::fmt::Display for HexMeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hex Mesh Report:")?;
        writeln!(f, "  Nodes: {}", self.node_count)?;
        writeln!(f, "  Hexahedra: {}", self.element_count)?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        writeln!(f, "  Invalid node references: {}", self.invalid_index_count)?;
        writeln!(
            f,
            "  Elements with repeated nodes: {}",
            self.repeated_node_elements
        )?;
        writeln!(f, "  Inverted elements: {}", self.inverted_elements)?;
        writeln!(
            f,
            "  Valid: {}",
            if self.is_valid() { "yes" } else { "NO" }
        )?;
        Ok(())
    }
}

/// Inspect a hexahedral mesh without failing.
pub fn validate_hex_mesh(mesh: &HexMesh) -> HexMeshReport {
    let node_count = mesh.node_count();
    let mut invalid_index_count = 0;
    let mut repeated_node_elements = 0;
    let mut inverted_elements = 0;

    for hex in &mesh.elements {
        let out_of_range = hex.iter().filter(|&&n| n as usize >= node_count).count();
        invalid_index_count += out_of_range;

        let mut sorted = *hex;
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            repeated_node_elements += 1;
        }

        if out_of_range == 0 {
            let below = (0..4).any(|k| {
                mesh.nodes[hex[k + 4] as usize].z < mesh.nodes[hex[k] as usize].z
            });
            if below {
                inverted_elements += 1;
            }
        }
    }

    let report = HexMeshReport {
        node_count,
        element_count: mesh.element_count(),
        bounds: mesh.bounds(),
        invalid_index_count,
        repeated_node_elements,
        inverted_elements,
        tags_complete: mesh.tags.len() == mesh.element_count(),
    };

    if report.is_valid() {
        info!(
            nodes = report.node_count,
            hexahedra = report.element_count,
            "Hex mesh validation passed"
        );
    } else {
        warn!(
            invalid_references = report.invalid_index_count,
            repeated_node_elements = report.repeated_node_elements,
            tags_complete = report.tags_complete,
            "Hex mesh validation found issues"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementTags, QuadElement};
    use nalgebra::Point2;

    fn square() -> QuadMesh {
        let mut mesh = QuadMesh::new();
        mesh.nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        mesh.elements = vec![QuadElement::new([0, 1, 2, 3], 1)];
        mesh
    }

    fn cube() -> HexMesh {
        let mut nodes = Vec::new();
        for z in [0.0, 1.0] {
            nodes.extend([
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ]);
        }
        HexMesh {
            nodes,
            elements: vec![[0, 1, 2, 3, 4, 5, 6, 7]],
            tags: vec![ElementTags::new(1, 0)],
        }
    }

    #[test]
    fn test_valid_quad_mesh() {
        validate_quad_mesh(&square()).unwrap();
    }

    #[test]
    fn test_quad_index_out_of_range() {
        let mut mesh = square();
        mesh.elements[0].nodes[2] = 9;
        let err = validate_quad_mesh(&mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidNodeIndex {
                element_index: 0,
                node_index: 9,
                node_count: 4
            }
        ));
    }

    #[test]
    fn test_quad_repeated_node() {
        let mut mesh = square();
        mesh.elements[0].nodes = [0, 1, 1, 3];
        let err = validate_quad_mesh(&mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::DegenerateElement {
                element_index: 0,
                node_index: 1
            }
        ));
    }

    #[test]
    fn test_quad_nan_coordinate() {
        let mut mesh = square();
        mesh.nodes[3].y = f64::NAN;
        let err = validate_quad_mesh(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::InvalidCoordinate { node_index: 3, .. }));
    }

    #[test]
    fn test_surface_checks() {
        let empty = TriSurface::default();
        assert!(matches!(
            validate_surface(&empty).unwrap_err(),
            MeshError::EmptyMesh { .. }
        ));

        let bad = TriSurface::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(matches!(
            validate_surface(&bad).unwrap_err(),
            MeshError::InvalidNodeIndex { node_index: 2, .. }
        ));
    }

    #[test]
    fn test_hex_report() {
        let report = validate_hex_mesh(&cube());
        assert!(report.is_valid());
        assert_eq!(report.inverted_elements, 0);

        let mut broken = cube();
        broken.elements[0][7] = 0;
        broken.tags.clear();
        let report = validate_hex_mesh(&broken);
        assert!(!report.is_valid());
        assert_eq!(report.repeated_node_elements, 1);
        assert!(!report.tags_complete);

        let mut flipped = cube();
        flipped.elements[0] = [4, 5, 6, 7, 0, 1, 2, 3];
        assert_eq!(validate_hex_mesh(&flipped).inverted_elements, 1);
        assert!(report.to_string().contains("Valid: NO"));
    }
}
