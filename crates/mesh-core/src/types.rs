//! Core mesh data types.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// A quadrilateral element of the base mesh.
///
/// Node order defines orientation; extrusion keeps it for both the bottom and
/// the top face of every hexahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadElement {
    /// Indices into [`QuadMesh::nodes`].
    pub nodes: [u32; 4],
    /// Physical group (material / boundary classification).
    pub physical_tag: i32,
    /// Elementary (geometric entity) tag.
    pub elementary_tag: i32,
}

impl QuadElement {
    /// Create an element with a physical tag and no elementary tag.
    #[inline]
    pub fn new(nodes: [u32; 4], physical_tag: i32) -> Self {
        Self {
            nodes,
            physical_tag,
            elementary_tag: 0,
        }
    }

    /// Create an element with both tags.
    #[inline]
    pub fn with_tags(nodes: [u32; 4], physical_tag: i32, elementary_tag: i32) -> Self {
        Self {
            nodes,
            physical_tag,
            elementary_tag,
        }
    }
}

/// Planar quadrilateral mesh to be extruded.
///
/// Nodes are immutable once read and are addressed by their 0-based index.
#[derive(Debug, Clone, Default)]
pub struct QuadMesh {
    /// Horizontal node positions.
    pub nodes: Vec<Point2<f64>>,
    /// Quadrilateral elements.
    pub elements: Vec<QuadElement>,
}

impl QuadMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(node_count: usize, element_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            elements: Vec::with_capacity(element_count),
        }
    }

    /// Build a regular `nx` x `ny` footprint grid over `[min, max]`.
    ///
    /// Node `(i, j)` gets index `j * (nx + 1) + i`; element `(i, j)` is
    /// `[(i, j), (i+1, j), (i+1, j+1), (i, j+1)]`, counter-clockwise seen from
    /// above.
    pub fn structured_grid(
        min: Point2<f64>,
        max: Point2<f64>,
        nx: usize,
        ny: usize,
        physical_tag: i32,
    ) -> MeshResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::empty_mesh(format!(
                "structured grid needs at least one cell per direction, got {} x {}",
                nx, ny
            )));
        }

        let dx = (max.x - min.x) / nx as f64;
        let dy = (max.y - min.y) / ny as f64;
        let mut mesh = Self::with_capacity((nx + 1) * (ny + 1), nx * ny);

        for j in 0..=ny {
            for i in 0..=nx {
                mesh.nodes
                    .push(Point2::new(min.x + i as f64 * dx, min.y + j as f64 * dy));
            }
        }

        let id = |i: usize, j: usize| (j * (nx + 1) + i) as u32;
        for j in 0..ny {
            for i in 0..nx {
                mesh.elements.push(QuadElement::new(
                    [id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)],
                    physical_tag,
                ));
            }
        }

        Ok(mesh)
    }

    /// Number of base nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// X coordinate of node `i`.
    #[inline]
    pub fn node_x(&self, i: usize) -> f64 {
        self.nodes[i].x
    }

    /// Y coordinate of node `i`.
    #[inline]
    pub fn node_y(&self, i: usize) -> f64 {
        self.nodes[i].y
    }

    /// Number of quadrilateral elements.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The four node indices of element `i`.
    #[inline]
    pub fn element_connectivity(&self, i: usize) -> [u32; 4] {
        self.elements[i].nodes
    }

    /// Physical tag of element `i`.
    #[inline]
    pub fn element_physical_tag(&self, i: usize) -> i32 {
        self.elements[i].physical_tag
    }

    /// Check if mesh is empty (no nodes or no elements).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.elements.is_empty()
    }

    /// Horizontal bounding box as (min_corner, max_corner).
    pub fn bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = self.nodes.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.nodes {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }
}

/// Axis-aligned bounds of a reference surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl SurfaceBounds {
    /// Vertical extent as (z_min, z_max).
    #[inline]
    pub fn z_range(&self) -> (f64, f64) {
        (self.min.z, self.max.z)
    }

    /// Horizontal footprint as (min_corner, max_corner).
    #[inline]
    pub fn xy_range(&self) -> (Point2<f64>, Point2<f64>) {
        (self.min.xy(), self.max.xy())
    }
}

/// Triangulated reference surface (terrain, bathymetry, bedrock).
#[derive(Debug, Clone, Default)]
pub struct TriSurface {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriSurface {
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Bounds of all vertices, or `None` for an empty surface.
    pub fn bounds(&self) -> Option<SurfaceBounds> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices {
            min = min.inf(v);
            max = max.sup(v);
        }
        Some(SurfaceBounds { min, max })
    }
}

/// Gmsh tag pair written for each volume element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementTags {
    pub physical: i32,
    pub elementary: i32,
}

impl ElementTags {
    #[inline]
    pub fn new(physical: i32, elementary: i32) -> Self {
        Self {
            physical,
            elementary,
        }
    }
}

/// Hexahedral volume mesh.
///
/// Each element lists its bottom face followed by its top face, both in the
/// winding of the quadrilateral it was extruded from.
#[derive(Debug, Clone, Default)]
pub struct HexMesh {
    pub nodes: Vec<Point3<f64>>,
    pub elements: Vec<[u32; 8]>,
    /// One entry per element.
    pub tags: Vec<ElementTags>,
}

impl HexMesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Compute the axis-aligned bounding box.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.nodes.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.nodes {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }
}
