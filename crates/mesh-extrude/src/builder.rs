//! Fluent builder API for extrusion.
//!
//! # Example
//!
//! ```no_run
//! use mesh_core::{QuadMesh, TriSurface};
//! use mesh_extrude::ExtrudeBuilder;
//!
//! let base = QuadMesh::load("base.msh").unwrap();
//! let surface = TriSurface::load("bathymetry.gts").unwrap();
//!
//! let result = ExtrudeBuilder::new(&base, &surface)
//!     .layers(30)
//!     .margin(6000.0)
//!     .build()
//!     .unwrap();
//!
//! result.mesh.save("volume.msh").unwrap();
//! ```

use serde::Serialize;
use tracing::info;

use mesh_core::tracing_ext::{log_hex_mesh_stats, OperationTimer};
use mesh_core::{HexMesh, QuadMesh, SurfaceBounds, TriSurface};

use crate::connectivity::{build_hex_connectivity, TagPolicy};
use crate::depth::{build_depth_field, DegeneratePolicy};
use crate::error::{ExtrudeError, ExtrudeResult};
use crate::layering::{ColumnAnchor, DepthColumn, FlatBound, LayerLayout};
use crate::params::ExtrudeParams;
use crate::surface::{BvhIndex, SurfaceDistanceIndex};

/// Summary of an extrusion run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtrudeStats {
    pub surface_bounds: SurfaceBounds,
    pub layers: u32,
    pub dz_min: f64,
    pub dz_max: f64,
    pub degenerate_columns: usize,
    pub node_count: usize,
    pub element_count: usize,
}

/// Result of an extrusion: the volume mesh plus the data it was built from.
#[derive(Debug, Clone)]
pub struct ExtrusionResult {
    pub mesh: HexMesh,
    pub layout: LayerLayout,
    /// One column per base node.
    pub columns: Vec<DepthColumn>,
    pub stats: ExtrudeStats,
}

/// Fluent builder for extrusion.
///
/// Starts from [`ExtrudeParams::default`]; every setter overrides one field.
pub struct ExtrudeBuilder<'a> {
    base: &'a QuadMesh,
    surface: &'a TriSurface,
    params: ExtrudeParams,
}

impl<'a> ExtrudeBuilder<'a> {
    pub fn new(base: &'a QuadMesh, surface: &'a TriSurface) -> Self {
        Self {
            base,
            surface,
            params: ExtrudeParams::default(),
        }
    }

    /// Replace all parameters at once.
    pub fn params(mut self, params: ExtrudeParams) -> Self {
        self.params = params;
        self
    }

    /// Number of layers per column.
    pub fn layers(mut self, layers: u32) -> Self {
        self.params.layers = layers;
        self
    }

    pub fn anchor(mut self, anchor: ColumnAnchor) -> Self {
        self.params.anchor = anchor;
        self
    }

    /// Flat bound at a distance from the surface extreme on the anchor side.
    pub fn margin(mut self, margin: f64) -> Self {
        self.params.flat_bound = FlatBound::Margin(margin);
        self
    }

    /// Flat bound at a fixed height.
    pub fn flat_z(mut self, z: f64) -> Self {
        self.params.flat_bound = FlatBound::Absolute(z);
        self
    }

    pub fn tag_policy(mut self, policy: TagPolicy) -> Self {
        self.params.tag_policy = policy;
        self
    }

    /// Tag every element 99 / 2 instead of propagating base tags.
    pub fn placeholder_tags(mut self) -> Self {
        self.params.tag_policy = TagPolicy::LEGACY_PLACEHOLDER;
        self
    }

    /// Collapse degenerate columns instead of failing.
    pub fn clamp_degenerate(mut self, enable: bool) -> Self {
        self.params.degenerate_policy = if enable {
            DegeneratePolicy::Clamp
        } else {
            DegeneratePolicy::Reject
        };
        self
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// See [`ExtrudeParams::for_bathymetry`]. Keeps the layer count.
    pub fn bathymetry(mut self) -> Self {
        let layers = self.params.layers;
        self.params = ExtrudeParams::for_bathymetry().with_layers(layers);
        self
    }

    /// See [`ExtrudeParams::for_bedrock`]. Keeps the layer count.
    pub fn bedrock(mut self, top: f64) -> Self {
        let layers = self.params.layers;
        self.params = ExtrudeParams::for_bedrock(top).with_layers(layers);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build with the BVH distance index.
    pub fn build(self) -> ExtrudeResult<ExtrusionResult> {
        self.build_with::<BvhIndex>()
    }

    /// Build with a caller-chosen distance index.
    pub fn build_with<I: SurfaceDistanceIndex>(self) -> ExtrudeResult<ExtrusionResult> {
        extrude_with_index::<I>(self.base, self.surface, &self.params)
    }
}

/// Extrude with default index selection (BVH).
pub fn extrude(
    base: &QuadMesh,
    surface: &TriSurface,
    params: &ExtrudeParams,
) -> ExtrudeResult<ExtrusionResult> {
    extrude_with_index::<BvhIndex>(base, surface, params)
}

/// Extrude using distance index `I`.
pub fn extrude_with_index<I: SurfaceDistanceIndex>(
    base: &QuadMesh,
    surface: &TriSurface,
    params: &ExtrudeParams,
) -> ExtrudeResult<ExtrusionResult> {
    let timer = OperationTimer::with_context("extrude", base.element_count(), base.node_count());
    let _span = timer.span().enter();

    let bounds = surface.bounds().ok_or(ExtrudeError::EmptySurface)?;
    info!(
        "Surface bounds: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );

    let index = I::build(surface)?;
    let field = build_depth_field(base, &index, &bounds, params)?;
    let hex = build_hex_connectivity(base, &field.layout, params.tag_policy)?;

    let mesh = HexMesh {
        nodes: field.coords,
        elements: hex.elements,
        tags: hex.tags,
    };

    let stats = ExtrudeStats {
        surface_bounds: bounds,
        layers: params.layers,
        dz_min: field.stats.dz_min,
        dz_max: field.stats.dz_max,
        degenerate_columns: field.stats.degenerate_columns,
        node_count: mesh.node_count(),
        element_count: mesh.element_count(),
    };

    info!(
        dz_min = stats.dz_min,
        dz_max = stats.dz_max,
        nodes = stats.node_count,
        hexahedra = stats.element_count,
        "Extrusion complete"
    );
    log_hex_mesh_stats(&mesh, "extruded");

    Ok(ExtrusionResult {
        mesh,
        layout: field.layout,
        columns: field.columns,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BruteForceIndex;
    use approx::assert_relative_eq;
    use mesh_core::ElementTags;
    use nalgebra::{Point2, Point3};

    fn base_grid() -> QuadMesh {
        QuadMesh::structured_grid(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0), 2, 1, 7).unwrap()
    }

    fn flat_surface(z: f64) -> TriSurface {
        TriSurface::new(
            vec![
                Point3::new(-1.0, -1.0, z),
                Point3::new(5.0, -1.0, z),
                Point3::new(5.0, 3.0, z),
                Point3::new(-1.0, 3.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_builder_counts() {
        let base = base_grid();
        let surface = flat_surface(-40.0);
        let result = ExtrudeBuilder::new(&base, &surface)
            .layers(5)
            .margin(60.0)
            .build()
            .unwrap();

        assert_eq!(result.mesh.node_count(), 6 * 6);
        assert_eq!(result.mesh.element_count(), 5 * 2);
        assert_eq!(result.stats.node_count, 36);
        assert_eq!(result.stats.element_count, 10);
        assert_relative_eq!(result.stats.dz_min, 12.0, epsilon = 1e-9);
        assert_relative_eq!(result.stats.dz_max, 12.0, epsilon = 1e-9);
        assert!(result.mesh.tags.iter().all(|t| *t == ElementTags::new(7, 0)));
        assert!(result.mesh.validate().is_valid());
    }

    #[test]
    fn test_builder_placeholder_and_bedrock() {
        let base = base_grid();
        let surface = flat_surface(-40.0);
        let result = ExtrudeBuilder::new(&base, &surface)
            .layers(2)
            .bedrock(30000.0)
            .placeholder_tags()
            .build_with::<BruteForceIndex>()
            .unwrap();

        assert!(result.mesh.tags.iter().all(|t| *t == ElementTags::new(99, 2)));
        let (min, max) = result.mesh.bounds().unwrap();
        assert_relative_eq!(min.z, -40.0, epsilon = 1e-9);
        assert_eq!(max.z, 30000.0);
    }

    #[test]
    fn test_empty_surface() {
        let base = base_grid();
        let err = ExtrudeBuilder::new(&base, &TriSurface::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtrudeError::EmptySurface));
    }

    #[test]
    fn test_clamp_reports_degenerate_columns() {
        let base = base_grid();
        let surface = flat_surface(-40.0);
        let result = ExtrudeBuilder::new(&base, &surface)
            .layers(3)
            .flat_z(0.0)
            .clamp_degenerate(true)
            .build()
            .unwrap();
        assert_eq!(result.stats.degenerate_columns, 6);

        let err = ExtrudeBuilder::new(&base, &surface)
            .layers(3)
            .flat_z(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtrudeError::DegenerateColumn { .. }));
    }
}
