//! Depth field: the vertical column of every base node and the coordinates
//! of all extruded nodes.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mesh_core::tracing_ext::{log_progress, OperationTimer};
use mesh_core::{QuadMesh, SurfaceBounds};

use crate::error::{ExtrudeError, ExtrudeResult};
use crate::layering::{DepthColumn, LayerLayout};
use crate::params::ExtrudeParams;
use crate::surface::SurfaceDistanceIndex;

/// What to do with a column whose ceiling is not above its floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Abort the build.
    #[default]
    Reject,
    /// Collapse the column onto its flat bound and keep going.
    Clamp,
}

/// Layer spacing statistics over all columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthStats {
    pub dz_min: f64,
    pub dz_max: f64,
    /// Columns collapsed under [`DegeneratePolicy::Clamp`].
    pub degenerate_columns: usize,
    pub columns: usize,
}

impl Default for DepthStats {
    fn default() -> Self {
        Self {
            dz_min: f64::INFINITY,
            dz_max: f64::NEG_INFINITY,
            degenerate_columns: 0,
            columns: 0,
        }
    }
}

impl DepthStats {
    fn record(&mut self, dz: f64) {
        self.dz_min = self.dz_min.min(dz);
        self.dz_max = self.dz_max.max(dz);
        self.columns += 1;
    }
}

/// Output of [`build_depth_field`].
#[derive(Debug, Clone)]
pub struct DepthField {
    /// Node coordinates indexed by `layout.node_id(base, layer)`.
    pub coords: Vec<Point3<f64>>,
    /// One column per base node.
    pub columns: Vec<DepthColumn>,
    pub layout: LayerLayout,
    pub stats: DepthStats,
}

const PROGRESS_EVERY: usize = 10_000;

/// Place every extruded node.
///
/// For each base node `(x, y)` the surface is queried from
/// `(x, y, reference_z)`, where `reference_z` is the surface minimum when
/// anchored below and the maximum when anchored above. The returned distance
/// sets the surface-following bound; the flat bound comes from
/// `params.flat_bound`. Each column is split into `params.layers` equal layers.
pub fn build_depth_field<I: SurfaceDistanceIndex>(
    base: &QuadMesh,
    index: &I,
    bounds: &SurfaceBounds,
    params: &ExtrudeParams,
) -> ExtrudeResult<DepthField> {
    params.validate()?;
    let layout = LayerLayout::new(base.node_count(), params.layers)?;
    let _timer = OperationTimer::with_context("depth_field", base.element_count(), base.node_count());

    let (z_min, z_max) = bounds.z_range();
    let anchor = params.anchor;
    let reference_z = anchor.reference_z(z_min, z_max);
    let flat_z = params.flat_bound.resolve(anchor, z_min, z_max);
    debug!(?anchor, reference_z, flat_z, "Resolved column bounds");

    let layers = params.layers;
    let mut columns = Vec::with_capacity(base.node_count());
    let mut stats = DepthStats::default();

    for (node, xy) in base.nodes.iter().enumerate() {
        let query = Point3::new(xy.x, xy.y, reference_z);
        let distance = index.nearest_distance(&query).map_err(|e| match e {
            ExtrudeError::OracleFailed { details, .. } => ExtrudeError::oracle_failed(node, details),
            other => other,
        })?;

        let surface_z = anchor.surface_bound(reference_z, distance);
        let mut column = anchor.column(surface_z, flat_z);

        if column.is_degenerate() {
            match params.degenerate_policy {
                DegeneratePolicy::Reject => {
                    return Err(ExtrudeError::DegenerateColumn {
                        node,
                        floor: column.floor,
                        ceiling: column.ceiling,
                    });
                }
                DegeneratePolicy::Clamp => {
                    warn!(
                        node,
                        floor = column.floor,
                        ceiling = column.ceiling,
                        "Clamping degenerate column onto the flat bound"
                    );
                    column = DepthColumn::new(flat_z, flat_z);
                    stats.degenerate_columns += 1;
                }
            }
        }

        stats.record(column.dz(layers));
        columns.push(column);

        if (node + 1) % PROGRESS_EVERY == 0 {
            log_progress("depth_field", node + 1, base.node_count(), Some("columns"));
        }
    }

    let mut coords = Vec::with_capacity(layout.node_count());
    for layer in 0..=layers {
        for (xy, column) in base.nodes.iter().zip(&columns) {
            coords.push(Point3::new(xy.x, xy.y, column.z(layer, layers)));
        }
    }

    info!(
        dz_min = stats.dz_min,
        dz_max = stats.dz_max,
        degenerate_columns = stats.degenerate_columns,
        nodes = coords.len(),
        "Depth field built"
    );

    Ok(DepthField {
        coords,
        columns,
        layout,
        stats,
    })
}
