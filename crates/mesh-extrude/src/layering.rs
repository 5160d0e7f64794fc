//! Node and element numbering for layered extrusion, and the vertical
//! placement policy of each column.
//!
//! Layer `k` of base node `n` gets id `k * base_nodes + n`; layer 0 is the
//! floor. Hexahedron `(k, e)` gets id `k * base_elements + e`.

use serde::{Deserialize, Serialize};

use crate::error::{ExtrudeError, ExtrudeResult};

/// Numbering of a layered mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerLayout {
    pub base_nodes: usize,
    pub layers: u32,
}

impl LayerLayout {
    /// Create a layout, rejecting node counts beyond the `u32` id range.
    pub fn new(base_nodes: usize, layers: u32) -> ExtrudeResult<Self> {
        let total = (layers as u64 + 1).checked_mul(base_nodes as u64);
        match total {
            Some(n) if n <= u32::MAX as u64 => Ok(Self { base_nodes, layers }),
            _ => Err(ExtrudeError::TooManyNodes { base_nodes, layers }),
        }
    }

    /// Number of node levels (`layers + 1`).
    #[inline]
    pub fn levels(&self) -> usize {
        self.layers as usize + 1
    }

    /// Id of base node `base` at level `layer`.
    #[inline]
    pub fn node_id(&self, base: u32, layer: u32) -> u32 {
        layer * self.base_nodes as u32 + base
    }

    /// Inverse of [`node_id`](Self::node_id): `(base, layer)`.
    #[inline]
    pub fn decompose(&self, id: u32) -> (u32, u32) {
        let n = self.base_nodes as u32;
        (id % n, id / n)
    }

    /// Total node count, `(layers + 1) * base_nodes`.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.levels() * self.base_nodes
    }

    /// Total hexahedron count, `layers * base_elements`.
    #[inline]
    pub fn element_count(&self, base_elements: usize) -> usize {
        self.layers as usize * base_elements
    }

    /// Id of the hexahedron extruded from `base_element` in layer `layer`.
    #[inline]
    pub fn element_id(&self, layer: u32, base_element: usize, base_elements: usize) -> usize {
        layer as usize * base_elements + base_element
    }
}

/// Which extreme of the surface the distance queries start from, and so
/// which column bound follows the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAnchor {
    /// Query from the surface minimum; the ceiling follows the surface and
    /// the floor is flat.
    #[default]
    Below,
    /// Query from the surface maximum; the floor follows the surface and the
    /// ceiling is flat.
    Above,
}

impl ColumnAnchor {
    /// Height of the query plane for a surface spanning `[z_min, z_max]`.
    #[inline]
    pub fn reference_z(&self, z_min: f64, z_max: f64) -> f64 {
        match self {
            ColumnAnchor::Below => z_min,
            ColumnAnchor::Above => z_max,
        }
    }

    /// Surface-following bound for a node whose query point is `distance`
    /// away from the surface.
    #[inline]
    pub fn surface_bound(&self, reference_z: f64, distance: f64) -> f64 {
        match self {
            ColumnAnchor::Below => reference_z + distance,
            ColumnAnchor::Above => reference_z - distance,
        }
    }

    /// Order the surface-following and flat bounds as a column.
    #[inline]
    pub fn column(&self, surface_bound: f64, flat_z: f64) -> DepthColumn {
        match self {
            ColumnAnchor::Below => DepthColumn::new(flat_z, surface_bound),
            ColumnAnchor::Above => DepthColumn::new(surface_bound, flat_z),
        }
    }
}

impl std::str::FromStr for ColumnAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "below" => Ok(ColumnAnchor::Below),
            "above" => Ok(ColumnAnchor::Above),
            other => Err(format!("unknown anchor '{}', expected below or above", other)),
        }
    }
}

/// Position of the flat column bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatBound {
    /// Offset from the surface extreme on the anchor side: `z_min - m` when
    /// anchored below, `z_max + m` when anchored above.
    Margin(f64),
    /// A fixed height.
    Absolute(f64),
}

impl Default for FlatBound {
    fn default() -> Self {
        FlatBound::Margin(6000.0)
    }
}

impl FlatBound {
    /// Height of the flat bound for a surface spanning `[z_min, z_max]`.
    pub fn resolve(&self, anchor: ColumnAnchor, z_min: f64, z_max: f64) -> f64 {
        match (self, anchor) {
            (FlatBound::Absolute(z), _) => *z,
            (FlatBound::Margin(m), ColumnAnchor::Below) => z_min - m,
            (FlatBound::Margin(m), ColumnAnchor::Above) => z_max + m,
        }
    }

    fn value(&self) -> f64 {
        match self {
            FlatBound::Margin(v) | FlatBound::Absolute(v) => *v,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.value().is_finite()
    }
}

/// Vertical extent of one column, always running floor to ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthColumn {
    pub floor: f64,
    pub ceiling: f64,
}

impl DepthColumn {
    #[inline]
    pub fn new(floor: f64, ceiling: f64) -> Self {
        Self { floor, ceiling }
    }

    /// Layer spacing; 0 when there are no layers.
    #[inline]
    pub fn dz(&self, layers: u32) -> f64 {
        if layers == 0 {
            0.0
        } else {
            (self.ceiling - self.floor) / layers as f64
        }
    }

    /// Height of level `layer`.
    #[inline]
    pub fn z(&self, layer: u32, layers: u32) -> f64 {
        self.floor + layer as f64 * self.dz(layers)
    }

    /// Ceiling not above floor, or either bound non-finite.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.floor.is_finite() && self.ceiling.is_finite()) || self.ceiling <= self.floor
    }
}
