//! Hexahedral connectivity from the base quadrilaterals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use mesh_core::{ElementTags, QuadMesh};

use crate::error::{ExtrudeError, ExtrudeResult};
use crate::layering::LayerLayout;

/// How volume elements get their Gmsh tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagPolicy {
    /// Copy physical and elementary tags from the base quadrilateral.
    #[default]
    Propagate,
    /// Give every element the same fixed tags.
    Placeholder { physical: i32, elementary: i32 },
}

impl TagPolicy {
    /// Fixed tags used by older tooling that ignored the base classification.
    pub const LEGACY_PLACEHOLDER: TagPolicy = TagPolicy::Placeholder {
        physical: 99,
        elementary: 2,
    };

    fn tags_for(&self, physical: i32, elementary: i32) -> ElementTags {
        match self {
            TagPolicy::Propagate => ElementTags::new(physical, elementary),
            TagPolicy::Placeholder {
                physical,
                elementary,
            } => ElementTags::new(*physical, *elementary),
        }
    }
}

/// Connectivity and tags of all hexahedra, ordered layer by layer.
#[derive(Debug, Clone, Default)]
pub struct HexConnectivity {
    pub elements: Vec<[u32; 8]>,
    pub tags: Vec<ElementTags>,
}

/// Build one hexahedron per base quadrilateral per layer.
///
/// Hexahedron `(k, e)` with base nodes `[n0, n1, n2, n3]` is
/// `[k·N+n0, …, k·N+n3, (k+1)·N+n0, …, (k+1)·N+n3]`, so both faces keep the
/// base winding and the second face sits above the first.
pub fn build_hex_connectivity(
    base: &QuadMesh,
    layout: &LayerLayout,
    tag_policy: TagPolicy,
) -> ExtrudeResult<HexConnectivity> {
    let node_count = base.node_count();
    for (e, element) in base.elements.iter().enumerate() {
        if let Some(&node) = element.nodes.iter().find(|&&n| n as usize >= node_count) {
            return Err(ExtrudeError::InvalidBaseNode {
                element: e,
                node,
                node_count,
            });
        }
    }

    let total = layout.element_count(base.element_count());
    let mut elements = Vec::with_capacity(total);
    let mut tags = Vec::with_capacity(total);

    for layer in 0..layout.layers {
        for element in &base.elements {
            let [n0, n1, n2, n3] = element.nodes;
            let lo = |n| layout.node_id(n, layer);
            let hi = |n| layout.node_id(n, layer + 1);
            elements.push([lo(n0), lo(n1), lo(n2), lo(n3), hi(n0), hi(n1), hi(n2), hi(n3)]);
            tags.push(tag_policy.tags_for(element.physical_tag, element.elementary_tag));
        }
    }

    debug!(
        hexahedra = elements.len(),
        ?tag_policy,
        "Built hexahedral connectivity"
    );
    Ok(HexConnectivity { elements, tags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::QuadElement;
    use nalgebra::Point2;

    /// Two quads sharing an edge: 0-1-4-3 and 1-2-5-4.
    fn strip() -> QuadMesh {
        let mut mesh = QuadMesh::new();
        mesh.nodes = (0..6)
            .map(|i| Point2::new((i % 3) as f64, (i / 3) as f64))
            .collect();
        mesh.elements = vec![
            QuadElement::with_tags([0, 1, 4, 3], 5, 1),
            QuadElement::with_tags([1, 2, 5, 4], 6, 2),
        ];
        mesh
    }

    #[test]
    fn test_single_quad_two_layers() {
        let mut base = strip();
        base.elements.truncate(1);
        let layout = LayerLayout::new(6, 2).unwrap();
        let hex = build_hex_connectivity(&base, &layout, TagPolicy::Propagate).unwrap();

        assert_eq!(hex.elements.len(), 2);
        assert_eq!(hex.elements[0], [0, 1, 4, 3, 6, 7, 10, 9]);
        assert_eq!(hex.elements[1], [6, 7, 10, 9, 12, 13, 16, 15]);
    }

    #[test]
    fn test_layer_major_order_and_tags() {
        let base = strip();
        let layout = LayerLayout::new(6, 3).unwrap();
        let hex = build_hex_connectivity(&base, &layout, TagPolicy::Propagate).unwrap();

        assert_eq!(hex.elements.len(), 6);
        assert_eq!(hex.tags.len(), 6);
        for layer in 0..3u32 {
            for e in 0..2 {
                let id = layout.element_id(layer, e, 2);
                assert_eq!(hex.elements[id][0], layout.node_id(base.elements[e].nodes[0], layer));
                assert_eq!(hex.tags[id], ElementTags::new(5 + e as i32, 1 + e as i32));
            }
        }
    }

    #[test]
    fn test_placeholder_tags() {
        let layout = LayerLayout::new(6, 1).unwrap();
        let hex =
            build_hex_connectivity(&strip(), &layout, TagPolicy::LEGACY_PLACEHOLDER).unwrap();
        assert!(hex.tags.iter().all(|t| *t == ElementTags::new(99, 2)));
    }

    #[test]
    fn test_zero_layers_has_no_elements() {
        let layout = LayerLayout::new(6, 0).unwrap();
        let hex = build_hex_connectivity(&strip(), &layout, TagPolicy::Propagate).unwrap();
        assert!(hex.elements.is_empty());
        assert!(hex.tags.is_empty());
    }

    #[test]
    fn test_out_of_range_base_node() {
        let mut base = strip();
        base.elements[1].nodes[2] = 6;
        let layout = LayerLayout::new(6, 1).unwrap();
        let err = build_hex_connectivity(&base, &layout, TagPolicy::Propagate).unwrap_err();
        assert!(matches!(
            err,
            ExtrudeError::InvalidBaseNode {
                element: 1,
                node: 6,
                node_count: 6
            }
        ));
    }
}
