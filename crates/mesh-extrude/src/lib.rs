//! Surface-conforming hexahedral extrusion of quadrilateral meshes.
//!
//! Every node of a planar quadrilateral mesh becomes a vertical column of
//! nodes. One end of the column follows a triangulated reference surface
//! (bathymetry, bedrock), the other sits on a flat bound; the column is split
//! into equal layers and every quadrilateral becomes one hexahedron per layer.
//!
//! # Features
//!
//! - **Depth field**: per-column bounds from nearest-distance queries against
//!   the surface
//! - **Pluggable distance index**: BVH-backed by default, brute force for
//!   cross-checking
//! - **Layered numbering**: node `k * N + n`, hexahedron `k * E + e`
//! - **Tag policy**: propagate base tags or stamp fixed placeholders
//! - **Builder API**: fluent configuration, TOML-loadable parameters
//!
//! # Quick Start
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
//!     .build()
//!     .unwrap();
//!
//! println!(
//!     "dz in [{:.3}, {:.3}]",
//!     result.stats.dz_min, result.stats.dz_max
//! );
//! result.mesh.save("volume.msh").unwrap();
//! ```
//!
//! # Low-Level API
//!
//! ```no_run
//! use mesh_core::{QuadMesh, TriSurface};
//! use mesh_extrude::{
//!     build_depth_field, build_hex_connectivity, BvhIndex, ExtrudeParams,
//!     SurfaceDistanceIndex,
//! };
//!
//! let base = QuadMesh::load("base.msh").unwrap();
//! let surface = TriSurface::load("bedrock.gts").unwrap();
//! let params = ExtrudeParams::for_bedrock(30000.0);
//!
//! let index = BvhIndex::build(&surface).unwrap();
//! let bounds = surface.bounds().unwrap();
//! let field = build_depth_field(&base, &index, &bounds, &params).unwrap();
//! let hex = build_hex_connectivity(&base, &field.layout, params.tag_policy).unwrap();
//! assert_eq!(hex.elements.len(), field.layout.element_count(base.element_count()));
//! ```

mod builder;
mod connectivity;
mod depth;
mod error;
mod params;

pub mod layering;
pub mod surface;

pub use error::{ExtrudeError, ExtrudeErrorCode, ExtrudeRecoverySuggestion, ExtrudeResult};

// Builder API (recommended)
pub use builder::{extrude, extrude_with_index, ExtrudeBuilder, ExtrudeStats, ExtrusionResult};

pub use params::ExtrudeParams;

// Building blocks
pub use connectivity::{build_hex_connectivity, HexConnectivity, TagPolicy};
pub use depth::{build_depth_field, DegeneratePolicy, DepthField, DepthStats};
pub use layering::{ColumnAnchor, DepthColumn, FlatBound, LayerLayout};
pub use surface::{BruteForceIndex, BvhIndex, SurfaceDistanceIndex};
