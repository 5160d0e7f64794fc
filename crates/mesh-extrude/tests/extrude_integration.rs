//! End-to-end extrusion tests through real files.

use std::path::Path;

use approx::assert_relative_eq;
use mesh_core::{gmsh, HexMesh, QuadMesh, TriSurface};
use mesh_extrude::{
    extrude, BruteForceIndex, ColumnAnchor, ExtrudeBuilder, ExtrudeError, ExtrudeParams,
    FlatBound,
};
use nalgebra::Point2;

const UNIT_QUAD_MSH: &str = "$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0 0 0
2 1 0 0
3 1 1 0
4 0 1 0
$EndNodes
$Elements
1
1 3 2 3 1 1 2 3 4
$EndElements
";

/// Flat square at z = -10 covering [-1, 2]^2.
const FLAT_GTS: &str = "4 5 2 GtsSurface GtsFace GtsEdge GtsVertex
-1 -1 -10
2 -1 -10
2 2 -10
-1 2 -10
1 2
2 3
3 1
3 4
4 1
1 2 3
4 5 3
";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_unit_quad_two_layers_exact_output() {
    let dir = tempfile::tempdir().unwrap();
    let base = QuadMesh::load(write(dir.path(), "base.msh", UNIT_QUAD_MSH)).unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();

    let params = ExtrudeParams::default()
        .with_layers(2)
        .with_flat_bound(FlatBound::Margin(10.0));
    let result = extrude(&base, &surface, &params).unwrap();

    let mut out = Vec::new();
    gmsh::write_hex_mesh_to(&result.mesh, &mut out).unwrap();

    let expected = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n        12\n\
1    0.000    0.000  -20.000\n\
2    1.000    0.000  -20.000\n\
3    1.000    1.000  -20.000\n\
4    0.000    1.000  -20.000\n\
5    0.000    0.000  -15.000\n\
6    1.000    0.000  -15.000\n\
7    1.000    1.000  -15.000\n\
8    0.000    1.000  -15.000\n\
9    0.000    0.000  -10.000\n\
10    1.000    0.000  -10.000\n\
11    1.000    1.000  -10.000\n\
12    0.000    1.000  -10.000\n\
$EndNodes\n$Elements\n         2\n\
1 5 2 3 1        1        2        3        4        5        6        7        8\n\
2 5 2 3 1        5        6        7        8        9       10       11       12\n\
$EndElements\n";

    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_saved_mesh_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();
    let base =
        QuadMesh::structured_grid(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), 4, 3, 11).unwrap();

    let result = ExtrudeBuilder::new(&base, &surface)
        .layers(6)
        .margin(90.0)
        .build()
        .unwrap();

    let out = dir.path().join("volume.msh");
    result.mesh.save(&out).unwrap();
    let reloaded = HexMesh::load(&out).unwrap();

    assert_eq!(reloaded.node_count(), 7 * 20);
    assert_eq!(reloaded.element_count(), 6 * 12);
    assert_eq!(reloaded.elements, result.mesh.elements);
    assert_eq!(reloaded.tags, result.mesh.tags);
    for (a, b) in reloaded.nodes.iter().zip(&result.mesh.nodes) {
        assert!((a - b).amax() <= 5e-4);
    }
    assert!(reloaded.validate().is_valid());
    assert_eq!(reloaded.validate().inverted_elements, 0);
}

#[test]
fn test_bvh_matches_brute_force() {
    let dir = tempfile::tempdir().unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();
    // Footprint extends past the surface so some queries land on its edges
    let base =
        QuadMesh::structured_grid(Point2::new(-3.0, -2.0), Point2::new(4.0, 3.0), 7, 5, 1).unwrap();

    let bvh = ExtrudeBuilder::new(&base, &surface)
        .layers(4)
        .build()
        .unwrap();
    let brute = ExtrudeBuilder::new(&base, &surface)
        .layers(4)
        .build_with::<BruteForceIndex>()
        .unwrap();

    for (a, b) in bvh.columns.iter().zip(&brute.columns) {
        assert_relative_eq!(a.floor, b.floor, epsilon = 1e-9);
        assert_relative_eq!(a.ceiling, b.ceiling, epsilon = 1e-6);
    }
}

#[test]
fn test_bedrock_layout() {
    let dir = tempfile::tempdir().unwrap();
    let base = QuadMesh::load(write(dir.path(), "base.msh", UNIT_QUAD_MSH)).unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();

    let params = ExtrudeParams::for_bedrock(30000.0).with_layers(30);
    assert_eq!(params.anchor, ColumnAnchor::Above);
    let result = extrude(&base, &surface, &params).unwrap();

    assert_eq!(result.mesh.node_count(), 31 * 4);
    assert_eq!(result.mesh.element_count(), 30);
    assert_relative_eq!(result.stats.dz_min, 30010.0 / 30.0, epsilon = 1e-9);
    let top = result.mesh.nodes[result.layout.node_id(3, 30) as usize];
    assert_relative_eq!(top.z, 30000.0, epsilon = 1e-6);
}

#[test]
fn test_degenerate_columns_fail_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let base = QuadMesh::load(write(dir.path(), "base.msh", UNIT_QUAD_MSH)).unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();

    let params = ExtrudeParams::for_bedrock(-50.0);
    let err = extrude(&base, &surface, &params).unwrap_err();
    assert!(matches!(err, ExtrudeError::DegenerateColumn { .. }));
    assert_eq!(err.code().as_str(), "EXTRUDE-2004");
}

#[test]
fn test_zero_layer_output_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let base = QuadMesh::load(write(dir.path(), "base.msh", UNIT_QUAD_MSH)).unwrap();
    let surface = TriSurface::load(write(dir.path(), "flat.gts", FLAT_GTS)).unwrap();

    let params = ExtrudeParams::default()
        .with_layers(0)
        .with_flat_bound(FlatBound::Margin(10.0));
    let result = extrude(&base, &surface, &params).unwrap();
    assert_eq!(result.mesh.node_count(), 4);
    assert_eq!(result.mesh.element_count(), 0);

    let out = dir.path().join("flat.msh");
    result.mesh.save(&out).unwrap();
    let reloaded = HexMesh::load(&out).unwrap();

    assert_eq!(reloaded.node_count(), 4);
    assert_eq!(reloaded.element_count(), 0);
    for (a, b) in reloaded.nodes.iter().zip(&result.mesh.nodes) {
        assert!((a - b).amax() <= 5e-4);
    }
}
