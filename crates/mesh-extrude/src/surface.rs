//! Nearest-distance queries against the reference surface.
//!
//! The depth field only needs one question answered per base node: how far is
//! this point from the closest point of the surface? [`SurfaceDistanceIndex`]
//! is that seam. [`BvhIndex`] answers it through parry's triangle mesh BVH and
//! is the default; [`BruteForceIndex`] scans every triangle and serves as the
//! reference in tests.

use nalgebra::{Point3, Vector3};
use parry3d_f64::query::PointQuery;
use parry3d_f64::shape::TriMesh;
use tracing::{debug, info};

use mesh_core::TriSurface;

use crate::error::{ExtrudeError, ExtrudeResult};

/// Index answering nearest-distance queries against a fixed surface.
///
/// Implementations are built once and then only read, so they can be shared
/// across threads.
pub trait SurfaceDistanceIndex: Sync + Sized {
    /// Build the index. Fails on empty or fully degenerate surfaces.
    fn build(surface: &TriSurface) -> ExtrudeResult<Self>;

    /// Unsigned Euclidean distance from `point` to the closest surface point.
    fn nearest_distance(&self, point: &Point3<f64>) -> ExtrudeResult<f64>;
}

/// Triangles with non-zero area, as vertex index triples.
fn usable_triangles(surface: &TriSurface) -> ExtrudeResult<Vec<[u32; 3]>> {
    if surface.is_empty() {
        return Err(ExtrudeError::EmptySurface);
    }

    let vertex_count = surface.vertex_count();
    let mut kept = Vec::with_capacity(surface.triangle_count());
    for (t, tri) in surface.triangles.iter().enumerate() {
        if tri.iter().any(|&v| v as usize >= vertex_count) {
            return Err(ExtrudeError::degenerate_surface(format!(
                "triangle {} references a vertex outside 0..{}",
                t, vertex_count
            )));
        }
        let a = surface.vertices[tri[0] as usize];
        let b = surface.vertices[tri[1] as usize];
        let c = surface.vertices[tri[2] as usize];
        if (b - a).cross(&(c - a)).norm_squared() > 0.0 {
            kept.push(*tri);
        }
    }

    if kept.is_empty() {
        return Err(ExtrudeError::degenerate_surface(format!(
            "all {} triangles have zero area",
            surface.triangle_count()
        )));
    }

    let dropped = surface.triangle_count() - kept.len();
    if dropped > 0 {
        debug!(dropped, "Ignoring zero-area surface triangles");
    }
    Ok(kept)
}

fn check_distance(distance: f64, point: &Point3<f64>) -> ExtrudeResult<f64> {
    if distance.is_finite() {
        Ok(distance)
    } else {
        Err(ExtrudeError::OracleFailed {
            node: usize::MAX,
            details: format!(
                "non-finite distance {} at ({}, {}, {})",
                distance, point.x, point.y, point.z
            ),
        })
    }
}

/// Distance index backed by parry's BVH over the surface triangles.
pub struct BvhIndex {
    trimesh: TriMesh,
}

impl SurfaceDistanceIndex for BvhIndex {
    fn build(surface: &TriSurface) -> ExtrudeResult<Self> {
        let indices = usable_triangles(surface)?;

        let vertices: Vec<parry3d_f64::math::Point<f64>> = surface
            .vertices
            .iter()
            .map(|v| parry3d_f64::math::Point::new(v.x, v.y, v.z))
            .collect();

        let trimesh = TriMesh::new(vertices, indices);

        info!(
            vertices = surface.vertex_count(),
            triangles = trimesh.num_triangles(),
            "Built surface distance BVH"
        );
        Ok(Self { trimesh })
    }

    fn nearest_distance(&self, point: &Point3<f64>) -> ExtrudeResult<f64> {
        let query = parry3d_f64::math::Point::new(point.x, point.y, point.z);
        check_distance(self.trimesh.distance_to_local_point(&query, false), point)
    }
}

/// Exact linear scan over all triangles.
pub struct BruteForceIndex {
    triangles: Vec<[Point3<f64>; 3]>,
}

impl SurfaceDistanceIndex for BruteForceIndex {
    fn build(surface: &TriSurface) -> ExtrudeResult<Self> {
        let triangles = usable_triangles(surface)?
            .into_iter()
            .map(|t| {
                [
                    surface.vertices[t[0] as usize],
                    surface.vertices[t[1] as usize],
                    surface.vertices[t[2] as usize],
                ]
            })
            .collect();
        Ok(Self { triangles })
    }

    fn nearest_distance(&self, point: &Point3<f64>) -> ExtrudeResult<f64> {
        let best = self
            .triangles
            .iter()
            .map(|[a, b, c]| (point - closest_point_on_triangle(point, a, b, c)).norm_squared())
            .fold(f64::INFINITY, f64::min);
        check_distance(best.sqrt(), point)
    }
}

/// Closest point to `p` on triangle `abc` (Ericson, Real-Time Collision
/// Detection, 5.1.5).
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab: Vector3<f64> = b - a;
    let ac: Vector3<f64> = c - a;
    let ap: Vector3<f64> = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}
