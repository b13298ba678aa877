// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! 3D rings are projected onto their own plane and handed to earcutr.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Normal of a polygon using Newell's method.
///
/// Sums over every consecutive vertex pair, so it tolerates mildly non-planar
/// rings and does not depend on the start vertex. Falls back to +Z for
/// degenerate input.
#[inline]
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    if len > 1e-10 {
        normal / len
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    }
}

/// Orthonormal in-plane axes for a unit normal
#[inline]
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    // Reference axis least parallel to the normal
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = (reference - normal * reference.dot(normal)).normalize();
    let v_axis = normal.cross(&u_axis);

    (u_axis, v_axis)
}

/// Project 3D points onto the plane through the first point with `normal`
#[inline]
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points_3d.first() else {
        return Vec::new();
    };
    let (u_axis, v_axis) = plane_basis(normal);

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Triangulate a 2D polygon whose holes start at `hole_offsets`.
/// Returns triangle indices into `points`.
#[inline]
pub fn triangulate_polygon_with_holes(
    points: &[Point2<f64>],
    hole_offsets: &[usize],
) -> Result<Vec<usize>> {
    if points.len() < 3 {
        return Err(Error::DegenerateRing(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let mut vertices = Vec::with_capacity(points.len() * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, hole_offsets, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a 3D ring (outer boundary followed by holes).
///
/// Projects onto the plane given by the outer ring's Newell normal and
/// returns triangle indices into `points`.
pub fn triangulate_ring(points: &[Point3<f64>], hole_offsets: &[usize]) -> Result<Vec<usize>> {
    let outer_len = hole_offsets.first().copied().unwrap_or(points.len()).min(points.len());
    let normal = newell_normal(&points[..outer_len]);
    let projected = project_to_2d(points, &normal);
    triangulate_polygon_with_holes(&projected, hole_offsets)
}
