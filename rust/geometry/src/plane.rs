// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point, vector and plane primitives for vertex loops.
//!
//! Vertex loops follow the outward-normal convention: looking from outside
//! the owning region toward it, vertices proceed counter-clockwise, so the
//! right-hand rule over the loop yields the outward normal.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};

/// Vectors shorter than this cannot be normalized.
pub const NORMAL_EPSILON: f64 = 1e-12;

/// Returns `true` if two points are within `tolerance` of each other.
pub fn points_near(a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// Normalizes a vector, failing for (near) zero length.
pub fn normalize(v: &Vector3<f64>) -> Result<Vector3<f64>> {
    let len = v.norm();
    if len < NORMAL_EPSILON {
        return Err(Error::DegenerateVector);
    }
    Ok(v / len)
}

/// Newell's method over an ordered loop.
///
/// The result is the area-weighted normal: its direction follows the
/// right-hand rule for the vertex order and its length is twice the loop
/// area. Collinear points contribute nothing, so they may be mixed in freely.
pub fn newell_vector(vertices: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    let n = vertices.len();

    for i in 0..n {
        let curr = &vertices[i];
        let next = &vertices[(i + 1) % n];

        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }

    normal
}

/// Unit outward normal of a vertex loop (right-hand rule).
pub fn outward_normal(vertices: &[Point3<f64>]) -> Result<Vector3<f64>> {
    if vertices.len() < 3 {
        return Err(Error::DegenerateLoop {
            vertices: vertices.len(),
        });
    }
    normalize(&newell_vector(vertices)).map_err(|_| Error::DegenerateLoop {
        vertices: vertices.len(),
    })
}

/// Area enclosed by a planar vertex loop.
pub fn loop_area(vertices: &[Point3<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    newell_vector(vertices).norm() / 2.0
}

/// Vertex average of a loop.
pub fn loop_centroid(vertices: &[Point3<f64>]) -> Option<Point3<f64>> {
    if vertices.is_empty() {
        return None;
    }
    let sum = vertices
        .iter()
        .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p.coords);
    Some(Point3::from(sum / vertices.len() as f64))
}

/// Returns the loop with its winding flipped.
pub fn reverse_loop(vertices: &[Point3<f64>]) -> Vec<Point3<f64>> {
    vertices.iter().rev().copied().collect()
}

/// An oriented plane `normal · p + offset = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Creates a plane through `point` facing along `normal`.
    pub fn from_point_normal(point: &Point3<f64>, normal: &Vector3<f64>) -> Result<Self> {
        let normal = normalize(normal)?;
        Ok(Self {
            normal,
            offset: -normal.dot(&point.coords),
        })
    }

    /// Best-fit plane of an ordered loop: Newell normal through the centroid.
    pub fn from_loop(vertices: &[Point3<f64>]) -> Result<Self> {
        let normal = outward_normal(vertices)?;
        let centroid = loop_centroid(vertices).ok_or(Error::DegenerateLoop { vertices: 0 })?;
        Ok(Self {
            normal,
            offset: -normal.dot(&centroid.coords),
        })
    }

    /// Signed distance from a point (positive on the side the normal points to).
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    pub fn is_point_on_plane(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        self.signed_distance(point).abs() <= tolerance
    }

    /// Orthogonal projection of a point onto the plane.
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Same plane, facing the other way.
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Same facing direction and same offset within tolerance.
    pub fn equal(&self, other: &Plane, tolerance: f64) -> bool {
        (self.normal - other.normal).norm() <= tolerance
            && (self.offset - other.offset).abs() <= tolerance
    }

    /// Coincident planes that face opposite directions.
    ///
    /// This is the expected relationship between the two faces of a
    /// partition shared by adjacent regions.
    pub fn reverse_equal(&self, other: &Plane, tolerance: f64) -> bool {
        (self.normal + other.normal).norm() <= tolerance
            && (self.offset + other.offset).abs() <= tolerance
    }
}

/// Right-handed in-plane frame `(u, v, normal)`.
///
/// Counter-clockwise loops in `(u, v)` map to loops whose outward normal is
/// `normal`.
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneBasis {
    /// Builds a frame on `plane`, centered on the projection of `origin`.
    pub fn new(plane: &Plane, origin: &Point3<f64>) -> Result<Self> {
        let n = normalize(&plane.normal)?;
        let helper = if n.z.abs() < 0.9 {
            Vector3::new(0.0, 0.0, 1.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u = normalize(&helper.cross(&n))?;
        let v = n.cross(&u);

        Ok(Self {
            origin: plane.project(origin),
            u,
            v,
            normal: n,
        })
    }

    /// Projects a 3D point into the frame.
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        let r = p - self.origin;
        Point2::new(r.dot(&self.u), r.dot(&self.v))
    }

    /// Lifts 2D frame coordinates back onto the plane.
    pub fn unproject(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u * p.x + self.v * p.y
    }

    pub fn project_loop(&self, vertices: &[Point3<f64>]) -> Vec<Point2<f64>> {
        vertices.iter().map(|p| self.project(p)).collect()
    }

    pub fn unproject_loop(&self, contour: &[Point2<f64>]) -> Vec<Point3<f64>> {
        contour.iter().map(|p| self.unproject(p)).collect()
    }
}
