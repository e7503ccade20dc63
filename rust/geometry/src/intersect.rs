// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting of facing vertex loops into matching pieces.
//!
//! Both loops are projected into a frame on the first loop's plane, clipped
//! with [`crate::bool2d`], and lifted back. Returned loops keep the
//! outward-normal winding of the loop they came from.

use nalgebra::{Point2, Point3};

use crate::bool2d::{self, Polygon2D};
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::plane::{loop_centroid, reverse_loop, Plane, PlaneBasis};

/// Pieces produced by intersecting two facing loops.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSplit {
    /// Shared footprint, wound like A.
    pub overlap_a: Vec<Point3<f64>>,
    /// Parts of A outside the overlap.
    pub leftovers_a: Vec<Vec<Point3<f64>>>,
    /// Shared footprint, wound like B (A's overlap reversed).
    pub overlap_b: Vec<Point3<f64>>,
    pub leftovers_b: Vec<Vec<Point3<f64>>>,
}

/// Outcome of [`intersect_loops`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoopIntersection {
    /// Planes are neither equal nor reverse-equal.
    NotCoplanar,
    /// Planes are equal; same-facing loops are never split.
    SameSense,
    /// Facing planes, but the footprints share at most an edge or vertex.
    NoOverlap,
    Split(LoopSplit),
}

/// Intersects loop `a` with loop `b`.
///
/// When the overlap falls apart into several disjoint pieces the largest is
/// the matched pair and the others are reported as leftovers on both sides.
pub fn intersect_loops(
    a: &[Point3<f64>],
    b: &[Point3<f64>],
    config: &GeometryConfig,
) -> Result<LoopIntersection> {
    let plane_a = Plane::from_loop(a)?;
    let plane_b = Plane::from_loop(b)?;
    let tol = config.length_tolerance;

    if plane_a.equal(&plane_b, tol) {
        return Ok(LoopIntersection::SameSense);
    }
    if !plane_a.reverse_equal(&plane_b, tol) {
        return Ok(LoopIntersection::NotCoplanar);
    }

    let origin = loop_centroid(a).ok_or(Error::DegenerateLoop { vertices: 0 })?;
    let basis = PlaneBasis::new(&plane_a, &origin)?;

    let poly_a = Polygon2D::new(basis.project_loop(a));
    let poly_b = Polygon2D::new(basis.project_loop(b));
    if !footprint_bounds_overlap(&poly_a, &poly_b) {
        return Ok(LoopIntersection::NoOverlap);
    }
    let area_tol = config.area_tolerance(combined_bounds_area(&poly_a, &poly_b));

    let mut overlap = bool2d::explode(bool2d::intersection(&poly_a, &poly_b)?, area_tol)?;
    if overlap.is_empty() {
        return Ok(LoopIntersection::NoOverlap);
    }
    overlap.sort_by(|p, q| {
        contour_area(q)
            .partial_cmp(&contour_area(p))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let extra = overlap.split_off(1);
    let main = overlap.remove(0);

    let mut rest_a = bool2d::explode(bool2d::difference(&poly_a, &poly_b)?, area_tol)?;
    let mut rest_b = bool2d::explode(bool2d::difference(&poly_b, &poly_a)?, area_tol)?;
    rest_a.extend(extra.iter().cloned());
    rest_b.extend(extra);

    let overlap_a = basis.unproject_loop(&main);
    let overlap_b = reverse_loop(&overlap_a);

    Ok(LoopIntersection::Split(LoopSplit {
        overlap_a,
        leftovers_a: rest_a.iter().map(|c| basis.unproject_loop(c)).collect(),
        overlap_b,
        leftovers_b: rest_b
            .iter()
            .map(|c| reverse_loop(&basis.unproject_loop(c)))
            .collect(),
    }))
}

/// `true` if the loops are the two faces of one partition: reverse-equal
/// planes and the same footprint.
pub fn footprints_coincide(
    a: &[Point3<f64>],
    b: &[Point3<f64>],
    config: &GeometryConfig,
) -> Result<bool> {
    Ok(match intersect_loops(a, b, config)? {
        LoopIntersection::Split(split) => {
            split.leftovers_a.is_empty() && split.leftovers_b.is_empty()
        }
        _ => false,
    })
}

/// `true` if `inner` faces the same way as `outer`, lies on its plane and
/// sits inside (or on the boundary of) its footprint.
pub fn contains_loop(
    outer: &[Point3<f64>],
    inner: &[Point3<f64>],
    config: &GeometryConfig,
) -> Result<bool> {
    let plane = Plane::from_loop(outer)?;
    let inner_plane = Plane::from_loop(inner)?;
    let tol = config.length_tolerance;

    if (plane.normal - inner_plane.normal).norm() > tol {
        return Ok(false);
    }
    if !inner.iter().all(|p| plane.is_point_on_plane(p, tol)) {
        return Ok(false);
    }

    let origin = loop_centroid(outer).ok_or(Error::DegenerateLoop { vertices: 0 })?;
    let basis = PlaneBasis::new(&plane, &origin)?;
    let contour = basis.project_loop(outer);
    Ok(basis
        .project_loop(inner)
        .iter()
        .all(|p| bool2d::point_in_or_on_contour(p, &contour, tol)))
}

fn contour_area(contour: &[Point2<f64>]) -> f64 {
    bool2d::compute_signed_area(contour).abs()
}

fn footprint_bounds_overlap(a: &Polygon2D, b: &Polygon2D) -> bool {
    match (bool2d::contour_bounds(&a.outer), bool2d::contour_bounds(&b.outer)) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => {
            bool2d::bounds_overlap(&a_min, &a_max, &b_min, &b_max)
        }
        _ => false,
    }
}

fn combined_bounds_area(a: &Polygon2D, b: &Polygon2D) -> f64 {
    let points: Vec<Point2<f64>> = a.outer.iter().chain(&b.outer).copied().collect();
    match bool2d::contour_bounds(&points) {
        Some((min, max)) => (max.x - min.x) * (max.y - min.y),
        None => 0.0,
    }
}
