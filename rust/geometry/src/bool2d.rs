// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Footprint Splitting
//!
//! Polygon intersection and difference on in-plane footprints using the
//! i_overlay crate. Results may contain holes; [`explode`] cuts those apart
//! so every piece can be stored as a simple vertex loop.

use crate::error::{Error, Result};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Epsilon for floating point comparisons in 2D operations
const EPSILON_2D: f64 = 1e-9;

/// Hole cuts deeper than this indicate a malformed overlay result.
const MAX_CUT_DEPTH: usize = 64;

/// A planar region: counter-clockwise outer boundary plus clockwise holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2D {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Polygon2D {
    /// Simple polygon without holes.
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer: ensure_ccw(&outer),
            holes: Vec::new(),
        }
    }

    /// Net area (outer minus holes).
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| compute_signed_area(h).abs())
            .sum();
        compute_signed_area(&self.outer).abs() - holes
    }

    fn to_paths(&self) -> Vec<Vec<[f64; 2]>> {
        let mut paths = Vec::with_capacity(1 + self.holes.len());
        paths.push(contour_to_path(&ensure_ccw(&self.outer)));
        for hole in &self.holes {
            paths.push(contour_to_path(&ensure_cw(hole)));
        }
        paths
    }
}

/// Overlap of two simple polygons.
pub fn intersection(a: &Polygon2D, b: &Polygon2D) -> Result<Vec<Polygon2D>> {
    overlay(a, b, OverlayRule::Intersect)
}

/// Part of `a` not covered by `b`.
pub fn difference(a: &Polygon2D, b: &Polygon2D) -> Result<Vec<Polygon2D>> {
    overlay(a, b, OverlayRule::Difference)
}

fn overlay(a: &Polygon2D, b: &Polygon2D, rule: OverlayRule) -> Result<Vec<Polygon2D>> {
    if a.outer.len() < 3 || b.outer.len() < 3 {
        return Err(Error::Boolean(
            "operands must have at least 3 vertices".to_string(),
        ));
    }

    let subject = a.to_paths();
    let clip = b.to_paths();

    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let result = subject.overlay(&clip, rule, FillRule::EvenOdd);
    Ok(shapes_to_polygons(&result))
}

/// Splits polygons with holes into simple pieces and drops slivers.
///
/// A polygon with a hole is cut by a vertical line through the middle of the
/// hole's x-extent; both halves are processed again until no holes remain.
/// Pieces with area at or below `area_tolerance` are discarded.
pub fn explode(polygons: Vec<Polygon2D>, area_tolerance: f64) -> Result<Vec<Vec<Point2<f64>>>> {
    let mut pieces = Vec::new();
    for polygon in polygons {
        explode_into(polygon, area_tolerance, 0, &mut pieces)?;
    }
    Ok(pieces)
}

fn explode_into(
    polygon: Polygon2D,
    area_tolerance: f64,
    depth: usize,
    out: &mut Vec<Vec<Point2<f64>>>,
) -> Result<()> {
    if polygon.area() <= area_tolerance {
        return Ok(());
    }

    let Some(hole) = polygon.holes.first() else {
        out.push(simplify_contour(&polygon.outer, EPSILON_2D));
        return Ok(());
    };

    if depth >= MAX_CUT_DEPTH {
        return Err(Error::Boolean(format!(
            "hole removal did not converge after {MAX_CUT_DEPTH} cuts"
        )));
    }

    let (hole_min, hole_max) = contour_bounds(hole)
        .ok_or_else(|| Error::Boolean("empty hole contour".to_string()))?;
    let (min, max) = contour_bounds(&polygon.outer)
        .ok_or_else(|| Error::Boolean("empty outer contour".to_string()))?;
    let cut_x = 0.5 * (hole_min.x + hole_max.x);

    // Slabs reach past the outer bounds so the cut line is the only new edge
    let pad = 1.0 + (max.x - min.x).max(max.y - min.y);
    let slabs = [
        rectangle(min.x - pad, min.y - pad, cut_x, max.y + pad),
        rectangle(cut_x, min.y - pad, max.x + pad, max.y + pad),
    ];

    for slab in &slabs {
        for half in intersection(&polygon, slab)? {
            explode_into(half, area_tolerance, depth + 1, out)?;
        }
    }
    Ok(())
}

fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon2D {
    Polygon2D::new(vec![
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ])
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Remove collinear and repeated points
pub fn simplify_contour(contour: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut result = Vec::with_capacity(contour.len());
    let n = contour.len();

    for i in 0..n {
        let prev = &contour[(i + n - 1) % n];
        let curr = &contour[i];
        let next = &contour[(i + 1) % n];

        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);

        if cross.abs() > epsilon {
            result.push(*curr);
        }
    }

    if result.len() < 3 {
        return contour.to_vec();
    }

    result
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < EPSILON_2D * EPSILON_2D {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

/// Inside the contour or within `tolerance` of its boundary.
pub fn point_in_or_on_contour(point: &Point2<f64>, contour: &[Point2<f64>], tolerance: f64) -> bool {
    if point_in_contour(point, contour) {
        return true;
    }
    let n = contour.len();
    (0..n).any(|i| distance_to_segment(point, &contour[i], &contour[(i + 1) % n]) <= tolerance)
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Check if two bounding boxes overlap
pub fn bounds_overlap(
    a_min: &Point2<f64>,
    a_max: &Point2<f64>,
    b_min: &Point2<f64>,
    b_max: &Point2<f64>,
) -> bool {
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    let mut points: Vec<Point2<f64>> = path.iter().map(|p| Point2::new(p[0], p[1])).collect();
    // Drop an explicit closing vertex
    if points.len() > 1 && (points[0] - points[points.len() - 1]).norm() < EPSILON_2D {
        points.pop();
    }
    points
}

/// Convert i_overlay result shapes into polygons
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_polygons(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Polygon2D> {
    shapes
        .iter()
        .filter_map(|shape| {
            let (outer, holes) = shape.split_first()?;
            let outer = path_to_contour(outer);
            if outer.len() < 3 {
                return None;
            }
            let holes = holes
                .iter()
                .map(|h| path_to_contour(h))
                .filter(|h| h.len() >= 3)
                .map(|h| ensure_cw(&h))
                .collect();
            Some(Polygon2D {
                outer: ensure_ccw(&outer),
                holes,
            })
        })
        .collect()
}
