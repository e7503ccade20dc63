// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane relations and classification over a hand-picked set of loops.

use approx::assert_relative_eq;
use bem_lite_geometry::{
    classify_loop, intersect_loops, loop_area, reverse_loop, GeometryConfig, LoopIntersection,
    Plane, Point3, SurfaceType, Vector3,
};

fn sample_loops() -> Vec<Vec<Point3<f64>>> {
    let square = vec![
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ];
    let wall = vec![
        Point3::new(0.0, 0.0, 3.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 3.0),
    ];
    let pitched = vec![
        Point3::new(0.0, 0.0, 2.0),
        Point3::new(4.0, 0.0, 2.0),
        Point3::new(4.0, 3.0, 4.0),
        Point3::new(0.0, 3.0, 4.0),
    ];
    // Collinear midpoints mixed into a triangle
    let triangle = vec![
        Point3::new(0.0, 0.0, 5.0),
        Point3::new(1.0, 0.0, 5.0),
        Point3::new(2.0, 0.0, 5.0),
        Point3::new(1.0, 1.0, 5.0),
        Point3::new(0.0, 2.0, 5.0),
    ];
    let shifted_wall: Vec<_> = wall.iter().map(|p| p + offset_y(0.5)).collect();

    let mut loops = vec![square, wall, pitched, triangle, shifted_wall];
    let reversed: Vec<_> = loops.iter().map(|l| reverse_loop(l)).collect();
    loops.extend(reversed);
    loops
}

fn offset_y(d: f64) -> Vector3<f64> {
    Vector3::new(0.0, d, 0.0)
}

#[test]
fn test_reverse_equal_is_symmetric() {
    let tol = GeometryConfig::default().length_tolerance;
    let planes: Vec<Plane> = sample_loops()
        .iter()
        .map(|l| Plane::from_loop(l).unwrap())
        .collect();

    let mut reverse_pairs = 0;
    for a in &planes {
        for b in &planes {
            assert_eq!(a.reverse_equal(b, tol), b.reverse_equal(a, tol));
            assert_eq!(a.equal(b, tol), b.equal(a, tol));
            assert!(!(a.equal(b, tol) && a.reverse_equal(b, tol)));
            if a.reverse_equal(b, tol) {
                reverse_pairs += 1;
            }
        }
    }
    // Each loop against its own reversal, counted from both sides
    assert_eq!(reverse_pairs, 10);
}

#[test]
fn test_classification_is_deterministic() {
    let config = GeometryConfig::default();
    for l in sample_loops() {
        let first = classify_loop(&l, &config).unwrap();
        let second = classify_loop(&l, &config).unwrap();
        assert_eq!(first, second);
    }

    let loops = sample_loops();
    assert_eq!(classify_loop(&loops[0], &config).unwrap(), SurfaceType::RoofCeiling);
    assert_eq!(classify_loop(&loops[5], &config).unwrap(), SurfaceType::Floor);
    assert_eq!(classify_loop(&loops[1], &config).unwrap(), SurfaceType::Wall);
    // About 34 degrees of slope is still a wall
    assert_eq!(classify_loop(&loops[2], &config).unwrap(), SurfaceType::Wall);
}

#[test]
fn test_split_conserves_area_on_both_sides() {
    let config = GeometryConfig::default();
    let a = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
    ];
    let b = reverse_loop(&[
        Point3::new(3.0, 3.0, 0.0),
        Point3::new(14.0, 3.0, 0.0),
        Point3::new(14.0, 7.0, 0.0),
        Point3::new(3.0, 7.0, 0.0),
    ]);

    let LoopIntersection::Split(split) = intersect_loops(&a, &b, &config).unwrap() else {
        panic!("expected a split");
    };
    let total_a = loop_area(&split.overlap_a) + split.leftovers_a.iter().map(|l| loop_area(l)).sum::<f64>();
    let total_b = loop_area(&split.overlap_b) + split.leftovers_b.iter().map(|l| loop_area(l)).sum::<f64>();
    assert_relative_eq!(total_a, 100.0, epsilon = 1e-6);
    assert_relative_eq!(total_b, 44.0, epsilon = 1e-6);
    assert_relative_eq!(loop_area(&split.overlap_a), 28.0, epsilon = 1e-6);

    // Every piece keeps its owner's facing
    let tol = config.length_tolerance;
    let plane_a = Plane::from_loop(&a).unwrap();
    let plane_b = Plane::from_loop(&b).unwrap();
    for piece in std::iter::once(&split.overlap_a).chain(&split.leftovers_a) {
        assert!(Plane::from_loop(piece).unwrap().equal(&plane_a, tol));
    }
    for piece in std::iter::once(&split.overlap_b).chain(&split.leftovers_b) {
        assert!(Plane::from_loop(piece).unwrap().equal(&plane_b, tol));
    }
}
