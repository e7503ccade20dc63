// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BEM-Lite Geometry
//!
//! Planar vertex-loop primitives for building energy models: Newell normals
//! and planes, tilt/azimuth based surface classification, default boundary
//! conditions, and splitting of facing loops into matching pieces using
//! i_overlay for the 2D clipping.

pub mod bool2d;
pub mod classify;
pub mod config;
pub mod error;
pub mod intersect;
pub mod plane;

// Re-export nalgebra types for convenience
pub use nalgebra::{
    Isometry3, Point2, Point3, Quaternion, Translation3, UnitQuaternion, Vector2, Vector3,
};

pub use classify::{
    azimuth, classify_loop, default_boundary_condition, default_surface_type, tilt,
    BoundaryAssignment, BoundaryCondition, Neighbor, SubSurfaceType, SurfaceType,
};
pub use config::GeometryConfig;
pub use error::{Error, Result};
pub use intersect::{contains_loop, footprints_coincide, intersect_loops, LoopIntersection, LoopSplit};
pub use plane::{
    loop_area, loop_centroid, newell_vector, normalize, outward_normal, points_near, reverse_loop,
    Plane, PlaneBasis,
};
