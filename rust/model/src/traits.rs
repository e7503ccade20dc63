// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability traits shared by surfaces and sub-surfaces.
//!
//! Geometry reported through [`HasPlane`] is in the owning region's frame.

use bem_lite_geometry::{azimuth, loop_area, tilt, Plane, Point3, Vector3};

use crate::keys::{SubSurfaceKey, SurfaceKey};
use crate::model::{SubSurfaceData, SurfaceData};

/// An entity bounded by a planar vertex loop.
pub trait HasPlane {
    fn vertices(&self) -> &[Point3<f64>];

    fn plane(&self) -> &Plane;

    fn area(&self) -> f64 {
        loop_area(self.vertices())
    }

    fn outward_normal(&self) -> Vector3<f64> {
        self.plane().normal
    }

    /// Angle from straight up, in `[0, π]`.
    fn tilt(&self) -> f64 {
        // Stored planes always carry a unit normal
        tilt(&self.plane().normal).unwrap_or(0.0)
    }

    /// Clockwise angle from north, in `[0, 2π)`.
    fn azimuth(&self) -> f64 {
        azimuth(&self.plane().normal).unwrap_or(0.0)
    }
}

/// An entity that may be paired with a mirror image of itself.
pub trait HasAdjacency {
    type Key: Copy + PartialEq;

    fn adjacent(&self) -> Option<Self::Key>;

    fn is_paired(&self) -> bool {
        self.adjacent().is_some()
    }
}

/// An entity that hosts windows and doors.
pub trait HasSubSurfaces {
    fn sub_surfaces(&self) -> &[SubSurfaceKey];

    fn has_sub_surfaces(&self) -> bool {
        !self.sub_surfaces().is_empty()
    }
}

impl HasPlane for SurfaceData {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn plane(&self) -> &Plane {
        &self.plane
    }
}

impl HasAdjacency for SurfaceData {
    type Key = SurfaceKey;

    fn adjacent(&self) -> Option<SurfaceKey> {
        self.adjacent
    }
}

impl HasSubSurfaces for SurfaceData {
    fn sub_surfaces(&self) -> &[SubSurfaceKey] {
        &self.sub_surfaces
    }
}

impl HasPlane for SubSurfaceData {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn plane(&self) -> &Plane {
        &self.plane
    }
}

impl HasAdjacency for SubSurfaceData {
    type Key = SubSurfaceKey;

    fn adjacent(&self) -> Option<SubSurfaceKey> {
        self.adjacent
    }
}
