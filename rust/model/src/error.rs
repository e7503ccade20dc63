// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model operations.

use crate::keys::{ConstructionKey, RegionKey, SubSurfaceKey, SurfaceKey};

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during model operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Region key not found in the arena.
    #[error("region not found: {0:?}")]
    RegionNotFound(RegionKey),

    /// Surface key not found in the arena.
    #[error("surface not found: {0:?}")]
    SurfaceNotFound(SurfaceKey),

    /// Sub-surface key not found in the arena.
    #[error("sub-surface not found: {0:?}")]
    SubSurfaceNotFound(SubSurfaceKey),

    /// Construction key not found in the arena.
    #[error("construction not found: {0:?}")]
    ConstructionNotFound(ConstructionKey),

    /// A polygon needs at least 3 vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A sub-surface loop does not lie inside its host surface.
    #[error("sub-surface does not lie inside host surface {0:?}")]
    SubSurfaceOutsideParent(SurfaceKey),

    /// The paired tag can only be set through the adjacency manager.
    #[error("boundary condition Surface requires an adjacent surface: {0:?}")]
    PairedBoundaryCondition(SurfaceKey),

    /// Sub-surfaces can only be paired when their hosts are paired.
    #[error("host surfaces of {0:?} and {1:?} are not adjacent")]
    HostsNotPaired(SubSurfaceKey, SubSurfaceKey),

    /// Intersection would invalidate hosted sub-surfaces.
    #[error("surface {0:?} has sub-surfaces and cannot be intersected")]
    HasSubSurfaces(SurfaceKey),

    /// Intersection would invalidate an existing pairing with a third surface.
    #[error("surface {0:?} is already adjacent to another surface")]
    PairedElsewhere(SurfaceKey),

    /// A snapshot references an entity id that does not exist.
    #[error("dangling {0} reference in snapshot: {1}")]
    DanglingReference(&'static str, usize),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Geometry(#[from] bem_lite_geometry::Error),
}
