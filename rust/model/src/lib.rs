// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BEM-Lite Model
//!
//! Building energy model object store. Regions, surfaces, sub-surfaces and
//! constructions live in slot maps and refer to each other by key. An
//! adjacency link between two surfaces is a pair of keys kept symmetric by
//! the adjacency manager, together with the paired boundary condition.
//!
//! The intersection engine splits facing surfaces of neighbouring regions
//! into matching pieces, after which [`Model::match_surfaces`] pairs the
//! pieces that coincide.

pub mod adjacency;
pub mod error;
pub mod intersection;
pub mod keys;
pub mod model;
pub mod serialization;
pub mod traits;

pub use error::{Error, Result};
pub use intersection::IntersectionResult;
pub use keys::{ConstructionKey, RegionKey, SubSurfaceKey, SurfaceKey};
pub use model::{ConstructionData, Model, RegionData, SubSurfaceData, SurfaceData};
pub use serialization::{
    ConstructionSnapshot, ModelSnapshot, RegionSnapshot, SubSurfaceSnapshot, SurfaceSnapshot,
};
pub use traits::{HasAdjacency, HasPlane, HasSubSurfaces};
