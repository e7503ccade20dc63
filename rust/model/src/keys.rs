// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! entities are removed (generational indices). A removed entity's key simply
//! stops resolving, so the adjacency links stored as keys can never dangle
//! into reused memory.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a region (enclosed building space).
    pub struct RegionKey;

    /// Key for a surface (planar polygon owned by a region).
    pub struct SurfaceKey;

    /// Key for a sub-surface (window or door hosted by a surface).
    pub struct SubSurfaceKey;

    /// Key for a construction (layered assembly).
    pub struct ConstructionKey;
}
