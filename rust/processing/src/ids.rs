// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Insertion-ordered lookup table from input ids to model handles.

use bem_lite_model::{ConstructionKey, RegionKey};
use rustc_hash::FxHashMap;

use crate::diagnostics::Diagnostics;

/// What an input id resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handle {
    /// Materials only contribute their name to construction layers.
    Material(String),
    Construction(ConstructionKey),
    WindowType(Option<ConstructionKey>),
    Schedule(String),
    Zone(String),
    Region(RegionKey),
}

impl Handle {
    pub fn kind(&self) -> &'static str {
        match self {
            Handle::Material(_) => "material",
            Handle::Construction(_) => "construction",
            Handle::WindowType(_) => "window type",
            Handle::Schedule(_) => "schedule",
            Handle::Zone(_) => "zone",
            Handle::Region(_) => "region",
        }
    }
}

#[derive(Debug, Default)]
pub struct IdTable {
    order: Vec<String>,
    handles: FxHashMap<String, Handle>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warns and returns `false` if `id` is already declared.
    pub fn check_unique(&self, id: &str, diagnostics: &mut Diagnostics) -> bool {
        match self.handles.get(id) {
            Some(existing) => {
                diagnostics.warn(
                    Some(id),
                    format!(
                        "duplicate id (already declared as a {}), keeping the first declaration",
                        existing.kind()
                    ),
                );
                false
            }
            None => true,
        }
    }

    /// Registers `id`. A duplicate keeps the first declaration and warns.
    pub fn declare(&mut self, id: &str, handle: Handle, diagnostics: &mut Diagnostics) -> bool {
        if !self.check_unique(id, diagnostics) {
            return false;
        }
        self.order.push(id.to_string());
        self.handles.insert(id.to_string(), handle);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Handle> {
        self.handles.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Handle)> {
        self.order
            .iter()
            .filter_map(|id| self.handles.get(id).map(|h| (id.as_str(), h)))
    }

    /// Looks up `id` expecting a handle of kind `expected`.
    ///
    /// A miss or a handle of another kind warns against `referrer` and
    /// yields `None`.
    pub fn resolve<T>(
        &self,
        id: &str,
        expected: &'static str,
        referrer: Option<&str>,
        diagnostics: &mut Diagnostics,
        pick: impl FnOnce(&Handle) -> Option<T>,
    ) -> Option<T> {
        let Some(handle) = self.handles.get(id) else {
            diagnostics.warn(
                referrer,
                format!("referenced {expected} id '{id}' was never declared"),
            );
            return None;
        };
        let picked = pick(handle);
        if picked.is_none() {
            diagnostics.warn(
                referrer,
                format!("referenced id '{id}' is a {}, expected a {expected}", handle.kind()),
            );
        }
        picked
    }

    pub fn region(&self, id: &str, referrer: Option<&str>, d: &mut Diagnostics) -> Option<RegionKey> {
        self.resolve(id, "region", referrer, d, |h| match h {
            Handle::Region(k) => Some(*k),
            _ => None,
        })
    }

    pub fn construction(
        &self,
        id: &str,
        referrer: Option<&str>,
        d: &mut Diagnostics,
    ) -> Option<ConstructionKey> {
        self.resolve(id, "construction", referrer, d, |h| match h {
            Handle::Construction(k) => Some(*k),
            _ => None,
        })
    }

    /// Construction of a window type; `None` also when the type has none.
    pub fn window_type(
        &self,
        id: &str,
        referrer: Option<&str>,
        d: &mut Diagnostics,
    ) -> Option<ConstructionKey> {
        self.resolve(id, "window type", referrer, d, |h| match h {
            Handle::WindowType(k) => Some(*k),
            _ => None,
        })
        .flatten()
    }

    pub fn material(&self, id: &str, referrer: Option<&str>, d: &mut Diagnostics) -> Option<String> {
        self.resolve(id, "material", referrer, d, |h| match h {
            Handle::Material(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn zone(&self, id: &str, referrer: Option<&str>, d: &mut Diagnostics) -> Option<String> {
        self.resolve(id, "zone", referrer, d, |h| match h {
            Handle::Zone(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn schedule(&self, id: &str, referrer: Option<&str>, d: &mut Diagnostics) -> Option<String> {
        self.resolve(id, "schedule", referrer, d, |h| match h {
            Handle::Schedule(name) => Some(name.clone()),
            _ => None,
        })
    }
}
