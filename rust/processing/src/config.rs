// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolver configuration loaded from environment variables.

use std::str::FromStr;

use bem_lite_geometry::GeometryConfig;

/// What to do with a face whose two adjacency records name the same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfAdjacentPolicy {
    /// Warn and skip the face.
    #[default]
    Discard,
    /// Warn and create the face once with an adiabatic boundary.
    Adiabatic,
}

impl FromStr for SelfAdjacentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(SelfAdjacentPolicy::Discard),
            "adiabatic" => Ok(SelfAdjacentPolicy::Adiabatic),
            other => Err(format!("unknown self-adjacent policy: {other}")),
        }
    }
}

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Tolerances handed to the model.
    pub geometry: GeometryConfig,
    pub self_adjacent: SelfAdjacentPolicy,
    /// Pair separately declared faces that coincide once all faces are in.
    pub match_after_import: bool,
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            geometry: GeometryConfig::from_env(),
            self_adjacent: std::env::var("BEM_SELF_ADJACENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            match_after_import: std::env::var("BEM_MATCH_AFTER_IMPORT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            self_adjacent: SelfAdjacentPolicy::Discard,
            match_after_import: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
