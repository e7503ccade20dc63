// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric tolerances shared by every geometric predicate.

/// Tolerances and classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Absolute distance tolerance (length units) for point and plane comparisons.
    pub length_tolerance: f64,
    /// Overlaps smaller than this fraction of the combined bounding-box area
    /// are treated as empty.
    pub area_tolerance_fraction: f64,
    /// Angle (radians) from straight up/down within which a surface is
    /// classified as horizontal.
    pub horizontal_tilt_threshold: f64,
}

impl GeometryConfig {
    pub const DEFAULT_LENGTH_TOLERANCE: f64 = 1e-6;
    pub const DEFAULT_AREA_TOLERANCE_FRACTION: f64 = 1e-6;
    pub const DEFAULT_TILT_THRESHOLD_DEG: f64 = 10.0;

    /// Load tolerances from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            length_tolerance: std::env::var("BEM_LENGTH_TOLERANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.length_tolerance),
            area_tolerance_fraction: std::env::var("BEM_AREA_TOLERANCE_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.area_tolerance_fraction),
            horizontal_tilt_threshold: std::env::var("BEM_TILT_THRESHOLD_DEG")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| (0.0..90.0).contains(v))
                .map(f64::to_radians)
                .unwrap_or(defaults.horizontal_tilt_threshold),
        }
    }

    /// Area tolerance for a pair of footprints whose combined bounding box
    /// has the given area.
    pub fn area_tolerance(&self, bbox_area: f64) -> f64 {
        (self.area_tolerance_fraction * bbox_area).max(self.length_tolerance * self.length_tolerance)
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            length_tolerance: Self::DEFAULT_LENGTH_TOLERANCE,
            area_tolerance_fraction: Self::DEFAULT_AREA_TOLERANCE_FRACTION,
            horizontal_tilt_threshold: Self::DEFAULT_TILT_THRESHOLD_DEG.to_radians(),
        }
    }
}
