// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BEM-Lite Processing
//!
//! Import pipeline shared by the file-format loaders: resolves flat face
//! records into regions, surfaces, openings and adjacent pairs of a
//! [`bem_lite_model::Model`], collecting every data-quality finding as a
//! diagnostic instead of failing.
//!
//! ```
//! use bem_lite_processing::{import_json, ResolverConfig};
//!
//! let json = r#"{
//!     "regions": [{ "id": "sp-1" }],
//!     "faces": [{
//!         "id": "roof",
//!         "vertices": [[0,0,3],[1,0,3],[1,1,3],[0,1,3]],
//!         "adjacent_regions": [{ "region_id": "sp-1" }]
//!     }]
//! }"#;
//! let report = import_json(json, &ResolverConfig::default()).unwrap();
//! assert_eq!(report.model.surface_count(), 1);
//! assert!(report.diagnostics.is_empty());
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hints;
pub mod ids;
pub mod records;
pub mod resolver;

pub use config::{ResolverConfig, SelfAdjacentPolicy};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use hints::{parse_opening_type, parse_type_hint, TypeHint};
pub use ids::{Handle, IdTable};
pub use records::{
    AdjacentRegionRef, ConstructionRecord, FaceRecord, ImportDocument, MaterialRecord,
    OpeningRecord, RegionRecord, ScheduleRecord, WindowTypeRecord, ZoneRecord,
};
pub use resolver::{import, import_json, ImportReport, ImportStats};
