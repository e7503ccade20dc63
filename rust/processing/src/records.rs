// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat records handed over by a file-format loader.
//!
//! Sections are processed in declaration order: materials, constructions,
//! window types, schedules, zones, regions, then faces. All coordinates
//! are world coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Everything one import needs, already parsed from the source format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportDocument {
    pub materials: Vec<MaterialRecord>,
    pub constructions: Vec<ConstructionRecord>,
    pub window_types: Vec<WindowTypeRecord>,
    pub schedules: Vec<ScheduleRecord>,
    pub zones: Vec<ZoneRecord>,
    pub regions: Vec<RegionRecord>,
    pub faces: Vec<FaceRecord>,
}

impl ImportDocument {
    /// Decodes a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Document(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Document(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Material ids, outside to inside.
    #[serde(default)]
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTypeRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub construction_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zone_ref: Option<String>,
    #[serde(default)]
    pub schedule_ref: Option<String>,
    /// Origin of the region's local frame.
    #[serde(default)]
    pub origin: [f64; 3],
    /// Rotation of the local frame about the vertical axis, in degrees.
    #[serde(default)]
    pub rotation_deg: f64,
}

/// One physical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub vertices: Vec<[f64; 3]>,
    /// Declared surface type, e.g. `ExteriorWall` or `SlabOnGrade`.
    #[serde(default, alias = "surfaceType")]
    pub type_hint: Option<String>,
    /// Declared exposure to the elements; absent means undeclared.
    #[serde(default)]
    pub exposed: Option<bool>,
    #[serde(default)]
    pub construction_ref: Option<String>,
    /// Regions this face touches, first-listed first.
    #[serde(default)]
    pub adjacent_regions: Vec<AdjacentRegionRef>,
    #[serde(default)]
    pub openings: Vec<OpeningRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacentRegionRef {
    #[serde(alias = "spaceIdRef")]
    pub region_id: String,
    /// Surface type as seen from this region.
    #[serde(default, alias = "surfaceType")]
    pub declared_sub_type: Option<String>,
}

/// A window or door in a face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub vertices: Vec<[f64; 3]>,
    #[serde(alias = "openingType")]
    pub opening_type: String,
    #[serde(default)]
    pub construction_ref: Option<String>,
    #[serde(default)]
    pub window_type_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_document() {
        let json = r#"{
            "regions": [{ "id": "sp-1" }],
            "faces": [{
                "id": "f-1",
                "vertices": [[0,0,0],[1,0,0],[1,1,0]],
                "adjacent_regions": [{ "spaceIdRef": "sp-1", "surfaceType": "Roof" }]
            }]
        }"#;
        let doc = ImportDocument::from_json(json).unwrap();
        assert!(doc.materials.is_empty());
        assert_eq!(doc.regions[0].origin, [0.0; 3]);
        let face = &doc.faces[0];
        assert_eq!(face.exposed, None);
        assert_eq!(face.adjacent_regions[0].region_id, "sp-1");
        assert_eq!(face.adjacent_regions[0].declared_sub_type.as_deref(), Some("Roof"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ImportDocument::from_json(r#"{ "faces": [{ "id": 3 }] }"#).unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }
}
