// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared type vocabularies of the source formats.

use bem_lite_geometry::{SubSurfaceType, SurfaceType};

/// A declared surface type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHint {
    /// `None` for hints that carry no surface type (shades, air walls).
    pub surface_type: Option<SurfaceType>,
    /// The face is in contact with the ground.
    pub ground: bool,
}

impl TypeHint {
    const fn new(surface_type: SurfaceType, ground: bool) -> Self {
        Self {
            surface_type: Some(surface_type),
            ground,
        }
    }
}

/// Parses a surface type hint. Returns `None` for unknown hints.
pub fn parse_type_hint(hint: &str) -> Option<TypeHint> {
    use SurfaceType::*;

    let hint = match hint.trim() {
        "ExteriorWall" | "InteriorWall" => TypeHint::new(Wall, false),
        "UndergroundWall" => TypeHint::new(Wall, true),
        "Roof" | "Ceiling" => TypeHint::new(RoofCeiling, false),
        "UndergroundCeiling" => TypeHint::new(RoofCeiling, true),
        "InteriorFloor" | "RaisedFloor" | "ExposedFloor" => TypeHint::new(Floor, false),
        "SlabOnGrade" | "UndergroundSlab" => TypeHint::new(Floor, true),
        "Shade" | "Air" => TypeHint {
            surface_type: None,
            ground: false,
        },
        other => TypeHint::new(other.parse().ok()?, false),
    };
    Some(hint)
}

/// Maps a declared opening type to a sub-surface type.
pub fn parse_opening_type(opening_type: &str) -> Option<SubSurfaceType> {
    let sub_type = match opening_type.trim() {
        "FixedWindow" => SubSurfaceType::FixedWindow,
        "OperableWindow" | "SlidingWindow" => SubSurfaceType::OperableWindow,
        "Door" | "NonSlidingDoor" | "Air" => SubSurfaceType::Door,
        "SlidingDoor" => SubSurfaceType::GlassDoor,
        "FixedSkylight" | "OperableSkylight" | "Skylight" => SubSurfaceType::Skylight,
        other => other.parse().ok()?,
    };
    Some(sub_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_hints() {
        let slab = parse_type_hint("SlabOnGrade").unwrap();
        assert_eq!(slab.surface_type, Some(SurfaceType::Floor));
        assert!(slab.ground);

        let wall = parse_type_hint("ExteriorWall").unwrap();
        assert_eq!(wall.surface_type, Some(SurfaceType::Wall));
        assert!(!wall.ground);

        assert!(parse_type_hint("UndergroundWall").unwrap().ground);
    }

    #[test]
    fn plain_tags_and_unknowns() {
        assert_eq!(
            parse_type_hint("RoofCeiling").unwrap().surface_type,
            Some(SurfaceType::RoofCeiling)
        );
        assert_eq!(parse_type_hint("Shade").unwrap().surface_type, None);
        assert_eq!(parse_type_hint("Trampoline"), None);
    }

    #[test]
    fn opening_types() {
        assert_eq!(parse_opening_type("SlidingDoor"), Some(SubSurfaceType::GlassDoor));
        assert_eq!(parse_opening_type("OverheadDoor"), Some(SubSurfaceType::OverheadDoor));
        assert_eq!(parse_opening_type("SlidingWindow"), Some(SubSurfaceType::OperableWindow));
        assert_eq!(parse_opening_type("Porthole"), None);
    }
}
