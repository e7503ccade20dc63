// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import of small hand-written documents.

use approx::assert_relative_eq;
use bem_lite_geometry::{loop_area, BoundaryCondition, SubSurfaceType, SurfaceType};
use bem_lite_model::{HasAdjacency, HasPlane, HasSubSurfaces, Model, SurfaceKey};
use bem_lite_processing::{
    import, import_json, Error, ImportDocument, ImportReport, ResolverConfig, SelfAdjacentPolicy,
};
use serde_json::{json, Value};

/// Materials, constructions, a window type and three regions: `sp-1` at
/// the origin, `sp-2` stacked on top of it and `sp-3` east of it, turned
/// a quarter turn.
fn library() -> Value {
    json!({
        "materials": [
            { "id": "m-brick", "name": "Brick" },
            { "id": "m-gyp", "name": "Gypsum" },
            { "id": "m-glass", "name": "Glass" }
        ],
        "constructions": [
            { "id": "c-ext", "name": "Exterior Wall", "layers": ["m-brick", "m-gyp"] },
            { "id": "c-int", "name": "Interior Floor", "layers": ["m-gyp"] },
            { "id": "c-glz", "name": "Glazing", "layers": ["m-glass"] }
        ],
        "window_types": [
            { "id": "wt-1", "construction_ref": "c-glz" }
        ],
        "schedules": [ { "id": "s-1", "name": "Office Occupancy" } ],
        "zones": [ { "id": "z-1", "name": "Core" } ],
        "regions": [
            { "id": "sp-1", "name": "Office", "zone_ref": "z-1", "schedule_ref": "s-1" },
            { "id": "sp-2", "name": "Upper", "origin": [0, 0, 3] },
            { "id": "sp-3", "name": "Annex", "origin": [10, 0, 0], "rotation_deg": 90 }
        ]
    })
}

fn run(faces: Value, config: &ResolverConfig) -> ImportReport {
    let mut doc = library();
    doc["faces"] = faces;
    import(&ImportDocument::from_json(&doc.to_string()).unwrap(), config)
}

fn construction_name(model: &Model, surface: SurfaceKey) -> Option<String> {
    let key = model.surface(surface)?.construction()?;
    Some(model.construction(key)?.name.clone())
}

/// 10 x 10 ceiling at z = 3, counter-clockwise seen from above.
fn ceiling() -> Value {
    json!([[0, 0, 3], [10, 0, 3], [10, 10, 3], [0, 10, 3]])
}

#[test]
fn test_self_adjacent_face_is_discarded() {
    let faces = json!([{
        "id": "f-self",
        "vertices": ceiling(),
        "adjacent_regions": [
            { "spaceIdRef": "sp-1", "surfaceType": "Ceiling" },
            { "spaceIdRef": "sp-1", "surfaceType": "InteriorFloor" }
        ]
    }]);
    let report = run(faces, &ResolverConfig::default());

    assert_eq!(report.model.surface_count(), 0);
    assert_eq!(report.stats.faces_discarded, 1);
    let found: Vec<_> = report.diagnostics.for_record("f-self").collect();
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("Office"));
}

#[test]
fn test_self_adjacent_face_can_become_adiabatic() {
    let faces = json!([{
        "id": "f-self",
        "vertices": ceiling(),
        "adjacent_regions": [{ "region_id": "sp-1" }, { "region_id": "sp-1" }]
    }]);
    let config = ResolverConfig {
        self_adjacent: SelfAdjacentPolicy::Adiabatic,
        ..ResolverConfig::default()
    };
    let report = run(faces, &config);

    assert_eq!(report.model.surface_count(), 1);
    assert_eq!(report.stats.faces_translated, 1);
    let key = report.model.surface_by_name("f-self").unwrap();
    let surface = report.model.surface(key).unwrap();
    assert_eq!(surface.boundary_condition(), BoundaryCondition::Adiabatic);
    assert!(!surface.sun_exposed());
    assert_eq!(report.diagnostics.warnings().count(), 1);
}

#[test]
fn test_consistent_declarations_keep_first_region() {
    let faces = json!([{
        "id": "f-1",
        "construction_ref": "c-int",
        "vertices": ceiling(),
        "adjacent_regions": [
            { "region_id": "sp-1", "declared_sub_type": "Ceiling" },
            { "region_id": "sp-2", "declared_sub_type": "InteriorFloor" }
        ]
    }]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.stats.adjacent_pairs, 1);
    assert_eq!(report.stats.faces_swapped, 0);

    let original = model.surface_by_name("f-1").unwrap();
    let mirror = model.surface_by_name("f-1 Reversed").unwrap();
    assert_eq!(
        model.surface(original).unwrap().region(),
        model.region_by_name("Office").unwrap()
    );
    assert_eq!(model.surface(original).unwrap().surface_type(), SurfaceType::RoofCeiling);
    assert_eq!(model.surface(mirror).unwrap().surface_type(), SurfaceType::Floor);
    assert_eq!(construction_name(model, original).as_deref(), Some("Interior Floor"));
    assert_eq!(construction_name(model, mirror).as_deref(), Some("Interior Floor"));

    // The upper region sees its floor at local z = 0
    let floor = model.surface(mirror).unwrap();
    assert!(floor.vertices().iter().all(|p| p.z.abs() < 1e-9));
    assert_eq!(floor.adjacent(), Some(original));
    model.check_invariants();
}

#[test]
fn test_reversed_winding_swaps_regions() {
    let faces = json!([{
        "id": "f-1",
        "construction_ref": "c-int",
        "vertices": ceiling(),
        "adjacent_regions": [
            { "region_id": "sp-2", "declared_sub_type": "InteriorFloor" },
            { "region_id": "sp-1", "declared_sub_type": "Ceiling" }
        ]
    }]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;

    assert_eq!(report.stats.faces_swapped, 1);
    assert_eq!(report.diagnostics.for_record("f-1").count(), 1);

    let original = model.surface_by_name("f-1").unwrap();
    let mirror = model.surface_by_name("f-1 Reversed").unwrap();
    assert_eq!(
        model.surface(original).unwrap().region(),
        model.region_by_name("Office").unwrap()
    );
    assert_eq!(
        model.surface(mirror).unwrap().region(),
        model.region_by_name("Upper").unwrap()
    );
    // Construction goes on the created side only
    assert_eq!(construction_name(model, original), None);
    assert_eq!(construction_name(model, mirror).as_deref(), Some("Interior Floor"));
    assert_eq!(
        model.surface(mirror).unwrap().boundary_condition(),
        BoundaryCondition::Surface
    );
    model.check_invariants();
}

#[test]
fn test_contradicting_declarations_trust_geometry() {
    let faces = json!([{
        "id": "f-1",
        "vertices": ceiling(),
        "adjacent_regions": [
            { "region_id": "sp-1", "declared_sub_type": "InteriorWall" },
            { "region_id": "sp-2", "declared_sub_type": "InteriorWall" }
        ]
    }]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;

    assert_eq!(report.stats.faces_swapped, 0);
    assert!(report.diagnostics.entries()[0].message.contains("do not match vertices"));
    let original = model.surface_by_name("f-1").unwrap();
    assert_eq!(model.surface(original).unwrap().surface_type(), SurfaceType::RoofCeiling);
    assert_eq!(
        model.surface(original).unwrap().region(),
        model.region_by_name("Office").unwrap()
    );
}

#[test]
fn test_openings_are_attached_and_mirrored() {
    let faces = json!([{
        "id": "f-wall",
        "type_hint": "InteriorWall",
        "construction_ref": "c-ext",
        "vertices": [[0, 0, 0], [10, 0, 0], [10, 0, 3], [0, 0, 3]],
        "adjacent_regions": [{ "region_id": "sp-1" }, { "region_id": "sp-3" }],
        "openings": [
            {
                "id": "w-1",
                "opening_type": "FixedWindow",
                "window_type_ref": "wt-1",
                "vertices": [[1, 0, 1], [3, 0, 1], [3, 0, 2], [1, 0, 2]]
            },
            {
                "id": "d-1",
                "opening_type": "NonSlidingDoor",
                "vertices": [[5, 0, 2], [6, 0, 2], [6, 0, 0], [5, 0, 0]]
            },
            {
                "id": "w-out",
                "opening_type": "FixedWindow",
                "vertices": [[12, 0, 1], [13, 0, 1], [13, 0, 2], [12, 0, 2]]
            },
            {
                "id": "p-1",
                "opening_type": "Porthole",
                "vertices": [[7, 0, 1], [8, 0, 1], [8, 0, 2], [7, 0, 2]]
            }
        ]
    }]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;

    assert_eq!(report.stats.openings_attached, 2);
    assert_eq!(report.stats.openings_skipped, 2);
    assert_eq!(report.diagnostics.for_record("d-1").count(), 1);
    assert_eq!(report.diagnostics.for_record("w-out").count(), 1);
    assert_eq!(report.diagnostics.for_record("p-1").count(), 1);

    let wall = model.surface_by_name("f-wall").unwrap();
    let mirror = model.surface_by_name("f-wall Reversed").unwrap();
    let subs = model.surface(wall).unwrap().sub_surfaces().to_vec();
    assert_eq!(subs.len(), 2);
    assert_eq!(model.surface(mirror).unwrap().sub_surfaces().len(), 2);
    assert_eq!(model.sub_surface_count(), 4);

    let window = model.sub_surface(subs[0]).unwrap();
    assert_eq!(window.sub_type(), SubSurfaceType::FixedWindow);
    let glazing = window.construction().and_then(|c| model.construction(c)).unwrap();
    assert_eq!(glazing.name, "Glazing");
    assert!(window.is_paired());

    let door = model.sub_surface(subs[1]).unwrap();
    assert_eq!(door.sub_type(), SubSurfaceType::Door);
    assert_relative_eq!(
        loop_area(&model.sub_surface_world_vertices(subs[1]).unwrap()),
        2.0,
        epsilon = 1e-9
    );
    model.check_invariants();
}

#[test]
fn test_single_region_boundaries() {
    let faces = json!([
        {
            "id": "slab",
            "type_hint": "SlabOnGrade",
            "vertices": [[0, 0, 0], [0, 10, 0], [10, 10, 0], [10, 0, 0]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "basement-wall",
            "type_hint": "UndergroundWall",
            "exposed": true,
            "vertices": [[0, 10, 0], [0, 0, 0], [0, 0, 3], [0, 10, 3]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "mislabelled",
            "type_hint": "Roof",
            "exposed": false,
            "vertices": [[0, 0, 0], [0, 10, 0], [10, 10, 0], [10, 0, 0]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "facade",
            "type_hint": "ExteriorWall",
            "vertices": [[0, 0, 0], [10, 0, 0], [10, 0, 3], [0, 0, 3]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        }
    ]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;
    let surface = |name: &str| model.surface(model.surface_by_name(name).unwrap()).unwrap();

    assert_eq!(surface("slab").surface_type(), SurfaceType::Floor);
    assert_eq!(surface("slab").boundary_condition(), BoundaryCondition::Ground);

    assert_eq!(surface("basement-wall").surface_type(), SurfaceType::Wall);
    assert_eq!(surface("basement-wall").boundary_condition(), BoundaryCondition::Ground);

    // Declared roof, vertices say floor
    assert_eq!(surface("mislabelled").surface_type(), SurfaceType::Floor);
    assert_eq!(surface("mislabelled").boundary_condition(), BoundaryCondition::Ground);
    assert_eq!(report.diagnostics.for_record("mislabelled").count(), 1);

    assert_eq!(surface("facade").boundary_condition(), BoundaryCondition::Outdoors);
    assert!(surface("facade").sun_exposed());
    assert_eq!(report.stats.faces_translated, 4);
}

#[test]
fn test_missing_references_warn_and_continue() {
    let faces = json!([
        {
            "id": "f-lost",
            "vertices": ceiling(),
            "adjacent_regions": [{ "region_id": "sp-9" }]
        },
        {
            "id": "f-bare",
            "construction_ref": "c-nope",
            "vertices": ceiling(),
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "f-short",
            "vertices": [[0, 0, 0], [1, 0, 0]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "f-line",
            "vertices": [[0, 0, 0], [1, 0, 0], [2, 0, 0]],
            "adjacent_regions": [{ "region_id": "sp-1" }]
        }
    ]);
    let mut doc = library();
    doc["regions"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "sp-1", "name": "Shadow" }));
    doc["faces"] = faces;
    let report = import(
        &ImportDocument::from_json(&doc.to_string()).unwrap(),
        &ResolverConfig::default(),
    );
    let model = &report.model;

    assert_eq!(model.region_count(), 3);
    assert_eq!(report.diagnostics.for_record("sp-1").count(), 1);

    assert!(model.surface_by_name("f-lost").is_none());
    assert!(report
        .diagnostics
        .for_record("f-lost")
        .any(|d| d.message.contains("never declared")));

    let bare = model.surface_by_name("f-bare").unwrap();
    assert_eq!(model.surface(bare).unwrap().construction(), None);
    assert_eq!(report.diagnostics.for_record("f-bare").count(), 1);

    assert_eq!(report.diagnostics.for_record("f-short").count(), 1);
    assert_eq!(report.diagnostics.for_record("f-line").count(), 1);
    assert_eq!(report.stats.faces_total, 4);
    assert_eq!(report.stats.faces_translated, 1);
    assert_eq!(report.stats.faces_discarded, 3);

    let office = model.region(model.region_by_name("Office").unwrap()).unwrap();
    assert_eq!(office.zone.as_deref(), Some("Core"));
    assert_eq!(office.schedule.as_deref(), Some("Office Occupancy"));
}

#[test]
fn test_separately_declared_faces_are_matched() {
    let faces = json!([
        {
            "id": "ceiling",
            "vertices": ceiling(),
            "adjacent_regions": [{ "region_id": "sp-1" }]
        },
        {
            "id": "floor",
            "vertices": [[0, 0, 3], [0, 10, 3], [10, 10, 3], [10, 0, 3]],
            "adjacent_regions": [{ "region_id": "sp-2" }]
        }
    ]);

    let report = run(faces.clone(), &ResolverConfig::default());
    assert_eq!(report.stats.matched_pairs, 0);

    let config = ResolverConfig {
        match_after_import: true,
        ..ResolverConfig::default()
    };
    let report = run(faces, &config);
    let model = &report.model;
    assert_eq!(report.stats.matched_pairs, 1);

    let ceiling = model.surface_by_name("ceiling").unwrap();
    let floor = model.surface_by_name("floor").unwrap();
    assert_eq!(model.surface(ceiling).unwrap().adjacent(), Some(floor));
    assert_eq!(
        model.surface(floor).unwrap().boundary_condition(),
        BoundaryCondition::Surface
    );
    model.check_invariants();
}

#[test]
fn test_rotated_region_keeps_world_geometry() {
    let vertices = [[10.0, 0.0, 0.0], [10.0, 4.0, 0.0], [10.0, 4.0, 3.0], [10.0, 0.0, 3.0]];
    let faces = json!([{
        "id": "party-wall",
        "vertices": vertices,
        "adjacent_regions": [{ "region_id": "sp-3" }, { "region_id": "sp-1" }]
    }]);
    let report = run(faces, &ResolverConfig::default());
    let model = &report.model;

    let wall = model.surface_by_name("party-wall").unwrap();
    let world = model.world_vertices(wall).unwrap();
    for (p, v) in world.iter().zip(&vertices) {
        assert_relative_eq!(p.x, v[0], epsilon = 1e-9);
        assert_relative_eq!(p.y, v[1], epsilon = 1e-9);
        assert_relative_eq!(p.z, v[2], epsilon = 1e-9);
    }

    let mirror = model.surface_by_name("party-wall Reversed").unwrap();
    let plane = model.world_plane(wall).unwrap();
    let mirror_plane = model.world_plane(mirror).unwrap();
    assert!(plane.reverse_equal(&mirror_plane, model.config().length_tolerance));
    model.check_invariants();
}

#[test]
fn test_bad_json_is_a_document_error() {
    let err = import_json("{ \"faces\": 7 }", &ResolverConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Document(_)));
}
