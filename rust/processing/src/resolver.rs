// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import-time surface resolver.
//!
//! Walks the document sections in dependency order, then turns each face
//! record into a surface. A face touching one region becomes a plain
//! surface; a face touching two regions becomes a surface in one of them
//! plus its paired mirror in the other. Which region hosts the face as
//! given is decided from the declared per-region surface types compared
//! with the type derived from the vertex winding.
//!
//! Data-quality problems are recorded as diagnostics and the face is
//! skipped; nothing aborts the import.

use bem_lite_geometry::{
    classify_loop, default_boundary_condition, BoundaryCondition, Isometry3, Neighbor, Plane,
    Point3, SurfaceType, Translation3, UnitQuaternion, Vector3,
};
use bem_lite_model::{ConstructionKey, Error as ModelError, Model, RegionKey, SurfaceKey};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ResolverConfig, SelfAdjacentPolicy};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::hints::{parse_opening_type, parse_type_hint, TypeHint};
use crate::ids::{Handle, IdTable};
use crate::records::*;

/// Counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub faces_total: usize,
    pub faces_translated: usize,
    pub faces_discarded: usize,
    /// Faces moved to their second-listed region.
    pub faces_swapped: usize,
    /// Mirrors created for two-region faces.
    pub adjacent_pairs: usize,
    pub openings_attached: usize,
    pub openings_skipped: usize,
    /// Pairs found by the optional post-import matching pass.
    pub matched_pairs: usize,
}

/// Result of an import.
#[derive(Debug)]
pub struct ImportReport {
    pub model: Model,
    pub diagnostics: Diagnostics,
    pub stats: ImportStats,
}

/// Builds a model from an import document.
pub fn import(doc: &ImportDocument, config: &ResolverConfig) -> ImportReport {
    Resolver::new(config).run(doc)
}

/// Decodes a JSON import document and builds a model from it.
pub fn import_json(json: &str, config: &ResolverConfig) -> Result<ImportReport> {
    let doc = ImportDocument::from_json(json)?;
    Ok(import(&doc, config))
}

/// Region that hosts a two-region face with its vertices as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    First,
    Swapped,
}

struct Resolver<'a> {
    config: &'a ResolverConfig,
    model: Model,
    ids: IdTable,
    diagnostics: Diagnostics,
    stats: ImportStats,
}

impl<'a> Resolver<'a> {
    fn new(config: &'a ResolverConfig) -> Self {
        Self {
            config,
            model: Model::with_config(config.geometry),
            ids: IdTable::new(),
            diagnostics: Diagnostics::new(),
            stats: ImportStats::default(),
        }
    }

    fn run(mut self, doc: &ImportDocument) -> ImportReport {
        info!(
            regions = doc.regions.len(),
            faces = doc.faces.len(),
            "starting import"
        );

        self.declare_materials(&doc.materials);
        self.declare_constructions(&doc.constructions);
        self.declare_window_types(&doc.window_types);
        self.declare_schedules(&doc.schedules);
        self.declare_zones(&doc.zones);
        self.declare_regions(&doc.regions);

        for face in &doc.faces {
            self.face(face);
        }

        if self.config.match_after_import {
            self.match_regions();
        }

        info!(
            translated = self.stats.faces_translated,
            discarded = self.stats.faces_discarded,
            swapped = self.stats.faces_swapped,
            pairs = self.stats.adjacent_pairs,
            diagnostics = self.diagnostics.len(),
            "import complete"
        );

        ImportReport {
            model: self.model,
            diagnostics: self.diagnostics,
            stats: self.stats,
        }
    }

    // --- Declarations ---

    fn declare_materials(&mut self, materials: &[MaterialRecord]) {
        for m in materials {
            let name = m.name.clone().unwrap_or_else(|| m.id.clone());
            self.ids
                .declare(&m.id, Handle::Material(name), &mut self.diagnostics);
        }
    }

    fn declare_constructions(&mut self, constructions: &[ConstructionRecord]) {
        for c in constructions {
            if !self.ids.check_unique(&c.id, &mut self.diagnostics) {
                continue;
            }
            let layers = c
                .layers
                .iter()
                .filter_map(|m| self.ids.material(m, Some(&c.id), &mut self.diagnostics))
                .collect();
            let name = c.name.clone().unwrap_or_else(|| c.id.clone());
            let key = self.model.add_construction(name, layers);
            self.ids
                .declare(&c.id, Handle::Construction(key), &mut self.diagnostics);
        }
    }

    fn declare_window_types(&mut self, window_types: &[WindowTypeRecord]) {
        for w in window_types {
            if !self.ids.check_unique(&w.id, &mut self.diagnostics) {
                continue;
            }
            let construction = w
                .construction_ref
                .as_deref()
                .and_then(|c| self.ids.construction(c, Some(&w.id), &mut self.diagnostics));
            self.ids
                .declare(&w.id, Handle::WindowType(construction), &mut self.diagnostics);
        }
    }

    fn declare_schedules(&mut self, schedules: &[ScheduleRecord]) {
        for s in schedules {
            let name = s.name.clone().unwrap_or_else(|| s.id.clone());
            self.ids
                .declare(&s.id, Handle::Schedule(name), &mut self.diagnostics);
        }
    }

    fn declare_zones(&mut self, zones: &[ZoneRecord]) {
        for z in zones {
            let name = z.name.clone().unwrap_or_else(|| z.id.clone());
            self.ids.declare(&z.id, Handle::Zone(name), &mut self.diagnostics);
        }
    }

    fn declare_regions(&mut self, regions: &[RegionRecord]) {
        for r in regions {
            if !self.ids.check_unique(&r.id, &mut self.diagnostics) {
                continue;
            }
            let [x, y, z] = r.origin;
            let transform = Isometry3::from_parts(
                Translation3::new(x, y, z),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), r.rotation_deg.to_radians()),
            );
            let name = r.name.clone().unwrap_or_else(|| r.id.clone());
            let key = self.model.add_region_with_transform(name, transform);

            let zone = r
                .zone_ref
                .as_deref()
                .and_then(|z| self.ids.zone(z, Some(&r.id), &mut self.diagnostics));
            let schedule = r
                .schedule_ref
                .as_deref()
                .and_then(|s| self.ids.schedule(s, Some(&r.id), &mut self.diagnostics));
            if let Some(region) = self.model.region_mut(key) {
                region.zone = zone;
                region.schedule = schedule;
            }

            self.ids
                .declare(&r.id, Handle::Region(key), &mut self.diagnostics);
        }
    }

    // --- Faces ---

    fn face(&mut self, face: &FaceRecord) {
        self.stats.faces_total += 1;
        match self.translate_face(face) {
            Ok(true) => self.stats.faces_translated += 1,
            Ok(false) => self.stats.faces_discarded += 1,
            Err(e) => {
                self.diagnostics
                    .error(Some(&face.id), format!("face not translated: {e}"));
                self.stats.faces_discarded += 1;
            }
        }
    }

    /// Returns `Ok(false)` when the face was discarded with a diagnostic.
    fn translate_face(&mut self, face: &FaceRecord) -> Result<bool> {
        let id = face.id.as_str();
        let refs = &face.adjacent_regions;

        match refs.len() {
            0 => {
                self.diagnostics
                    .warn(Some(id), "face touches no region, not translated");
                return Ok(false);
            }
            1 | 2 => {}
            n => {
                self.diagnostics.error(
                    Some(id),
                    format!("face lists {n} adjacent regions, at most 2 are allowed"),
                );
                return Ok(false);
            }
        }

        if face.vertices.len() < 3 {
            self.diagnostics.error(
                Some(id),
                format!("face has {} vertices, at least 3 are required", face.vertices.len()),
            );
            return Ok(false);
        }
        let world = to_points(&face.vertices);
        let geometry_type = classify_loop(&world, &self.config.geometry)?;

        let mut regions = Vec::with_capacity(refs.len());
        for r in refs {
            match self.ids.region(&r.region_id, Some(id), &mut self.diagnostics) {
                Some(key) => regions.push(key),
                None => {
                    self.diagnostics
                        .warn(Some(id), "face has no usable region, not translated");
                    return Ok(false);
                }
            }
        }

        let first = regions[0];
        match regions.get(1).copied() {
            None => {
                self.single_region_face(face, &world, first, geometry_type)?;
                Ok(true)
            }
            Some(second) if second == first => {
                self.self_adjacent_face(face, &world, first, geometry_type)
            }
            Some(second) => {
                self.two_region_face(face, &world, [first, second], geometry_type)?;
                Ok(true)
            }
        }
    }

    fn single_region_face(
        &mut self,
        face: &FaceRecord,
        world: &[Point3<f64>],
        region: RegionKey,
        geometry_type: SurfaceType,
    ) -> Result<()> {
        let hint = self.type_hint(face);
        if let Some(declared) = hint.and_then(|h| h.surface_type) {
            if declared != geometry_type {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!(
                        "declared type {declared} does not match vertices, using {geometry_type}"
                    ),
                );
            }
        }

        let key = self.model.add_surface_world(region, face_name(face), world)?;
        if hint.is_some_and(|h| h.ground) {
            self.model
                .set_boundary_condition(key, BoundaryCondition::Ground, false, false)?;
        } else {
            self.model.assign_default_boundary_condition(key, face.exposed)?;
        }

        let construction = self.face_construction(face);
        self.model.set_construction(key, construction)?;
        self.attach_openings(face, key)?;

        debug!(face = %face.id, surface_type = %geometry_type, "translated single-region face");
        Ok(())
    }

    fn self_adjacent_face(
        &mut self,
        face: &FaceRecord,
        world: &[Point3<f64>],
        region: RegionKey,
        geometry_type: SurfaceType,
    ) -> Result<bool> {
        let region_name = self
            .model
            .region(region)
            .map(|r| r.name.clone())
            .unwrap_or_default();

        match self.config.self_adjacent {
            SelfAdjacentPolicy::Discard => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!("both adjacency records name region '{region_name}', not translated"),
                );
                Ok(false)
            }
            SelfAdjacentPolicy::Adiabatic => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!(
                        "both adjacency records name region '{region_name}', \
                         created once with an adiabatic boundary"
                    ),
                );
                let key = self.model.add_surface_world(region, face_name(face), world)?;
                let boundary =
                    default_boundary_condition(geometry_type, face.exposed, Neighbor::SameRegion);
                self.model.set_boundary_condition(
                    key,
                    boundary.condition,
                    boundary.sun_exposed,
                    boundary.wind_exposed,
                )?;
                let construction = self.face_construction(face);
                self.model.set_construction(key, construction)?;
                self.attach_openings(face, key)?;
                Ok(true)
            }
        }
    }

    fn two_region_face(
        &mut self,
        face: &FaceRecord,
        world: &[Point3<f64>],
        [first, second]: [RegionKey; 2],
        geometry_type: SurfaceType,
    ) -> Result<()> {
        let placement = self.placement(face, geometry_type);
        let (host, other) = match placement {
            Placement::First => (first, second),
            Placement::Swapped => (second, first),
        };

        let construction = self.face_construction(face);
        let key = self.model.add_surface_world(host, face_name(face), world)?;
        if placement == Placement::First {
            self.model.set_construction(key, construction)?;
        }
        // Openings go on first so the mirror picks them up
        self.attach_openings(face, key)?;

        let mirror = match self.model.create_adjacent_surface(key, other) {
            Ok(mirror) => mirror,
            Err(e) => {
                self.model.remove_surface(key)?;
                return Err(e.into());
            }
        };
        if let Some(mirror) = mirror {
            if placement == Placement::Swapped {
                self.model.set_construction(mirror, construction)?;
                self.stats.faces_swapped += 1;
            }
            self.stats.adjacent_pairs += 1;
        }

        debug!(face = %face.id, ?placement, surface_type = %geometry_type, "translated paired face");
        Ok(())
    }

    /// Decides which region hosts the face as given from the two declared
    /// per-region types.
    fn placement(&mut self, face: &FaceRecord, geometry_type: SurfaceType) -> Placement {
        let refs = &face.adjacent_regions;
        let first = self.declared_type(face, refs[0].declared_sub_type.as_deref());
        let second = self.declared_type(face, refs[1].declared_sub_type.as_deref());

        match (first, second) {
            (None, None) => Placement::First,
            (Some(_), None) | (None, Some(_)) => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!("only one adjacent surfaceType listed, using {geometry_type} from vertices"),
                );
                Placement::First
            }
            (Some(a), Some(_)) if a == geometry_type => Placement::First,
            (Some(a), Some(b)) if b == geometry_type => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!(
                        "declared types ({a} for '{}', {b} for '{}') show the vertices are wound \
                         for the second region, moving the surface there",
                        refs[0].region_id, refs[1].region_id
                    ),
                );
                Placement::Swapped
            }
            (Some(a), Some(b)) => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!(
                        "declared types {a} and {b} do not match vertices, using {geometry_type}"
                    ),
                );
                Placement::First
            }
        }
    }

    fn attach_openings(&mut self, face: &FaceRecord, host: SurfaceKey) -> Result<()> {
        if face.openings.is_empty() {
            return Ok(());
        }
        let host_plane = self.model.world_plane(host)?;
        let tol = self.config.geometry.length_tolerance;

        for (index, opening) in face.openings.iter().enumerate() {
            let name = opening
                .id
                .clone()
                .unwrap_or_else(|| format!("{} Opening {}", face_name(face), index + 1));
            let record = opening.id.as_deref().unwrap_or(&face.id);

            let Some(sub_type) = parse_opening_type(&opening.opening_type) else {
                self.diagnostics.warn(
                    Some(record),
                    format!("unknown opening type '{}', opening skipped", opening.opening_type),
                );
                self.stats.openings_skipped += 1;
                continue;
            };

            let mut world = to_points(&opening.vertices);
            match Plane::from_loop(&world) {
                Ok(plane) if plane.reverse_equal(&host_plane, tol) => {
                    self.diagnostics
                        .warn(Some(record), "opening is wound opposite to its host, reversed");
                    world.reverse();
                }
                Ok(_) => {}
                Err(e) => {
                    self.diagnostics
                        .warn(Some(record), format!("opening skipped: {e}"));
                    self.stats.openings_skipped += 1;
                    continue;
                }
            }

            let construction = opening
                .construction_ref
                .as_deref()
                .and_then(|c| self.ids.construction(c, Some(record), &mut self.diagnostics))
                .or_else(|| {
                    opening
                        .window_type_ref
                        .as_deref()
                        .and_then(|w| self.ids.window_type(w, Some(record), &mut self.diagnostics))
                });

            match self
                .model
                .attach_sub_surface_world(host, name, sub_type, &world, construction)
            {
                Ok(_) => self.stats.openings_attached += 1,
                Err(
                    e @ (ModelError::SubSurfaceOutsideParent(_)
                    | ModelError::TooFewVertices(_)
                    | ModelError::Geometry(_)),
                ) => {
                    self.diagnostics
                        .warn(Some(record), format!("opening skipped: {e}"));
                    self.stats.openings_skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn match_regions(&mut self) {
        let regions: Vec<RegionKey> = self.model.regions().map(|(k, _)| k).collect();
        for (i, &r1) in regions.iter().enumerate() {
            for &r2 in &regions[i + 1..] {
                match self.model.match_surfaces(r1, r2) {
                    Ok(n) => self.stats.matched_pairs += n,
                    Err(e) => self
                        .diagnostics
                        .error(None, format!("matching surfaces failed: {e}")),
                }
            }
        }
    }

    // --- Lookups ---

    fn face_construction(&mut self, face: &FaceRecord) -> Option<ConstructionKey> {
        face.construction_ref
            .as_deref()
            .and_then(|c| self.ids.construction(c, Some(&face.id), &mut self.diagnostics))
    }

    fn type_hint(&mut self, face: &FaceRecord) -> Option<TypeHint> {
        let raw = face.type_hint.as_deref()?;
        let hint = parse_type_hint(raw);
        if hint.is_none() {
            self.diagnostics.warn(
                Some(&face.id),
                format!("unknown surface type '{raw}', treated as undeclared"),
            );
        }
        hint
    }

    fn declared_type(&mut self, face: &FaceRecord, raw: Option<&str>) -> Option<SurfaceType> {
        let raw = raw?;
        match parse_type_hint(raw) {
            Some(hint) => hint.surface_type,
            None => {
                self.diagnostics.warn(
                    Some(&face.id),
                    format!("unknown adjacent surfaceType '{raw}', treated as undeclared"),
                );
                None
            }
        }
    }
}

fn face_name(face: &FaceRecord) -> String {
    face.name.clone().unwrap_or_else(|| face.id.clone())
}

fn to_points(vertices: &[[f64; 3]]) -> Vec<Point3<f64>> {
    vertices
        .iter()
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bem_lite_model::HasAdjacency;

    fn square_up(z: f64) -> Vec<[f64; 3]> {
        vec![[0.0, 0.0, z], [4.0, 0.0, z], [4.0, 4.0, z], [0.0, 4.0, z]]
    }

    fn region(id: &str) -> RegionRecord {
        RegionRecord {
            id: id.into(),
            name: None,
            zone_ref: None,
            schedule_ref: None,
            origin: [0.0; 3],
            rotation_deg: 0.0,
        }
    }

    fn face(id: &str, vertices: Vec<[f64; 3]>, refs: &[(&str, Option<&str>)]) -> FaceRecord {
        FaceRecord {
            id: id.into(),
            name: None,
            vertices,
            type_hint: None,
            exposed: None,
            construction_ref: None,
            adjacent_regions: refs
                .iter()
                .map(|(r, t)| AdjacentRegionRef {
                    region_id: (*r).into(),
                    declared_sub_type: t.map(Into::into),
                })
                .collect(),
            openings: Vec::new(),
        }
    }

    fn doc(faces: Vec<FaceRecord>) -> ImportDocument {
        ImportDocument {
            regions: vec![region("sp-1"), region("sp-2")],
            faces,
            ..Default::default()
        }
    }

    #[test]
    fn zero_and_three_refs_are_discarded() {
        let report = import(
            &doc(vec![
                face("f-0", square_up(3.0), &[]),
                face(
                    "f-3",
                    square_up(3.0),
                    &[("sp-1", None), ("sp-2", None), ("sp-1", None)],
                ),
            ]),
            &ResolverConfig::default(),
        );
        assert_eq!(report.model.surface_count(), 0);
        assert_eq!(report.stats.faces_discarded, 2);
        assert_eq!(report.diagnostics.warnings().count(), 1);
        assert_eq!(report.diagnostics.errors().count(), 1);
    }

    #[test]
    fn placement_follows_declared_types() {
        // Roof of sp-1 seen from above, ceiling/floor declarations per region
        let cases = [
            (None, None, Placement::First, 0),
            (Some("Ceiling"), None, Placement::First, 1),
            (Some("Roof"), Some("InteriorFloor"), Placement::First, 0),
            (Some("InteriorFloor"), Some("Ceiling"), Placement::Swapped, 1),
            (Some("ExteriorWall"), Some("InteriorWall"), Placement::First, 1),
        ];
        for (first, second, expected, warnings) in cases {
            let config = ResolverConfig::default();
            let mut resolver = Resolver::new(&config);
            let record = face("f-1", square_up(3.0), &[("sp-1", first), ("sp-2", second)]);
            assert_eq!(
                resolver.placement(&record, SurfaceType::RoofCeiling),
                expected,
                "{first:?} / {second:?}"
            );
            assert_eq!(resolver.diagnostics.len(), warnings, "{first:?} / {second:?}");
        }
    }

    #[test]
    fn paired_face_creates_mirror() {
        let report = import(
            &doc(vec![face(
                "f-1",
                square_up(3.0),
                &[("sp-1", Some("Ceiling")), ("sp-2", Some("InteriorFloor"))],
            )]),
            &ResolverConfig::default(),
        );
        let model = &report.model;
        assert_eq!(model.surface_count(), 2);
        assert_eq!(report.stats.adjacent_pairs, 1);
        assert!(report.diagnostics.is_empty());

        let original = model.surface_by_name("f-1").unwrap();
        let mirror = model.surface_by_name("f-1 Reversed").unwrap();
        let sp1 = model.region_by_name("sp-1").unwrap();
        assert_eq!(model.surface(original).unwrap().region(), sp1);
        assert_eq!(model.surface(original).unwrap().adjacent(), Some(mirror));
        assert_eq!(
            model.surface(mirror).unwrap().surface_type(),
            SurfaceType::Floor
        );
        model.check_invariants();
    }
}
