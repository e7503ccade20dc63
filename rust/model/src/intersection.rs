// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface intersection and matching between regions.
//!
//! [`Model::intersect`] splits two facing surfaces so that the overlap is
//! represented by one surface on each side; [`Model::match_surfaces`] then
//! pairs surfaces whose footprints coincide.

use bem_lite_geometry::{
    footprints_coincide, intersect_loops, loop_area, LoopIntersection, Plane, Point3,
};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::keys::{RegionKey, SurfaceKey};
use crate::model::{to_local, validate_loop, SurfaceData};
use crate::traits::HasSubSurfaces;
use crate::Model;

/// Outcome of [`Model::intersect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntersectionResult {
    /// Planes are neither equal nor reverse-equal.
    NotCoplanar,
    /// Planes are equal; same-facing surfaces are never split.
    SameSenseOverlap,
    /// The surfaces are already each other's partner.
    AlreadyPaired,
    /// Facing planes, footprints touch at most along an edge.
    NoOverlap,
    /// Both surfaces now cover exactly the overlap. Leftover pieces are new
    /// surfaces in the respective region; empty when a surface was entirely
    /// inside the overlap.
    Split {
        result_a: SurfaceKey,
        leftovers_a: Vec<SurfaceKey>,
        result_b: SurfaceKey,
        leftovers_b: Vec<SurfaceKey>,
    },
}

impl Model {
    /// Intersects surface `a` with surface `b`, splitting both in place.
    ///
    /// Surfaces hosting sub-surfaces are refused, as are surfaces paired with
    /// a third surface. Leftovers copy the original's type, boundary
    /// condition and construction and are named `"<name> <n>"`.
    pub fn intersect(&mut self, a: SurfaceKey, b: SurfaceKey) -> Result<IntersectionResult> {
        let sa = self.surface_ref(a)?;
        let sb = self.surface_ref(b)?;

        if sa.adjacent == Some(b) && sb.adjacent == Some(a) {
            return Ok(IntersectionResult::AlreadyPaired);
        }
        for (key, surface) in [(a, sa), (b, sb)] {
            if surface.has_sub_surfaces() {
                return Err(Error::HasSubSurfaces(key));
            }
            if surface.adjacent.is_some() {
                return Err(Error::PairedElsewhere(key));
            }
        }

        let world_a = self.world_vertices(a)?;
        let world_b = self.world_vertices(b)?;

        let split = match intersect_loops(&world_a, &world_b, &self.config)? {
            LoopIntersection::NotCoplanar => return Ok(IntersectionResult::NotCoplanar),
            LoopIntersection::SameSense => return Ok(IntersectionResult::SameSenseOverlap),
            LoopIntersection::NoOverlap => return Ok(IntersectionResult::NoOverlap),
            LoopIntersection::Split(split) => split,
        };

        let leftovers_a = self.apply_split(a, &world_a, split.overlap_a, split.leftovers_a)?;
        let leftovers_b = self.apply_split(b, &world_b, split.overlap_b, split.leftovers_b)?;

        debug!(
            ?a,
            ?b,
            leftovers_a = leftovers_a.len(),
            leftovers_b = leftovers_b.len(),
            "split surfaces"
        );

        Ok(IntersectionResult::Split {
            result_a: a,
            leftovers_a,
            result_b: b,
            leftovers_b,
        })
    }

    /// Replaces `key`'s loop by `overlap` and creates one sibling per leftover.
    fn apply_split(
        &mut self,
        key: SurfaceKey,
        original: &[Point3<f64>],
        overlap: Vec<Point3<f64>>,
        leftovers: Vec<Vec<Point3<f64>>>,
    ) -> Result<Vec<SurfaceKey>> {
        let original_area = loop_area(original);
        let area_tol = self.config.area_tolerance(original_area);
        if leftovers.is_empty() && (loop_area(&overlap) - original_area).abs() <= area_tol {
            // Entirely inside the overlap: keep the original vertices
            return Ok(Vec::new());
        }

        let region = self.surface_ref(key)?.region;
        let transform = *self.region_ref(region)?.transform();
        self.set_vertices(key, to_local(&transform, &overlap))?;

        let template = self.surface_ref(key)?.clone();
        let mut created = Vec::with_capacity(leftovers.len());
        for piece in leftovers {
            let vertices = to_local(&transform, &piece);
            let plane = validate_loop(&vertices)?;
            let name = self.next_split_name(&template.name);
            let leftover = self.surfaces.insert(SurfaceData {
                name,
                region,
                vertices,
                plane,
                surface_type: template.surface_type,
                boundary: template.boundary,
                construction: template.construction,
                adjacent: None,
                sub_surfaces: Vec::new(),
            });
            if let Some(r) = self.regions.get_mut(region) {
                r.surfaces.push(leftover);
            }
            created.push(leftover);
        }
        Ok(created)
    }

    /// Intersects every surface of `r1` with every surface of `r2` until no
    /// further split happens. Returns the number of splits performed.
    ///
    /// Surfaces that are paired, host sub-surfaces, or already coincide
    /// with their counterpart are skipped.
    pub fn intersect_regions(&mut self, r1: RegionKey, r2: RegionKey) -> Result<usize> {
        let mut splits = 0;
        while let Some((a, b)) = self.next_split_candidate(r1, r2)? {
            if let IntersectionResult::Split { .. } = self.intersect(a, b)? {
                splits += 1;
            }
        }
        info!(?r1, ?r2, splits, "intersected regions");
        Ok(splits)
    }

    /// First pair of surfaces whose intersection would change something.
    fn next_split_candidate(
        &self,
        r1: RegionKey,
        r2: RegionKey,
    ) -> Result<Option<(SurfaceKey, SurfaceKey)>> {
        let tol = self.config.length_tolerance;
        for &a in self.region_ref(r1)?.surfaces() {
            let sa = self.surface_ref(a)?;
            if sa.adjacent.is_some() || sa.has_sub_surfaces() {
                continue;
            }
            let world_a = self.world_vertices(a)?;
            let plane_a = Plane::from_loop(&world_a)?;

            for &b in self.region_ref(r2)?.surfaces() {
                let sb = self.surface_ref(b)?;
                if a == b || sb.adjacent.is_some() || sb.has_sub_surfaces() {
                    continue;
                }
                let world_b = self.world_vertices(b)?;
                if !plane_a.reverse_equal(&Plane::from_loop(&world_b)?, tol) {
                    continue;
                }
                let split = match intersect_loops(&world_a, &world_b, &self.config)? {
                    LoopIntersection::Split(split) => split,
                    _ => continue,
                };
                let area_tol = self
                    .config
                    .area_tolerance(loop_area(&world_a).max(loop_area(&world_b)));
                let shrinks = (loop_area(&split.overlap_a) - loop_area(&world_a)).abs() > area_tol
                    || (loop_area(&split.overlap_b) - loop_area(&world_b)).abs() > area_tol;
                if shrinks || !split.leftovers_a.is_empty() || !split.leftovers_b.is_empty() {
                    return Ok(Some((a, b)));
                }
            }
        }
        Ok(None)
    }

    /// Pairs each unpaired surface of `r1` with an unpaired surface of `r2`
    /// covering the same footprint from the other side. Sub-surfaces of
    /// newly paired hosts are matched the same way. Returns the number of
    /// surface pairs created.
    pub fn match_surfaces(&mut self, r1: RegionKey, r2: RegionKey) -> Result<usize> {
        let mut pairs = 0;
        let candidates_a = self.region_ref(r1)?.surfaces.clone();
        let candidates_b = self.region_ref(r2)?.surfaces.clone();

        for a in candidates_a {
            if self.surface_ref(a)?.adjacent.is_some() {
                continue;
            }
            let world_a = self.world_vertices(a)?;

            for &b in &candidates_b {
                if a == b || self.surface_ref(b)?.adjacent.is_some() {
                    continue;
                }
                if footprints_coincide(&world_a, &self.world_vertices(b)?, &self.config)? {
                    self.set_adjacent_surface(a, b)?;
                    self.match_sub_surfaces(a, b)?;
                    pairs += 1;
                    break;
                }
            }
        }

        debug!(pairs, "matched surfaces");
        Ok(pairs)
    }

    fn match_sub_surfaces(&mut self, a: SurfaceKey, b: SurfaceKey) -> Result<()> {
        let subs_a = self.surface_ref(a)?.sub_surfaces.clone();
        let subs_b = self.surface_ref(b)?.sub_surfaces.clone();

        for sa in subs_a {
            let world_a = self.sub_surface_world_vertices(sa)?;
            for &sb in &subs_b {
                if self.sub_surface_ref(sb)?.adjacent.is_some() {
                    continue;
                }
                let world_b = self.sub_surface_world_vertices(sb)?;
                if footprints_coincide(&world_a, &world_b, &self.config)? {
                    self.set_adjacent_sub_surface(sa, sb)?;
                    break;
                }
            }
        }
        Ok(())
    }
}
