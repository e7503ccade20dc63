// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency pairing manager.
//!
//! Two surfaces in different regions that are the two faces of one partition
//! are linked to each other. Links are always symmetric: every operation
//! here updates both ends or neither, and a paired surface always carries the
//! `Surface` boundary condition with no sun or wind exposure.

use bem_lite_geometry::{
    contains_loop, reverse_loop, BoundaryAssignment, BoundaryCondition, Error as GeometryError, Plane,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{RegionKey, SubSurfaceKey, SurfaceKey};
use crate::model::Model;

impl Model {
    /// Pairs `a` with `b`.
    ///
    /// Their world planes must be reverse-equal. `a == b` is a self-link for
    /// a fully internal partition. Previous partners of either surface are
    /// unpaired first. Region membership is not touched.
    pub fn set_adjacent_surface(&mut self, a: SurfaceKey, b: SurfaceKey) -> Result<()> {
        let partner_a = self.surface_ref(a)?.adjacent;
        let partner_b = self.surface_ref(b)?.adjacent;

        if a != b {
            let plane_a = self.world_plane(a)?;
            let plane_b = self.world_plane(b)?;
            if !plane_a.reverse_equal(&plane_b, self.config.length_tolerance) {
                return Err(GeometryError::GeometryMismatch(format!(
                    "'{}' and '{}' do not face each other",
                    self.surface_ref(a)?.name,
                    self.surface_ref(b)?.name
                ))
                .into());
            }
        }

        if partner_a.is_some() && partner_a != Some(b) {
            self.reset_adjacent_surface(a)?;
        }
        if a != b && partner_b.is_some() && partner_b != Some(a) {
            self.reset_adjacent_surface(b)?;
        }

        self.link_surface(a, b)?;
        self.link_surface(b, a)?;

        debug!(?a, ?b, "paired surfaces");
        Ok(())
    }

    /// Unpairs `a` and its partner, restoring both to outdoor exposure.
    /// Paired sub-surfaces are unpaired too. No-op for an unpaired surface.
    pub fn reset_adjacent_surface(&mut self, a: SurfaceKey) -> Result<()> {
        let surface = self.surface_mut(a)?;
        let Some(partner) = surface.adjacent.take() else {
            return Ok(());
        };
        surface.boundary = BoundaryAssignment::OUTDOORS;

        let subs = surface.sub_surfaces.clone();
        for sub in subs {
            self.reset_adjacent_sub_surface(sub)?;
        }

        if partner != a {
            if let Some(other) = self.surfaces.get_mut(partner) {
                debug_assert_eq!(other.adjacent, Some(a), "asymmetric adjacency");
                other.adjacent = None;
                other.boundary = BoundaryAssignment::OUTDOORS;
            }
        }
        Ok(())
    }

    /// Builds the other side of `a` in `region` and pairs the two.
    ///
    /// The new surface's loop is `a`'s world loop reversed; it gets `a`'s
    /// construction and a reversed, paired copy of each of `a`'s
    /// sub-surfaces. Returns `None` without touching anything if `a` already
    /// has a distinct partner.
    pub fn create_adjacent_surface(
        &mut self,
        a: SurfaceKey,
        region: RegionKey,
    ) -> Result<Option<SurfaceKey>> {
        let source = self.surface_ref(a)?;
        if matches!(source.adjacent, Some(p) if p != a) {
            return Ok(None);
        }
        let name = format!("{} Reversed", source.name);
        let construction = source.construction;
        let (boundary, adjacent) = (source.boundary, source.adjacent);
        let subs = source.sub_surfaces.clone();
        let sub_links: Vec<_> = subs
            .iter()
            .map(|k| self.sub_surface_ref(*k).map(|s| s.adjacent))
            .collect::<Result<_>>()?;

        let world = self.world_vertices(a)?;
        let local = self.region_ref(region)?.to_local(&reverse_loop(&world));

        let mirror = self.add_surface(region, name, local)?;
        self.surface_mut(mirror)?.construction = construction;

        if let Err(e) = self.pair_mirror(a, mirror, region, &subs) {
            // Undo the half-built mirror and put `a` back as it was
            self.remove_surface(mirror)?;
            let source = self.surface_mut(a)?;
            source.boundary = boundary;
            source.adjacent = adjacent;
            for (sub, link) in subs.iter().zip(sub_links) {
                if let Some(data) = self.sub_surfaces.get_mut(*sub) {
                    data.adjacent = link;
                }
            }
            return Err(e);
        }

        Ok(Some(mirror))
    }

    fn pair_mirror(
        &mut self,
        a: SurfaceKey,
        mirror: SurfaceKey,
        region: RegionKey,
        subs: &[SubSurfaceKey],
    ) -> Result<()> {
        self.set_adjacent_surface(a, mirror)?;
        for &sub in subs {
            let world = self.sub_surface_world_vertices(sub)?;
            let local = self.region_ref(region)?.to_local(&reverse_loop(&world));
            let data = self.sub_surface_ref(sub)?;
            let name = format!("{} Reversed", data.name);
            let (sub_type, construction) = (data.sub_type, data.construction);

            let mirrored = self.attach_sub_surface(mirror, name, sub_type, local, construction)?;
            self.set_adjacent_sub_surface(sub, mirrored)?;
        }
        Ok(())
    }

    /// Pairs two sub-surfaces whose hosts are paired with each other.
    pub fn set_adjacent_sub_surface(&mut self, a: SubSurfaceKey, b: SubSurfaceKey) -> Result<()> {
        let host_a = self.sub_surface_ref(a)?.surface;
        let host_b = self.sub_surface_ref(b)?.surface;
        let hosts_paired = self.surface_ref(host_a)?.adjacent == Some(host_b)
            && self.surface_ref(host_b)?.adjacent == Some(host_a);
        if !hosts_paired {
            return Err(Error::HostsNotPaired(a, b));
        }

        if a != b {
            let plane_a = Plane::from_loop(&self.sub_surface_world_vertices(a)?)?;
            let plane_b = Plane::from_loop(&self.sub_surface_world_vertices(b)?)?;
            if !plane_a.reverse_equal(&plane_b, self.config.length_tolerance) {
                return Err(GeometryError::GeometryMismatch(format!(
                    "sub-surfaces '{}' and '{}' do not face each other",
                    self.sub_surface_ref(a)?.name,
                    self.sub_surface_ref(b)?.name
                ))
                .into());
            }
        }

        let partner_a = self.sub_surface_ref(a)?.adjacent;
        let partner_b = self.sub_surface_ref(b)?.adjacent;
        if partner_a.is_some() && partner_a != Some(b) {
            self.reset_adjacent_sub_surface(a)?;
        }
        if a != b && partner_b.is_some() && partner_b != Some(a) {
            self.reset_adjacent_sub_surface(b)?;
        }

        for (from, to) in [(a, b), (b, a)] {
            self.sub_surfaces
                .get_mut(from)
                .ok_or(Error::SubSurfaceNotFound(from))?
                .adjacent = Some(to);
        }
        Ok(())
    }

    /// Unpairs a sub-surface and its partner. No-op when unpaired.
    pub fn reset_adjacent_sub_surface(&mut self, a: SubSurfaceKey) -> Result<()> {
        let partner = self
            .sub_surfaces
            .get_mut(a)
            .ok_or(Error::SubSurfaceNotFound(a))?
            .adjacent
            .take();
        if let Some(partner) = partner.filter(|p| *p != a) {
            if let Some(other) = self.sub_surfaces.get_mut(partner) {
                other.adjacent = None;
            }
        }
        Ok(())
    }

    /// Panics if any structural invariant is broken: asymmetric or dangling
    /// adjacency, a paired tag without a partner, or a sub-surface that is
    /// orphaned or outside its host.
    pub fn check_invariants(&self) {
        for (key, surface) in &self.surfaces {
            let in_region = self
                .regions
                .get(surface.region)
                .is_some_and(|r| r.surfaces.contains(&key));
            assert!(in_region, "surface '{}' is not listed by its region", surface.name);

            match surface.adjacent {
                Some(partner) => {
                    let other = self.surfaces.get(partner).unwrap_or_else(|| {
                        panic!("surface '{}' is paired with a removed surface", surface.name)
                    });
                    assert_eq!(
                        other.adjacent,
                        Some(key),
                        "asymmetric adjacency between '{}' and '{}'",
                        surface.name,
                        other.name
                    );
                    assert_eq!(
                        surface.boundary,
                        BoundaryAssignment::PAIRED,
                        "paired surface '{}' is not marked Surface",
                        surface.name
                    );
                }
                None => assert_ne!(
                    surface.boundary.condition,
                    BoundaryCondition::Surface,
                    "surface '{}' is marked Surface without a partner",
                    surface.name
                ),
            }

            for sub in &surface.sub_surfaces {
                let hosted = self.sub_surfaces.get(*sub).is_some_and(|s| s.surface == key);
                assert!(hosted, "surface '{}' lists a foreign sub-surface", surface.name);
            }
        }

        for (key, sub) in &self.sub_surfaces {
            let host = self
                .surfaces
                .get(sub.surface)
                .unwrap_or_else(|| panic!("sub-surface '{}' has no host", sub.name));
            assert!(
                host.sub_surfaces.contains(&key),
                "sub-surface '{}' is not listed by its host",
                sub.name
            );
            assert!(
                contains_loop(&host.vertices, &sub.vertices, &self.config).unwrap_or(false),
                "sub-surface '{}' lies outside host '{}'",
                sub.name,
                host.name
            );
            if let Some(partner) = sub.adjacent {
                let other = self.sub_surfaces.get(partner).unwrap_or_else(|| {
                    panic!("sub-surface '{}' is paired with a removed sub-surface", sub.name)
                });
                assert_eq!(
                    other.adjacent,
                    Some(key),
                    "asymmetric sub-surface adjacency between '{}' and '{}'",
                    sub.name,
                    other.name
                );
            }
        }
    }

    fn link_surface(&mut self, from: SurfaceKey, to: SurfaceKey) -> Result<()> {
        let surface = self.surface_mut(from)?;
        surface.adjacent = Some(to);
        surface.boundary = BoundaryAssignment::PAIRED;
        Ok(())
    }
}
