// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for regions, surfaces, sub-surfaces and constructions.
//!
//! The [`Model`] is the central owner of all entity data. Regions hold the
//! keys of their surfaces, surfaces hold the keys of their sub-surfaces, and
//! an adjacency link is just another key. Removing an entity severs every
//! link pointing at it first, so no key ever refers to a missing entity.
//!
//! ## Coordinate frames
//!
//! Each region has a rigid placement. Surface and sub-surface vertices are
//! stored in the owning region's local frame; anything comparing two
//! surfaces (planes, intersection, matching) works on world coordinates.

use bem_lite_geometry::{
    contains_loop, default_boundary_condition, default_surface_type, BoundaryAssignment,
    BoundaryCondition, GeometryConfig, Isometry3, Neighbor, Plane, Point3, SubSurfaceType,
    SurfaceType,
};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::keys::*;

/// Data stored for a region: an enclosed building space.
#[derive(Debug, Clone)]
pub struct RegionData {
    pub name: String,
    /// Thermal zone the region belongs to.
    pub zone: Option<String>,
    /// Occupancy or operation schedule name.
    pub schedule: Option<String>,
    pub(crate) transform: Isometry3<f64>,
    pub(crate) surfaces: Vec<SurfaceKey>,
}

impl RegionData {
    /// Placement of the region's local frame in world coordinates.
    pub fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    /// Surfaces owned by this region, in creation order.
    pub fn surfaces(&self) -> &[SurfaceKey] {
        &self.surfaces
    }

    /// Maps local points to world coordinates.
    pub fn to_world(&self, local: &[Point3<f64>]) -> Vec<Point3<f64>> {
        to_world(&self.transform, local)
    }

    /// Maps world points into this region's frame.
    pub fn to_local(&self, world: &[Point3<f64>]) -> Vec<Point3<f64>> {
        to_local(&self.transform, world)
    }
}

/// Data stored for a construction: an ordered list of material layers,
/// outside to inside.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionData {
    pub name: String,
    pub layers: Vec<String>,
}

/// Data stored for a surface: a planar polygon owned by one region.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    pub name: String,
    pub(crate) region: RegionKey,
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) plane: Plane,
    pub(crate) surface_type: SurfaceType,
    pub(crate) boundary: BoundaryAssignment,
    pub(crate) construction: Option<ConstructionKey>,
    pub(crate) adjacent: Option<SurfaceKey>,
    pub(crate) sub_surfaces: Vec<SubSurfaceKey>,
}

impl SurfaceData {
    /// Returns the owning region.
    pub fn region(&self) -> RegionKey {
        self.region
    }

    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    /// Returns the boundary condition together with the exposure flags.
    pub fn boundary(&self) -> BoundaryAssignment {
        self.boundary
    }

    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.boundary.condition
    }

    pub fn sun_exposed(&self) -> bool {
        self.boundary.sun_exposed
    }

    pub fn wind_exposed(&self) -> bool {
        self.boundary.wind_exposed
    }

    pub fn construction(&self) -> Option<ConstructionKey> {
        self.construction
    }
}

/// Data stored for a sub-surface: a window or door inside its host surface.
#[derive(Debug, Clone)]
pub struct SubSurfaceData {
    pub name: String,
    pub(crate) surface: SurfaceKey,
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) plane: Plane,
    pub(crate) sub_type: SubSurfaceType,
    pub(crate) construction: Option<ConstructionKey>,
    pub(crate) adjacent: Option<SubSurfaceKey>,
}

impl SubSurfaceData {
    /// Returns the host surface.
    pub fn surface(&self) -> SurfaceKey {
        self.surface
    }

    pub fn sub_type(&self) -> SubSurfaceType {
        self.sub_type
    }

    pub fn construction(&self) -> Option<ConstructionKey> {
        self.construction
    }
}

/// The object store for one building model.
///
/// # Example
///
/// ```
/// use bem_lite_model::Model;
/// use bem_lite_geometry::{Point3, SurfaceType};
///
/// let mut model = Model::new();
/// let room = model.add_region("Room");
/// let roof = model
///     .add_surface(
///         room,
///         "Roof",
///         vec![
///             Point3::new(0.0, 1.0, 3.0),
///             Point3::new(0.0, 0.0, 3.0),
///             Point3::new(1.0, 0.0, 3.0),
///             Point3::new(1.0, 1.0, 3.0),
///         ],
///     )
///     .unwrap();
///
/// assert_eq!(model.surface(roof).unwrap().surface_type(), SurfaceType::RoofCeiling);
/// ```
#[derive(Debug)]
pub struct Model {
    // Entity storage
    pub(crate) regions: SlotMap<RegionKey, RegionData>,
    pub(crate) surfaces: SlotMap<SurfaceKey, SurfaceData>,
    pub(crate) sub_surfaces: SlotMap<SubSurfaceKey, SubSurfaceData>,
    pub(crate) constructions: SlotMap<ConstructionKey, ConstructionData>,

    pub(crate) config: GeometryConfig,

    // Next suffix for pieces split off a surface, by base name
    pub(crate) split_counters: FxHashMap<String, usize>,
}

impl Model {
    /// Creates a new, empty model with default tolerances.
    pub fn new() -> Self {
        Self::with_config(GeometryConfig::default())
    }

    /// Creates a new, empty model with the given tolerances.
    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            regions: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            sub_surfaces: SlotMap::with_key(),
            constructions: SlotMap::with_key(),
            config,
            split_counters: FxHashMap::default(),
        }
    }

    /// Returns the tolerances used by every geometric predicate.
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    // --- Region operations ---

    /// Adds a region placed at the world origin.
    pub fn add_region(&mut self, name: impl Into<String>) -> RegionKey {
        self.add_region_with_transform(name, Isometry3::identity())
    }

    /// Adds a region with the given placement.
    pub fn add_region_with_transform(
        &mut self,
        name: impl Into<String>,
        transform: Isometry3<f64>,
    ) -> RegionKey {
        self.regions.insert(RegionData {
            name: name.into(),
            zone: None,
            schedule: None,
            transform,
            surfaces: Vec::new(),
        })
    }

    /// Returns the region data for the given key, or `None` if not found.
    pub fn region(&self, key: RegionKey) -> Option<&RegionData> {
        self.regions.get(key)
    }

    /// Mutable access to a region's descriptive fields.
    pub fn region_mut(&mut self, key: RegionKey) -> Option<&mut RegionData> {
        self.regions.get_mut(key)
    }

    /// Returns the number of regions in the model.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionKey, &RegionData)> {
        self.regions.iter()
    }

    /// Finds the first region with the given name.
    pub fn region_by_name(&self, name: &str) -> Option<RegionKey> {
        self.regions
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(k, _)| k)
    }

    // --- Construction operations ---

    /// Adds a construction from outside-to-inside layer names.
    pub fn add_construction(&mut self, name: impl Into<String>, layers: Vec<String>) -> ConstructionKey {
        self.constructions.insert(ConstructionData {
            name: name.into(),
            layers,
        })
    }

    /// Returns the construction data for the given key, or `None` if not found.
    pub fn construction(&self, key: ConstructionKey) -> Option<&ConstructionData> {
        self.constructions.get(key)
    }

    /// Returns the number of constructions in the model.
    pub fn construction_count(&self) -> usize {
        self.constructions.len()
    }

    // --- Surface operations ---

    /// Returns the surface data for the given key, or `None` if not found.
    pub fn surface(&self, key: SurfaceKey) -> Option<&SurfaceData> {
        self.surfaces.get(key)
    }

    /// Returns the number of surfaces in the model.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKey, &SurfaceData)> {
        self.surfaces.iter()
    }

    /// Finds the first surface with the given name.
    pub fn surface_by_name(&self, name: &str) -> Option<SurfaceKey> {
        self.surfaces
            .iter()
            .find(|(_, s)| s.name == name)
            .map(|(k, _)| k)
    }

    /// Creates a surface in `region` from vertices in the region's frame.
    ///
    /// The surface type comes from the loop's orientation and the boundary
    /// condition from the default table with nothing declared.
    pub fn add_surface(
        &mut self,
        region: RegionKey,
        name: impl Into<String>,
        vertices: Vec<Point3<f64>>,
    ) -> Result<SurfaceKey> {
        let plane = validate_loop(&vertices)?;
        let transform = *self.region_ref(region)?.transform();
        let surface_type = self.classify(&transform, &plane)?;
        let name = name.into();

        debug!(surface = %name, %surface_type, "adding surface");

        let key = self.surfaces.insert(SurfaceData {
            name,
            region,
            vertices,
            plane,
            surface_type,
            boundary: default_boundary_condition(surface_type, None, Neighbor::None),
            construction: None,
            adjacent: None,
            sub_surfaces: Vec::new(),
        });
        if let Some(r) = self.regions.get_mut(region) {
            r.surfaces.push(key);
        }
        Ok(key)
    }

    /// Creates a surface in `region` from world-coordinate vertices.
    pub fn add_surface_world(
        &mut self,
        region: RegionKey,
        name: impl Into<String>,
        world: &[Point3<f64>],
    ) -> Result<SurfaceKey> {
        let local = self.region_ref(region)?.to_local(world);
        self.add_surface(region, name, local)
    }

    /// Vertices of a surface in world coordinates.
    pub fn world_vertices(&self, key: SurfaceKey) -> Result<Vec<Point3<f64>>> {
        let surface = self.surface_ref(key)?;
        Ok(self.region_ref(surface.region)?.to_world(&surface.vertices))
    }

    /// Plane of a surface in world coordinates.
    pub fn world_plane(&self, key: SurfaceKey) -> Result<Plane> {
        Ok(Plane::from_loop(&self.world_vertices(key)?)?)
    }

    /// Replaces a surface's vertex loop (region frame) and recomputes its plane.
    ///
    /// Type and boundary condition are left alone. A pairing survives only
    /// while the two planes stay reverse-equal. A loop that no longer holds
    /// every hosted sub-surface is refused and the old loop kept.
    pub fn set_vertices(&mut self, key: SurfaceKey, vertices: Vec<Point3<f64>>) -> Result<()> {
        let plane = validate_loop(&vertices)?;
        for sub in &self.surface_ref(key)?.sub_surfaces {
            let sub = self.sub_surface_ref(*sub)?;
            if !contains_loop(&vertices, &sub.vertices, &self.config)? {
                return Err(Error::SubSurfaceOutsideParent(key));
            }
        }
        let surface = self.surface_mut(key)?;
        surface.vertices = vertices;
        surface.plane = plane;

        if let Some(partner) = surface.adjacent.filter(|p| *p != key) {
            let tol = self.config.length_tolerance;
            if !self.world_plane(key)?.reverse_equal(&self.world_plane(partner)?, tol) {
                let name = self.surface_ref(key)?.name.clone();
                warn!(
                    surface = %name,
                    "new vertices no longer face the adjacent surface, resetting pairing"
                );
                self.reset_adjacent_surface(key)?;
            }
        }
        Ok(())
    }

    pub fn set_surface_type(&mut self, key: SurfaceKey, surface_type: SurfaceType) -> Result<()> {
        self.surface_mut(key)?.surface_type = surface_type;
        Ok(())
    }

    /// Sets a non-paired boundary condition.
    ///
    /// `Surface` is refused; pairing goes through
    /// [`Model::set_adjacent_surface`]. A paired surface is unpaired first.
    pub fn set_boundary_condition(
        &mut self,
        key: SurfaceKey,
        condition: BoundaryCondition,
        sun_exposed: bool,
        wind_exposed: bool,
    ) -> Result<()> {
        if condition == BoundaryCondition::Surface {
            return Err(Error::PairedBoundaryCondition(key));
        }
        if self.surface_ref(key)?.adjacent.is_some() {
            self.reset_adjacent_surface(key)?;
        }
        self.surface_mut(key)?.boundary = BoundaryAssignment {
            condition,
            sun_exposed,
            wind_exposed,
        };
        Ok(())
    }

    pub fn set_construction(
        &mut self,
        key: SurfaceKey,
        construction: Option<ConstructionKey>,
    ) -> Result<()> {
        self.check_construction(construction)?;
        self.surface_mut(key)?.construction = construction;
        Ok(())
    }

    /// Recomputes the surface type from the current vertex loop, discarding
    /// whatever was set before.
    pub fn assign_default_surface_type(&mut self, key: SurfaceKey) -> Result<SurfaceType> {
        let surface = self.surface_ref(key)?;
        let transform = *self.region_ref(surface.region)?.transform();
        let surface_type = self.classify(&transform, &surface.plane)?;
        self.surface_mut(key)?.surface_type = surface_type;
        Ok(surface_type)
    }

    /// Re-derives the boundary condition from the surface type and the
    /// declared exposure. Paired surfaces keep the paired tag.
    pub fn assign_default_boundary_condition(
        &mut self,
        key: SurfaceKey,
        exposed: Option<bool>,
    ) -> Result<BoundaryAssignment> {
        let surface = self.surface_mut(key)?;
        if surface.adjacent.is_some() {
            return Ok(surface.boundary);
        }
        surface.boundary = default_boundary_condition(surface.surface_type, exposed, Neighbor::None);
        Ok(surface.boundary)
    }

    // --- Sub-surface operations ---

    /// Returns the sub-surface data for the given key, or `None` if not found.
    pub fn sub_surface(&self, key: SubSurfaceKey) -> Option<&SubSurfaceData> {
        self.sub_surfaces.get(key)
    }

    /// Returns the number of sub-surfaces in the model.
    pub fn sub_surface_count(&self) -> usize {
        self.sub_surfaces.len()
    }

    /// Attaches a window or door to `surface`. Vertices are in the host
    /// region's frame and must face the same way as the host and lie inside it.
    pub fn attach_sub_surface(
        &mut self,
        surface: SurfaceKey,
        name: impl Into<String>,
        sub_type: SubSurfaceType,
        vertices: Vec<Point3<f64>>,
        construction: Option<ConstructionKey>,
    ) -> Result<SubSurfaceKey> {
        let plane = validate_loop(&vertices)?;
        self.check_construction(construction)?;
        let host = self.surface_ref(surface)?;
        if !contains_loop(&host.vertices, &vertices, &self.config)? {
            return Err(Error::SubSurfaceOutsideParent(surface));
        }

        let key = self.sub_surfaces.insert(SubSurfaceData {
            name: name.into(),
            surface,
            vertices,
            plane,
            sub_type,
            construction,
            adjacent: None,
        });
        self.surface_mut(surface)?.sub_surfaces.push(key);
        Ok(key)
    }

    /// Like [`Model::attach_sub_surface`] with world-coordinate vertices.
    pub fn attach_sub_surface_world(
        &mut self,
        surface: SurfaceKey,
        name: impl Into<String>,
        sub_type: SubSurfaceType,
        world: &[Point3<f64>],
        construction: Option<ConstructionKey>,
    ) -> Result<SubSurfaceKey> {
        let region = self.surface_ref(surface)?.region;
        let local = self.region_ref(region)?.to_local(world);
        self.attach_sub_surface(surface, name, sub_type, local, construction)
    }

    /// Vertices of a sub-surface in world coordinates.
    pub fn sub_surface_world_vertices(&self, key: SubSurfaceKey) -> Result<Vec<Point3<f64>>> {
        let sub = self.sub_surface_ref(key)?;
        let host = self.surface_ref(sub.surface)?;
        Ok(self.region_ref(host.region)?.to_world(&sub.vertices))
    }

    pub fn set_sub_surface_construction(
        &mut self,
        key: SubSurfaceKey,
        construction: Option<ConstructionKey>,
    ) -> Result<()> {
        self.check_construction(construction)?;
        self.sub_surfaces
            .get_mut(key)
            .ok_or(Error::SubSurfaceNotFound(key))?
            .construction = construction;
        Ok(())
    }

    // --- Removal ---

    /// Detaches and removes a sub-surface, unpairing it first.
    pub fn remove_sub_surface(&mut self, key: SubSurfaceKey) -> Result<SubSurfaceData> {
        self.reset_adjacent_sub_surface(key)?;
        let data = self
            .sub_surfaces
            .remove(key)
            .ok_or(Error::SubSurfaceNotFound(key))?;
        if let Some(host) = self.surfaces.get_mut(data.surface) {
            host.sub_surfaces.retain(|k| *k != key);
        }
        Ok(data)
    }

    /// Removes a surface and its sub-surfaces. A partner is unpaired and
    /// restored to outdoor defaults.
    pub fn remove_surface(&mut self, key: SurfaceKey) -> Result<SurfaceData> {
        self.reset_adjacent_surface(key)?;
        let subs = self.surface_ref(key)?.sub_surfaces.clone();
        for sub in subs {
            self.remove_sub_surface(sub)?;
        }
        let data = self.surfaces.remove(key).ok_or(Error::SurfaceNotFound(key))?;
        if let Some(region) = self.regions.get_mut(data.region) {
            region.surfaces.retain(|k| *k != key);
        }
        Ok(data)
    }

    /// Removes a region with all of its surfaces.
    pub fn remove_region(&mut self, key: RegionKey) -> Result<RegionData> {
        let surfaces = self.region_ref(key)?.surfaces.clone();
        for surface in surfaces {
            self.remove_surface(surface)?;
        }
        self.regions.remove(key).ok_or(Error::RegionNotFound(key))
    }

    // --- Internal helpers ---

    pub(crate) fn region_ref(&self, key: RegionKey) -> Result<&RegionData> {
        self.regions.get(key).ok_or(Error::RegionNotFound(key))
    }

    pub(crate) fn surface_ref(&self, key: SurfaceKey) -> Result<&SurfaceData> {
        self.surfaces.get(key).ok_or(Error::SurfaceNotFound(key))
    }

    pub(crate) fn surface_mut(&mut self, key: SurfaceKey) -> Result<&mut SurfaceData> {
        self.surfaces.get_mut(key).ok_or(Error::SurfaceNotFound(key))
    }

    pub(crate) fn sub_surface_ref(&self, key: SubSurfaceKey) -> Result<&SubSurfaceData> {
        self.sub_surfaces.get(key).ok_or(Error::SubSurfaceNotFound(key))
    }

    fn check_construction(&self, construction: Option<ConstructionKey>) -> Result<()> {
        match construction {
            Some(c) if !self.constructions.contains_key(c) => Err(Error::ConstructionNotFound(c)),
            _ => Ok(()),
        }
    }

    /// Surface type of a local-frame plane placed by `transform`.
    fn classify(&self, transform: &Isometry3<f64>, plane: &Plane) -> Result<SurfaceType> {
        let world_normal = transform.rotation * plane.normal;
        Ok(default_surface_type(
            &world_normal,
            self.config.horizontal_tilt_threshold,
        )?)
    }

    /// Name for the next piece split off a surface called `base`.
    pub(crate) fn next_split_name(&mut self, base: &str) -> String {
        let counter = self.split_counters.entry(base.to_string()).or_insert(0);
        *counter += 1;
        format!("{base} {counter}")
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks the vertex count and derives the loop's plane.
pub(crate) fn validate_loop(vertices: &[Point3<f64>]) -> Result<Plane> {
    if vertices.len() < 3 {
        return Err(Error::TooFewVertices(vertices.len()));
    }
    Ok(Plane::from_loop(vertices)?)
}

pub(crate) fn to_world(transform: &Isometry3<f64>, local: &[Point3<f64>]) -> Vec<Point3<f64>> {
    local.iter().map(|p| transform.transform_point(p)).collect()
}

pub(crate) fn to_local(transform: &Isometry3<f64>, world: &[Point3<f64>]) -> Vec<Point3<f64>> {
    world
        .iter()
        .map(|p| transform.inverse_transform_point(p))
        .collect()
}
