// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of a model.
//!
//! Arena keys are replaced by sequential integer ids so the output is
//! portable and stable for a given insertion order. Region vertices are
//! stored in the region's frame together with its placement.

use bem_lite_geometry::{
    contains_loop, BoundaryAssignment, BoundaryCondition, Isometry3, Point3, Quaternion, SubSurfaceType,
    SurfaceType, Translation3, UnitQuaternion,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::*;
use crate::model::*;

/// Serializable representation of the full model.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub regions: Vec<RegionSnapshot>,
    pub constructions: Vec<ConstructionSnapshot>,
    pub surfaces: Vec<SurfaceSnapshot>,
    pub sub_surfaces: Vec<SubSurfaceSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub origin: [f64; 3],
    /// Rotation quaternion as `[i, j, k, w]`.
    pub rotation: [f64; 4],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConstructionSnapshot {
    pub id: usize,
    pub name: String,
    pub layers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub id: usize,
    pub name: String,
    pub region: usize,
    pub vertices: Vec<[f64; 3]>,
    pub surface_type: SurfaceType,
    pub boundary_condition: BoundaryCondition,
    pub sun_exposed: bool,
    pub wind_exposed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacent_surface: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubSurfaceSnapshot {
    pub id: usize,
    pub name: String,
    pub surface: usize,
    pub vertices: Vec<[f64; 3]>,
    pub sub_type: SubSurfaceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacent_sub_surface: Option<usize>,
}

impl Model {
    /// Serializes the model to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot of the model.
    pub fn to_snapshot(&self) -> ModelSnapshot {
        let region_ids: FxHashMap<RegionKey, usize> =
            self.regions.keys().enumerate().map(|(i, k)| (k, i)).collect();
        let construction_ids: FxHashMap<ConstructionKey, usize> = self
            .constructions
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();
        let surface_ids: FxHashMap<SurfaceKey, usize> =
            self.surfaces.keys().enumerate().map(|(i, k)| (k, i)).collect();
        let sub_surface_ids: FxHashMap<SubSurfaceKey, usize> = self
            .sub_surfaces
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();

        let regions = self
            .regions
            .values()
            .enumerate()
            .map(|(id, r)| {
                let t = r.transform.translation.vector;
                let q = r.transform.rotation.coords;
                RegionSnapshot {
                    id,
                    name: r.name.clone(),
                    zone: r.zone.clone(),
                    schedule: r.schedule.clone(),
                    origin: [t.x, t.y, t.z],
                    rotation: [q.x, q.y, q.z, q.w],
                }
            })
            .collect();

        let constructions = self
            .constructions
            .values()
            .enumerate()
            .map(|(id, c)| ConstructionSnapshot {
                id,
                name: c.name.clone(),
                layers: c.layers.clone(),
            })
            .collect();

        let surfaces = self
            .surfaces
            .values()
            .enumerate()
            .map(|(id, s)| SurfaceSnapshot {
                id,
                name: s.name.clone(),
                region: region_ids[&s.region],
                vertices: points_to_arrays(&s.vertices),
                surface_type: s.surface_type,
                boundary_condition: s.boundary.condition,
                sun_exposed: s.boundary.sun_exposed,
                wind_exposed: s.boundary.wind_exposed,
                construction: s.construction.and_then(|c| construction_ids.get(&c).copied()),
                adjacent_surface: s.adjacent.and_then(|a| surface_ids.get(&a).copied()),
            })
            .collect();

        let sub_surfaces = self
            .sub_surfaces
            .values()
            .enumerate()
            .map(|(id, s)| SubSurfaceSnapshot {
                id,
                name: s.name.clone(),
                surface: surface_ids[&s.surface],
                vertices: points_to_arrays(&s.vertices),
                sub_type: s.sub_type,
                construction: s.construction.and_then(|c| construction_ids.get(&c).copied()),
                adjacent_sub_surface: s.adjacent.and_then(|a| sub_surface_ids.get(&a).copied()),
            })
            .collect();

        ModelSnapshot {
            regions,
            constructions,
            surfaces,
            sub_surfaces,
        }
    }

    /// Deserializes a model from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ModelSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Reconstructs a model from a snapshot, keeping stored types, boundary
    /// conditions and pairings as they are.
    pub fn from_snapshot(snap: &ModelSnapshot) -> Result<Self> {
        let mut model = Model::new();

        let region_keys: Vec<RegionKey> = snap
            .regions
            .iter()
            .map(|rs| {
                let [x, y, z] = rs.origin;
                let [i, j, k, w] = rs.rotation;
                let transform = Isometry3::from_parts(
                    Translation3::new(x, y, z),
                    UnitQuaternion::from_quaternion(Quaternion::new(w, i, j, k)),
                );
                let key = model.add_region_with_transform(rs.name.clone(), transform);
                if let Some(region) = model.regions.get_mut(key) {
                    region.zone = rs.zone.clone();
                    region.schedule = rs.schedule.clone();
                }
                key
            })
            .collect();

        let construction_keys: Vec<ConstructionKey> = snap
            .constructions
            .iter()
            .map(|cs| model.add_construction(cs.name.clone(), cs.layers.clone()))
            .collect();

        let mut surface_keys: Vec<SurfaceKey> = Vec::with_capacity(snap.surfaces.len());
        for ss in &snap.surfaces {
            let region = lookup(&region_keys, ss.region, "region")?;
            let vertices = arrays_to_points(&ss.vertices);
            let plane = validate_loop(&vertices)?;
            let key = model.surfaces.insert(SurfaceData {
                name: ss.name.clone(),
                region,
                vertices,
                plane,
                surface_type: ss.surface_type,
                boundary: BoundaryAssignment {
                    condition: ss.boundary_condition,
                    sun_exposed: ss.sun_exposed,
                    wind_exposed: ss.wind_exposed,
                },
                construction: ss
                    .construction
                    .map(|c| lookup(&construction_keys, c, "construction"))
                    .transpose()?,
                adjacent: None,
                sub_surfaces: Vec::new(),
            });
            if let Some(r) = model.regions.get_mut(region) {
                r.surfaces.push(key);
            }
            surface_keys.push(key);
        }

        // Links are restored once every target exists
        for (ss, &key) in snap.surfaces.iter().zip(&surface_keys) {
            if let Some(adjacent) = ss.adjacent_surface {
                let partner = lookup(&surface_keys, adjacent, "surface")?;
                if let Some(s) = model.surfaces.get_mut(key) {
                    s.adjacent = Some(partner);
                }
            }
        }

        let mut sub_keys: Vec<SubSurfaceKey> = Vec::with_capacity(snap.sub_surfaces.len());
        for ss in &snap.sub_surfaces {
            let surface = lookup(&surface_keys, ss.surface, "surface")?;
            let vertices = arrays_to_points(&ss.vertices);
            let plane = validate_loop(&vertices)?;
            let key = model.sub_surfaces.insert(SubSurfaceData {
                name: ss.name.clone(),
                surface,
                vertices,
                plane,
                sub_type: ss.sub_type,
                construction: ss
                    .construction
                    .map(|c| lookup(&construction_keys, c, "construction"))
                    .transpose()?,
                adjacent: None,
            });
            if let Some(host) = model.surfaces.get_mut(surface) {
                host.sub_surfaces.push(key);
            }
            sub_keys.push(key);
        }

        for (ss, &key) in snap.sub_surfaces.iter().zip(&sub_keys) {
            if let Some(adjacent) = ss.adjacent_sub_surface {
                let partner = lookup(&sub_keys, adjacent, "sub-surface")?;
                if let Some(s) = model.sub_surfaces.get_mut(key) {
                    s.adjacent = Some(partner);
                }
            }
        }

        model.verify_links()?;
        Ok(model)
    }

    /// Rejects restored links that the pairing manager could never produce.
    fn verify_links(&self) -> Result<()> {
        for (key, surface) in &self.surfaces {
            match surface.adjacent {
                Some(partner) => {
                    let back = self.surfaces.get(partner).and_then(|p| p.adjacent);
                    if back != Some(key) {
                        return Err(Error::Serialization(format!(
                            "surface '{}' is paired one-sided",
                            surface.name
                        )));
                    }
                    if surface.boundary != BoundaryAssignment::PAIRED {
                        return Err(Error::Serialization(format!(
                            "paired surface '{}' is not marked Surface",
                            surface.name
                        )));
                    }
                }
                None if surface.boundary.condition == BoundaryCondition::Surface => {
                    return Err(Error::Serialization(format!(
                        "surface '{}' is marked Surface without a partner",
                        surface.name
                    )));
                }
                None => {}
            }
        }

        for (key, sub) in &self.sub_surfaces {
            let host = self.surface_ref(sub.surface)?;
            if !contains_loop(&host.vertices, &sub.vertices, &self.config)? {
                return Err(Error::Serialization(format!(
                    "sub-surface '{}' lies outside host '{}'",
                    sub.name, host.name
                )));
            }
            if let Some(partner) = sub.adjacent {
                let back = self.sub_surfaces.get(partner).and_then(|p| p.adjacent);
                if back != Some(key) {
                    return Err(Error::Serialization(format!(
                        "sub-surface '{}' is paired one-sided",
                        sub.name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn lookup<K: Copy>(keys: &[K], id: usize, kind: &'static str) -> Result<K> {
    keys.get(id).copied().ok_or(Error::DanglingReference(kind, id))
}

fn points_to_arrays(points: &[Point3<f64>]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

fn arrays_to_points(arrays: &[[f64; 3]]) -> Vec<Point3<f64>> {
    arrays.iter().map(|a| Point3::new(a[0], a[1], a[2])).collect()
}
