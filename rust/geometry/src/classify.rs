// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface classification from loop orientation.
//!
//! The surface type is derived purely from the outward normal's tilt against
//! the global up vector; the default boundary condition is a total mapping
//! over (surface type, declared exposure, neighbour relationship).

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::GeometryConfig;
use crate::error::Result;
use crate::plane::{normalize, outward_normal};

/// Angle between `normal` and global up, in `[0, π]`.
pub fn tilt(normal: &Vector3<f64>) -> Result<f64> {
    let n = normalize(normal)?;
    Ok(n.z.clamp(-1.0, 1.0).acos())
}

/// Clockwise angle from north (+y) of the horizontal projection of `normal`,
/// in `[0, 2π)`. Horizontal surfaces report 0.
pub fn azimuth(normal: &Vector3<f64>) -> Result<f64> {
    let n = normalize(normal)?;
    if n.x.hypot(n.y) < 1e-12 {
        return Ok(0.0);
    }
    let angle = n.x.atan2(n.y).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative angles
    Ok(if angle >= TAU { 0.0 } else { angle })
}

/// Geometric surface categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    Wall,
    Floor,
    RoofCeiling,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Wall => "Wall",
            SurfaceType::Floor => "Floor",
            SurfaceType::RoofCeiling => "RoofCeiling",
        }
    }

    /// The type seen from the other side of the same partition.
    pub fn flipped(&self) -> Self {
        match self {
            SurfaceType::Wall => SurfaceType::Wall,
            SurfaceType::Floor => SurfaceType::RoofCeiling,
            SurfaceType::RoofCeiling => SurfaceType::Floor,
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wall" => Ok(SurfaceType::Wall),
            "floor" => Ok(SurfaceType::Floor),
            "roofceiling" | "roof" | "ceiling" => Ok(SurfaceType::RoofCeiling),
            other => Err(format!("unknown surface type: {other}")),
        }
    }
}

/// What lies on the outside of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    Outdoors,
    Ground,
    Adiabatic,
    /// Paired with an adjacent surface.
    Surface,
    GroundFCfactorMethod,
    OtherSideCoefficients,
    OtherSideConditionsModel,
    Foundation,
}

impl BoundaryCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryCondition::Outdoors => "Outdoors",
            BoundaryCondition::Ground => "Ground",
            BoundaryCondition::Adiabatic => "Adiabatic",
            BoundaryCondition::Surface => "Surface",
            BoundaryCondition::GroundFCfactorMethod => "GroundFCfactorMethod",
            BoundaryCondition::OtherSideCoefficients => "OtherSideCoefficients",
            BoundaryCondition::OtherSideConditionsModel => "OtherSideConditionsModel",
            BoundaryCondition::Foundation => "Foundation",
        }
    }

    /// Boundary conditions that put the surface in contact with the ground.
    pub fn is_ground(&self) -> bool {
        matches!(
            self,
            BoundaryCondition::Ground
                | BoundaryCondition::GroundFCfactorMethod
                | BoundaryCondition::Foundation
        )
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryCondition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "outdoors" => Ok(BoundaryCondition::Outdoors),
            "ground" => Ok(BoundaryCondition::Ground),
            "adiabatic" => Ok(BoundaryCondition::Adiabatic),
            "surface" => Ok(BoundaryCondition::Surface),
            "groundfcfactormethod" => Ok(BoundaryCondition::GroundFCfactorMethod),
            "othersidecoefficients" => Ok(BoundaryCondition::OtherSideCoefficients),
            "othersideconditionsmodel" => Ok(BoundaryCondition::OtherSideConditionsModel),
            "foundation" => Ok(BoundaryCondition::Foundation),
            other => Err(format!("unknown boundary condition: {other}")),
        }
    }
}

/// Openings hosted by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubSurfaceType {
    FixedWindow,
    OperableWindow,
    Door,
    GlassDoor,
    OverheadDoor,
    Skylight,
    TubularDaylightDome,
}

impl SubSurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubSurfaceType::FixedWindow => "FixedWindow",
            SubSurfaceType::OperableWindow => "OperableWindow",
            SubSurfaceType::Door => "Door",
            SubSurfaceType::GlassDoor => "GlassDoor",
            SubSurfaceType::OverheadDoor => "OverheadDoor",
            SubSurfaceType::Skylight => "Skylight",
            SubSurfaceType::TubularDaylightDome => "TubularDaylightDome",
        }
    }

    pub fn is_window(&self) -> bool {
        matches!(
            self,
            SubSurfaceType::FixedWindow
                | SubSurfaceType::OperableWindow
                | SubSurfaceType::Skylight
                | SubSurfaceType::TubularDaylightDome
        )
    }
}

impl fmt::Display for SubSurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubSurfaceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixedwindow" => Ok(SubSurfaceType::FixedWindow),
            "operablewindow" => Ok(SubSurfaceType::OperableWindow),
            "door" => Ok(SubSurfaceType::Door),
            "glassdoor" => Ok(SubSurfaceType::GlassDoor),
            "overheaddoor" => Ok(SubSurfaceType::OverheadDoor),
            "skylight" => Ok(SubSurfaceType::Skylight),
            "tubulardaylightdome" => Ok(SubSurfaceType::TubularDaylightDome),
            other => Err(format!("unknown sub-surface type: {other}")),
        }
    }
}

/// Surface type from the outward normal, thresholded on tilt.
///
/// Within `threshold` of straight up is a roof/ceiling, within `threshold`
/// of straight down is a floor, anything else is a wall.
pub fn default_surface_type(normal: &Vector3<f64>, threshold: f64) -> Result<SurfaceType> {
    let t = tilt(normal)?;
    Ok(if t <= threshold {
        SurfaceType::RoofCeiling
    } else if t >= PI - threshold {
        SurfaceType::Floor
    } else {
        SurfaceType::Wall
    })
}

/// Surface type of a vertex loop under `config`.
pub fn classify_loop(vertices: &[Point3<f64>], config: &GeometryConfig) -> Result<SurfaceType> {
    let normal = outward_normal(vertices)?;
    default_surface_type(&normal, config.horizontal_tilt_threshold)
}

/// What the far side of a surface touches, as far as classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Neighbor {
    /// Nothing declared on the other side.
    None,
    /// Both sides belong to the same region.
    SameRegion,
    /// The other side belongs to a different region.
    OtherRegion,
}

/// Boundary condition plus exposure flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryAssignment {
    pub condition: BoundaryCondition,
    pub sun_exposed: bool,
    pub wind_exposed: bool,
}

impl BoundaryAssignment {
    pub const OUTDOORS: Self = Self {
        condition: BoundaryCondition::Outdoors,
        sun_exposed: true,
        wind_exposed: true,
    };

    pub const PAIRED: Self = Self::sheltered(BoundaryCondition::Surface);

    /// A condition with both exposure flags off.
    pub const fn sheltered(condition: BoundaryCondition) -> Self {
        Self {
            condition,
            sun_exposed: false,
            wind_exposed: false,
        }
    }
}

/// Default boundary condition.
///
/// `exposed` is the declared "exposed to the elements" flag, `None` when the
/// input did not say. The match is exhaustive so every combination has an
/// explicit answer.
pub fn default_boundary_condition(
    surface_type: SurfaceType,
    exposed: Option<bool>,
    neighbor: Neighbor,
) -> BoundaryAssignment {
    use BoundaryCondition::*;

    match (neighbor, surface_type, exposed) {
        (Neighbor::OtherRegion, _, _) => BoundaryAssignment::PAIRED,
        (Neighbor::SameRegion, _, _) => BoundaryAssignment::sheltered(Adiabatic),

        (Neighbor::None, _, Some(true)) => BoundaryAssignment::OUTDOORS,
        (Neighbor::None, SurfaceType::Floor, Some(false) | None) => {
            BoundaryAssignment::sheltered(Ground)
        }
        (Neighbor::None, SurfaceType::Wall | SurfaceType::RoofCeiling, Some(false)) => {
            BoundaryAssignment::sheltered(Adiabatic)
        }
        (Neighbor::None, SurfaceType::Wall | SurfaceType::RoofCeiling, None) => {
            BoundaryAssignment::OUTDOORS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn square(pts: [[f64; 3]; 4]) -> Vec<Point3<f64>> {
        pts.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect()
    }

    #[test]
    fn tilt_range() {
        assert_relative_eq!(tilt(&Vector3::new(0.0, 0.0, 2.0)).unwrap(), 0.0);
        assert_relative_eq!(tilt(&Vector3::new(0.0, 0.0, -1.0)).unwrap(), PI);
        assert_relative_eq!(tilt(&Vector3::new(1.0, 0.0, 0.0)).unwrap(), FRAC_PI_2);
        assert!(tilt(&Vector3::new(0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn azimuth_is_clockwise_from_north() {
        assert_relative_eq!(azimuth(&Vector3::new(0.0, 1.0, 0.0)).unwrap(), 0.0);
        assert_relative_eq!(azimuth(&Vector3::new(1.0, 0.0, 0.0)).unwrap(), FRAC_PI_2);
        assert_relative_eq!(azimuth(&Vector3::new(0.0, -1.0, 0.0)).unwrap(), PI);
        assert_relative_eq!(azimuth(&Vector3::new(-1.0, 0.0, 0.0)).unwrap(), 1.5 * PI);
        assert_relative_eq!(azimuth(&Vector3::new(0.0, 0.0, 1.0)).unwrap(), 0.0);
    }

    #[test]
    fn unit_square_facing_up_is_roof() {
        let cfg = GeometryConfig::default();
        let pts = square([[0., 1., 0.], [0., 0., 0.], [1., 0., 0.], [1., 1., 0.]]);
        let ty = classify_loop(&pts, &cfg).unwrap();
        assert_eq!(ty, SurfaceType::RoofCeiling);
        assert_eq!(
            default_boundary_condition(ty, None, Neighbor::None),
            BoundaryAssignment::OUTDOORS
        );
    }

    #[test]
    fn unit_square_facing_down_is_floor_on_ground() {
        let cfg = GeometryConfig::default();
        let pts = square([[1., 1., 0.], [1., 0., 0.], [0., 0., 0.], [0., 1., 0.]]);
        let ty = classify_loop(&pts, &cfg).unwrap();
        assert_eq!(ty, SurfaceType::Floor);
        let bc = default_boundary_condition(ty, None, Neighbor::None);
        assert_eq!(bc.condition, BoundaryCondition::Ground);
        assert!(!bc.sun_exposed && !bc.wind_exposed);
    }

    #[test]
    fn slight_slope_is_still_horizontal() {
        let threshold = 10f64.to_radians();
        // ~5 degrees off vertical
        let n = Vector3::new(0.0, 5f64.to_radians().sin(), 5f64.to_radians().cos());
        assert_eq!(default_surface_type(&n, threshold).unwrap(), SurfaceType::RoofCeiling);
        assert_eq!(default_surface_type(&-n, threshold).unwrap(), SurfaceType::Floor);
        // 30 degree roof pitch falls outside the threshold
        let steep = Vector3::new(0.0, 60f64.to_radians().cos(), 60f64.to_radians().sin());
        assert_eq!(default_surface_type(&steep, threshold).unwrap(), SurfaceType::Wall);
    }

    #[test]
    fn classification_is_deterministic() {
        let cfg = GeometryConfig::default();
        let pts = square([[0., 0., 3.], [0., 0., 0.], [1., 0., 0.], [1., 0., 3.]]);
        let first = classify_loop(&pts, &cfg).unwrap();
        let second = classify_loop(&pts, &cfg).unwrap();
        assert_eq!(first, SurfaceType::Wall);
        assert_eq!(first, second);
    }

    #[test]
    fn boundary_table_is_total() {
        let types = [SurfaceType::Wall, SurfaceType::Floor, SurfaceType::RoofCeiling];
        let exposures = [None, Some(true), Some(false)];
        let neighbors = [Neighbor::None, Neighbor::SameRegion, Neighbor::OtherRegion];
        for ty in types {
            for exposed in exposures {
                for neighbor in neighbors {
                    let bc = default_boundary_condition(ty, exposed, neighbor);
                    // Only outdoor surfaces see sun and wind
                    assert_eq!(bc.sun_exposed, bc.condition == BoundaryCondition::Outdoors);
                    match neighbor {
                        Neighbor::OtherRegion => assert_eq!(bc, BoundaryAssignment::PAIRED),
                        Neighbor::SameRegion => {
                            assert_eq!(bc.condition, BoundaryCondition::Adiabatic)
                        }
                        Neighbor::None => {}
                    }
                }
            }
        }
    }

    #[test]
    fn sheltered_wall_is_adiabatic() {
        let bc = default_boundary_condition(SurfaceType::Wall, Some(false), Neighbor::None);
        assert_eq!(bc.condition, BoundaryCondition::Adiabatic);
        let bc = default_boundary_condition(SurfaceType::Floor, Some(true), Neighbor::None);
        assert_eq!(bc, BoundaryAssignment::OUTDOORS);
    }

    #[test]
    fn parse_round_trip_names() {
        assert_eq!("RoofCeiling".parse::<SurfaceType>().unwrap(), SurfaceType::RoofCeiling);
        assert_eq!("ground".parse::<BoundaryCondition>().unwrap(), BoundaryCondition::Ground);
        assert_eq!(SubSurfaceType::Skylight.to_string(), "Skylight");
        assert!("Shade".parse::<SurfaceType>().is_err());
        assert_eq!(SurfaceType::Floor.flipped(), SurfaceType::RoofCeiling);
    }
}
