/*!
Core math aliases and identifiers shared by every module.

This module intentionally contains no algorithms.
*/

use nalgebra as na;
use std::fmt;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Stable identifier of a simulated entity (mover or line).
///
/// Replicated state stores this instead of any owning handle, so a reference can
/// always be checked against the world before use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a movement mode, used as the registry key and as the replicated "active mode".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeName(pub &'static str);

impl ModeName {
    pub const WALKING: ModeName = ModeName("Walking");
    pub const FALLING: ModeName = ModeName("Falling");
    pub const PATH_FOLLOW: ModeName = ModeName("PathFollow");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Capsule specification for kinematic movers.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Half of the bounding-box height along +Y.
    #[inline]
    pub fn half_extent_y(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// The moving entity as seen by modes: who it is and what volume it sweeps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingBody {
    pub entity: EntityId,
    pub capsule: CapsuleSpec,
}

impl MovingBody {
    pub fn new(entity: EntityId, capsule: CapsuleSpec) -> Self {
        Self { entity, capsule }
    }
}
