//! What the movement simulation needs from the world, and the rapier-backed implementation.
//!
//! Modes never touch rapier directly: they go through [`SimWorld`], which answers overlap
//! queries, resolves line entities and performs swept "safe moves". [`MoverWorld`] is the
//! implementation shared by server and client; it combines the static [`RapierQueryWorld`]
//! with the dynamic set of lines and movers.

use crate::{
    constants::NEARLY_ZERO,
    rapier_world::{RapierQueryWorld, WorldStaticDef},
    settings::KccSettings,
    types::{CapsuleSpec, EntityId, Iso, MovingBody, Quat, Vec3},
    utils::{segment_distance_sq, up},
};
use rapier3d::{
    control::{CharacterLength, KinematicCharacterController},
    na::Translation3,
    prelude::{Capsule, QueryFilter},
};
use std::collections::BTreeMap;

/// Both ends of a line entity at query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEndpoints {
    pub a: Vec3,
    pub b: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafeMoveResult {
    pub end_position: Vec3,
    /// Some of the requested displacement was refused by geometry.
    pub blocked: bool,
    /// The capsule ended the move supported by walkable ground.
    pub grounded: bool,
}

pub trait SimWorld {
    /// Entities whose volume overlaps `body` placed at `position`, in ascending id order.
    /// The querying body itself is never reported.
    fn overlapping(&self, body: &MovingBody, position: &Vec3) -> Vec<EntityId>;

    /// Endpoints of `entity` if it exists and is a line.
    fn line_endpoints(&self, entity: EntityId) -> Option<LineEndpoints>;

    /// Swept, collision-aware displacement of `body` from `from` by `delta`. Never teleports.
    fn safe_move(
        &self,
        body: &MovingBody,
        from: &Vec3,
        rotation: &Quat,
        delta: &Vec3,
        dt: f32,
    ) -> SafeMoveResult;

    /// Whether `body` at `position` rests on walkable ground.
    fn is_grounded(&self, body: &MovingBody, position: &Vec3) -> bool;

    /// First line overlapping `body` at `position`.
    fn first_overlapping_line(
        &self,
        body: &MovingBody,
        position: &Vec3,
    ) -> Option<(EntityId, LineEndpoints)> {
        self.overlapping(body, position)
            .into_iter()
            .find_map(|entity| self.line_endpoints(entity).map(|ends| (entity, ends)))
    }
}

/// A grabbable line: a segment with a catch radius around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineDef {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

impl LineDef {
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MoverVolume {
    capsule: CapsuleSpec,
    position: Vec3,
}

pub struct MoverWorld {
    statics: RapierQueryWorld,
    kcc: KinematicCharacterController,
    lines: BTreeMap<EntityId, LineDef>,
    movers: BTreeMap<EntityId, MoverVolume>,
}

impl MoverWorld {
    pub fn new(statics: Vec<WorldStaticDef>, kcc: &KccSettings) -> Self {
        Self {
            statics: RapierQueryWorld::build(statics),
            kcc: kcc.controller(),
            lines: BTreeMap::new(),
            movers: BTreeMap::new(),
        }
    }

    /// Insert or move a line.
    pub fn set_line(&mut self, entity: EntityId, line: LineDef) {
        self.lines.insert(entity, line);
    }

    pub fn remove_line(&mut self, entity: EntityId) -> Option<LineDef> {
        self.lines.remove(&entity)
    }

    /// Publish where a mover currently is, so others can overlap it.
    pub fn set_mover(&mut self, body: &MovingBody, position: Vec3) {
        self.movers.insert(
            body.entity,
            MoverVolume {
                capsule: body.capsule,
                position,
            },
        );
    }

    pub fn remove_mover(&mut self, entity: EntityId) {
        self.movers.remove(&entity);
    }

    pub fn line(&self, entity: EntityId) -> Option<&LineDef> {
        self.lines.get(&entity)
    }
}

fn body_shape(capsule: &CapsuleSpec) -> Capsule {
    Capsule::new_y(capsule.half_height, capsule.radius)
}

/// Axis segment of an upright capsule centred at `position`.
fn capsule_axis(capsule: &CapsuleSpec, position: &Vec3) -> (Vec3, Vec3) {
    let half = up() * capsule.half_height;
    (position - half, position + half)
}

/// Two swept spheres overlap when their axis segments come within the sum of their radii.
fn segments_within(a: &(Vec3, Vec3), b: &(Vec3, Vec3), reach: f32) -> bool {
    segment_distance_sq(&a.0, &a.1, &b.0, &b.1) <= reach * reach
}

fn offset_length(length: CharacterLength, extent: f32) -> f32 {
    match length {
        CharacterLength::Relative(fraction) => fraction * extent,
        CharacterLength::Absolute(distance) => distance,
    }
}

impl SimWorld for MoverWorld {
    fn overlapping(&self, body: &MovingBody, position: &Vec3) -> Vec<EntityId> {
        let axis = capsule_axis(&body.capsule, position);

        let lines = self.lines.iter().filter_map(|(entity, line)| {
            segments_within(&axis, &(line.a, line.b), body.capsule.radius + line.radius)
                .then_some(*entity)
        });

        let movers = self
            .movers
            .iter()
            .filter(|(entity, _)| **entity != body.entity)
            .filter_map(|(entity, other)| {
                let other_axis = capsule_axis(&other.capsule, &other.position);
                segments_within(&axis, &other_axis, body.capsule.radius + other.capsule.radius)
                    .then_some(*entity)
            });

        let mut found: Vec<EntityId> = lines.chain(movers).collect();
        found.sort();
        found
    }

    fn line_endpoints(&self, entity: EntityId) -> Option<LineEndpoints> {
        self.lines
            .get(&entity)
            .map(|line| LineEndpoints { a: line.a, b: line.b })
    }

    fn safe_move(
        &self,
        body: &MovingBody,
        from: &Vec3,
        rotation: &Quat,
        delta: &Vec3,
        dt: f32,
    ) -> SafeMoveResult {
        let query_pipeline = self.statics.query_pipeline(QueryFilter::only_fixed());
        let iso = Iso::from_parts(Translation3::from(*from), *rotation);

        let correction = self.kcc.move_shape(
            dt,
            &query_pipeline,
            &body_shape(&body.capsule),
            &iso,
            *delta,
            |_| {},
        );

        let refused = delta - correction.translation;
        SafeMoveResult {
            end_position: from + correction.translation,
            blocked: refused.norm_squared() > NEARLY_ZERO * NEARLY_ZERO,
            grounded: correction.grounded,
        }
    }

    fn is_grounded(&self, body: &MovingBody, position: &Vec3) -> bool {
        // A tiny downward nudge; the controller reports support without us keeping the motion.
        let offset = offset_length(self.kcc.offset, body.capsule.half_extent_y());
        let nudge = Vec3::new(0.0, -2.0 * offset, 0.0);
        self.safe_move(body, position, &Quat::identity(), &nudge, 1.0)
            .grounded
    }
}
