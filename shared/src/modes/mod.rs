pub mod falling;
pub mod path_follow;
pub mod walking;

pub use falling::FallingMode;
pub use path_follow::PathFollowMode;
pub use walking::WalkingMode;

use crate::{
    input::{InputCmd, MoveInputType},
    settings::MovementSettings,
    types::{Quat, Vec3},
    utils::{facing_from_direction, is_nearly_zero},
};

/// Planar velocity the input asks for.
///
/// A velocity request is taken as-is; a directional intent is clamped to unit length and
/// scaled by the walk speed.
pub(crate) fn requested_planar_velocity(input: &InputCmd, settings: &MovementSettings) -> Vec3 {
    let planar = Vec3::new(input.move_input.x, 0.0, input.move_input.z);
    match input.move_input_type {
        MoveInputType::Velocity => planar,
        MoveInputType::DirectionalIntent => {
            let len = planar.norm();
            let clamped = if len > 1.0 { planar / len } else { planar };
            clamped * settings.walk_speed
        }
    }
}

/// Facing from the orientation intent, falling back to the direction of motion.
pub(crate) fn requested_facing(input: &InputCmd, planar_velocity: &Vec3) -> Option<Quat> {
    if !is_nearly_zero(&input.orientation_intent) {
        if let Some(facing) = facing_from_direction(&input.orientation_intent) {
            return Some(facing);
        }
    }
    facing_from_direction(planar_velocity)
}
