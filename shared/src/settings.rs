/*!
Tunable parameters for movement modes and the kinematic character controller.

Defaults come from [`crate::constants`]; hosts override fields as needed and must use the
same values on every peer simulating the same entity.
*/

use crate::{
    constants::{
        AIR_CONTROL_MULTIPLIER, AIR_CONTROL_RESPONSE, GRAVITY, GROUND_BIAS_SPEED, JUMP_SPEED,
        PATH_FOLLOW_EXIT_CARRY, PATH_FOLLOW_EXIT_UP_SPEED, PATH_FOLLOW_MAX_SPEED,
        TERMINAL_FALL_SPEED, WALK_SPEED,
    },
    types::ModeName,
};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};

#[derive(Clone, Debug, PartialEq)]
pub struct MovementSettings {
    /// Mode entered when a mover loses support or leaves a line.
    pub default_air_mode: ModeName,
    /// Mode entered when an airborne mover lands.
    pub ground_mode: ModeName,
    pub walk_speed: f32,
    pub air_control: f32,
    pub air_control_response: f32,
    /// Positive magnitude, applied downward.
    pub gravity: f32,
    /// Negative: the lowest vertical velocity allowed.
    pub terminal_fall_speed: f32,
    pub ground_bias_speed: f32,
    pub jump_speed: f32,
    pub path_follow_max_speed: f32,
    /// Mode entered when jumping off a line.
    pub path_follow_exit_mode: ModeName,
    pub path_follow_exit_up_speed: f32,
    pub path_follow_exit_carry: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            default_air_mode: ModeName::FALLING,
            ground_mode: ModeName::WALKING,
            walk_speed: WALK_SPEED,
            air_control: AIR_CONTROL_MULTIPLIER,
            air_control_response: AIR_CONTROL_RESPONSE,
            gravity: GRAVITY,
            terminal_fall_speed: TERMINAL_FALL_SPEED,
            ground_bias_speed: GROUND_BIAS_SPEED,
            jump_speed: JUMP_SPEED,
            path_follow_max_speed: PATH_FOLLOW_MAX_SPEED,
            path_follow_exit_mode: ModeName::FALLING,
            path_follow_exit_up_speed: PATH_FOLLOW_EXIT_UP_SPEED,
            path_follow_exit_carry: PATH_FOLLOW_EXIT_CARRY,
        }
    }
}

/// Kinematic Character Controller (KCC) settings.
///
/// Values are expressed in world units and degrees (converted to radians when the
/// controller is built). Autostep and snap-to-ground are always enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KccSettings {
    /// Small gap preserved between the character and its surroundings.
    /// Keep `offset` small but non-zero for numerical stability.
    pub offset: f32,
    /// Maximum climbable slope angle (degrees).
    pub max_slope_climb_deg: f32,
    /// Minimum slope angle (degrees) before automatic sliding starts.
    pub min_slope_slide_deg: f32,
    /// Autostep maximum height, relative to the capsule height.
    pub autostep_max_height: f32,
    /// Autostep minimum width, relative to the capsule height.
    pub autostep_min_width: f32,
    /// Snap-to-ground distance, relative to the capsule height.
    pub snap_to_ground: f32,
    pub slide: bool,
    /// Increase if the character gets stuck when sliding.
    pub normal_nudge_factor: f32,
}

impl Default for KccSettings {
    fn default() -> Self {
        Self {
            offset: 0.025,
            max_slope_climb_deg: 45.0,
            min_slope_slide_deg: 30.0,
            autostep_max_height: 0.4,
            autostep_min_width: 0.2,
            snap_to_ground: 0.2,
            slide: true,
            normal_nudge_factor: 1.0e-4,
        }
    }
}

impl KccSettings {
    pub fn controller(&self) -> KinematicCharacterController {
        KinematicCharacterController {
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(self.autostep_max_height),
                min_width: CharacterLength::Relative(self.autostep_min_width),
            }),
            offset: CharacterLength::Relative(self.offset),
            max_slope_climb_angle: self.max_slope_climb_deg.to_radians(),
            min_slope_slide_angle: self.min_slope_slide_deg.to_radians(),
            snap_to_ground: Some(CharacterLength::Relative(self.snap_to_ground)),
            slide: self.slide,
            normal_nudge_factor: self.normal_nudge_factor,
            ..KinematicCharacterController::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_converts_degrees() {
        let kcc = KccSettings::default().controller();
        assert!((kcc.max_slope_climb_angle - 45f32.to_radians()).abs() < 1.0e-6);
        assert!(kcc.autostep.is_some());
        assert!(kcc.snap_to_ground.is_some());
    }

    #[test]
    fn path_follow_leaves_into_the_air_mode_by_default() {
        let settings = MovementSettings::default();
        assert_eq!(settings.path_follow_exit_mode, settings.default_air_mode);
    }
}
