//! Per-frame input command consumed by transitions and modes.
//!
//! An [`InputCmd`] is produced once per simulation frame by whatever drives the mover
//! (a local player, an AI request, or a server replaying a client's stream) and is
//! read-only for the rest of the frame.
//!
//! Action flags come in two flavours:
//! - continuous flags (`JumpPressed`, `WantsPathFollow`) stay set until the producer changes them;
//! - one-shot flags (`JumpJustPressed`) are valid for exactly one frame. The producer clears them
//!   right after the command is handed out, and [`InputCmd::carried_over`] never repeats them.

use crate::{
    bitmask_flags::BitmaskFlags,
    types::{ModeName, Vec3},
};

crate::define_bitmask_flags!(
    /// Discrete actions carried by an [`InputCmd`].
    InputAction, u8, {
        /// Jump is held down.
        JumpPressed,
        /// Jump went down this frame (edge).
        JumpJustPressed,
        /// The player asks to grab a nearby line.
        WantsPathFollow,
    }
);

impl InputAction {
    /// Flags that must not survive past the frame they were produced for.
    pub const ONE_SHOT: [InputAction; 1] = [InputAction::JumpJustPressed];

    pub fn is_one_shot(&self) -> bool {
        Self::ONE_SHOT.contains(self)
    }
}

pub type ActionFlags = BitmaskFlags<u8>;

/// How `InputCmd::move_input` should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveInputType {
    /// Unit-scaled direction; modes map it onto their own speed.
    #[default]
    DirectionalIntent,
    /// Explicit world-space velocity request.
    Velocity,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputCmd {
    pub move_input_type: MoveInputType,
    pub move_input: Vec3,
    /// Direction the mover would like to face. Zero means "no preference".
    pub orientation_intent: Vec3,
    pub actions: ActionFlags,
    pub suggested_mode: Option<ModeName>,
}

impl InputCmd {
    pub fn with_intent(intent: Vec3) -> Self {
        Self {
            move_input_type: MoveInputType::DirectionalIntent,
            move_input: intent,
            ..Self::default()
        }
    }

    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            move_input_type: MoveInputType::Velocity,
            move_input: velocity,
            ..Self::default()
        }
    }

    /// Builder-style helper to set an action flag.
    pub fn with_action(mut self, action: InputAction) -> Self {
        self.actions.add(action);
        self
    }

    pub fn has(&self, action: InputAction) -> bool {
        self.actions.has(action)
    }

    pub fn jump_just_pressed(&self) -> bool {
        self.has(InputAction::JumpJustPressed)
    }

    pub fn wants_path_follow(&self) -> bool {
        self.has(InputAction::WantsPathFollow)
    }

    /// The command a host reuses for a frame whose input never arrived.
    ///
    /// Continuous state carries over; one-shot flags and the suggested mode do not.
    pub fn carried_over(&self) -> Self {
        let mut next = self.clone();
        next.actions.remove_many(&InputAction::ONE_SHOT);
        next.suggested_mode = None;
        next
    }
}
