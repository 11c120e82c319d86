use crate::{
    mode::TickParams,
    sync_state::SyncState,
    transition::{Transition, TransitionEvalResult},
};

/// Edge-triggered jump from the ground into the airborne mode.
pub struct Jump;

impl Transition for Jump {
    fn name(&self) -> &'static str {
        "Jump"
    }

    fn evaluate(&self, params: &TickParams) -> TransitionEvalResult {
        if params.input.jump_just_pressed() {
            TransitionEvalResult::Switch(params.settings.default_air_mode)
        } else {
            TransitionEvalResult::None
        }
    }

    fn trigger(&self, params: &TickParams, state: &mut SyncState) {
        state.velocity.y = params.settings.jump_speed;
    }
}
