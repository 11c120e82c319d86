use crate::{
    mode::TickParams,
    transition::{Transition, TransitionEvalResult},
};

/// Honour `InputCmd::suggested_mode` when it names another registered mode.
pub struct SuggestedMode;

impl Transition for SuggestedMode {
    fn name(&self) -> &'static str {
        "SuggestedMode"
    }

    fn evaluate(&self, params: &TickParams) -> TransitionEvalResult {
        match params.input.suggested_mode {
            Some(mode) if mode != params.start.mode && params.registry.contains(mode) => {
                TransitionEvalResult::Switch(mode)
            }
            _ => TransitionEvalResult::None,
        }
    }
}
