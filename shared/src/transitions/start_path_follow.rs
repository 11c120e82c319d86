use crate::{
    mode::TickParams,
    transition::{Transition, TransitionEvalResult},
    types::ModeName,
};

/// Grab a line while airborne.
///
/// Only checks that some line is in reach; which line and which direction is decided by the
/// path-follow mode on its first tick.
pub struct StartPathFollow;

impl Transition for StartPathFollow {
    fn name(&self) -> &'static str {
        "StartPathFollow"
    }

    fn evaluate(&self, params: &TickParams) -> TransitionEvalResult {
        let current = params.start.mode;
        if current == ModeName::PATH_FOLLOW
            || !params.registry.is_airborne(current)
            || !params.input.wants_path_follow()
        {
            return TransitionEvalResult::None;
        }

        match params
            .world
            .first_overlapping_line(params.body, &params.start.position)
        {
            Some(_) => TransitionEvalResult::Switch(ModeName::PATH_FOLLOW),
            None => TransitionEvalResult::None,
        }
    }
}
