use crate::{mode::TickParams, sync_state::SyncState, types::ModeName};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionEvalResult {
    #[default]
    None,
    Switch(ModeName),
}

impl TransitionEvalResult {
    pub fn target(&self) -> Option<ModeName> {
        match self {
            TransitionEvalResult::None => None,
            TransitionEvalResult::Switch(mode) => Some(*mode),
        }
    }
}

/// A condition that moves the mover from one mode into another.
///
/// `evaluate` must be free of side effects and may be called any number of times.
/// `trigger` runs exactly once, on the frame the switch it selected is applied, before the
/// target mode ticks.
pub trait Transition: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, params: &TickParams) -> TransitionEvalResult;

    fn trigger(&self, _params: &TickParams, _state: &mut SyncState) {}
}
