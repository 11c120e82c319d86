//! Movement mode contract and the registry that names and indexes modes.

use crate::{
    error::RegistryError,
    input::InputCmd,
    mode_data::ModeDataKind,
    settings::MovementSettings,
    sync_state::SyncState,
    transition::Transition,
    types::{ModeName, MovingBody, Quat, Vec3},
    world::SimWorld,
};

/// Time budget of one (sub-)step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStep {
    /// Simulation frame this step belongs to.
    pub frame: u64,
    pub step_ms: f32,
}

impl TimeStep {
    pub fn new(frame: u64, step_ms: f32) -> Self {
        Self { frame, step_ms }
    }

    #[inline]
    pub fn seconds(&self) -> f32 {
        self.step_ms / 1000.0
    }

    /// Same frame, smaller budget.
    pub fn with_budget(&self, step_ms: f32) -> Self {
        Self {
            frame: self.frame,
            step_ms,
        }
    }
}

/// Everything a mode or transition may read during a step.
#[derive(Clone, Copy)]
pub struct TickParams<'a> {
    pub input: &'a InputCmd,
    pub start: &'a SyncState,
    pub time_step: TimeStep,
    pub body: &'a MovingBody,
    pub world: &'a dyn SimWorld,
    pub settings: &'a MovementSettings,
    pub registry: &'a ModeRegistry,
}

/// Result of `generate_move`. Empty means "no request": the tick keeps its own momentum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProposedMove {
    pub linear_velocity: Option<Vec3>,
    pub facing: Option<Quat>,
}

/// How a mode's tick ended, and where leftover time should go.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementEndState {
    pub next_mode: Option<ModeName>,
    /// Unused part of the step budget, in milliseconds. Never negative.
    pub remaining_ms: f32,
}

impl MovementEndState {
    /// Stay in the current mode; the whole budget was used.
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn switch(next_mode: ModeName, remaining_ms: f32) -> Self {
        Self {
            next_mode: Some(next_mode),
            remaining_ms: remaining_ms.max(0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput {
    pub state: SyncState,
    pub end: MovementEndState,
}

/// A pluggable movement behaviour.
///
/// Implementations are stateless: everything that must survive a frame lives in the
/// [`SyncState`], either in its kinematic fields or in the mode's own data block.
pub trait MovementMode: Send + Sync {
    fn name(&self) -> ModeName;

    /// Airborne modes are the ones a line can be grabbed from.
    fn is_airborne(&self) -> bool {
        false
    }

    /// The data block this mode keeps while active. Removed when the mode is left.
    fn owned_data(&self) -> Option<ModeDataKind> {
        None
    }

    /// Transitions that can take the mover out of this mode, in evaluation order.
    fn transitions(&self) -> &[Box<dyn Transition>];

    /// Turn input into a proposal. Only called on the first sub-step of a frame.
    fn generate_move(&self, params: &TickParams) -> ProposedMove;

    /// Advance the start state by `params.time_step`.
    fn simulation_tick(&self, params: &TickParams, proposed: &ProposedMove) -> TickOutput;
}

/// Modes by name, plus the transitions that apply whatever mode is active.
///
/// Registration order defines each mode's wire index and must match on every peer.
#[derive(Default)]
pub struct ModeRegistry {
    modes: Vec<Box<dyn MovementMode>>,
    global_transitions: Vec<Box<dyn Transition>>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode and return its wire index.
    pub fn register(&mut self, mode: Box<dyn MovementMode>) -> Result<u8, RegistryError> {
        let name = mode.name();
        if self.contains(name) {
            return Err(RegistryError::DuplicateMode(name));
        }

        let index = u8::try_from(self.modes.len()).map_err(|_| RegistryError::TooManyModes {
            count: self.modes.len(),
        })?;

        self.modes.push(mode);
        Ok(index)
    }

    pub fn add_global_transition(&mut self, transition: Box<dyn Transition>) {
        self.global_transitions.push(transition);
    }

    /// Every mode named by `settings` must be registered.
    pub fn validate(&self, settings: &MovementSettings) -> Result<(), RegistryError> {
        for required in [
            settings.default_air_mode,
            settings.ground_mode,
            settings.path_follow_exit_mode,
        ] {
            if !self.contains(required) {
                return Err(RegistryError::MissingMode(required));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: ModeName) -> Option<&dyn MovementMode> {
        self.modes
            .iter()
            .find(|mode| mode.name() == name)
            .map(|mode| mode.as_ref())
    }

    pub fn contains(&self, name: ModeName) -> bool {
        self.get(name).is_some()
    }

    pub fn is_airborne(&self, name: ModeName) -> bool {
        self.get(name).is_some_and(|mode| mode.is_airborne())
    }

    pub fn index_of(&self, name: ModeName) -> Option<u8> {
        self.modes
            .iter()
            .position(|mode| mode.name() == name)
            .and_then(|index| u8::try_from(index).ok())
    }

    pub fn name_at(&self, index: u8) -> Option<ModeName> {
        self.modes.get(index as usize).map(|mode| mode.name())
    }

    pub fn global_transitions(&self) -> &[Box<dyn Transition>] {
        &self.global_transitions
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
