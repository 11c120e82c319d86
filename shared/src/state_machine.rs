//! One simulation frame for one mover.
//!
//! Per sub-step:
//! 1. evaluate the active mode's transitions, then the global ones; first match wins;
//! 2. apply a selected switch (trigger once, drop the exiting mode's data block);
//! 3. `generate_move` (first sub-step only);
//! 4. `simulation_tick`;
//! 5. follow `next_mode` and spend `remaining_ms` in another sub-step.
//!
//! A mode ticks at most once per frame. Requests that lead back into a mode that already
//! ticked are not honoured and their leftover time is dropped.

use crate::{
    error::RegistryError,
    input::InputCmd,
    mode::{MovementEndState, ModeRegistry, ProposedMove, TickParams, TimeStep},
    modes::{FallingMode, PathFollowMode, WalkingMode},
    settings::MovementSettings,
    sync_state::SyncState,
    transition::Transition,
    transitions::{StartPathFollow, SuggestedMode},
    types::{ModeName, MovingBody},
    world::SimWorld,
};

/// Record of one executed sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubStep {
    pub mode: ModeName,
    pub step_ms: f32,
    /// Name of the transition applied before this sub-step ticked, if any.
    pub transition: Option<&'static str>,
    pub end: MovementEndState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    pub state: SyncState,
    pub substeps: Vec<SubStep>,
}

pub struct MovementStateMachine {
    registry: ModeRegistry,
    settings: MovementSettings,
}

impl MovementStateMachine {
    pub fn new(registry: ModeRegistry, settings: MovementSettings) -> Result<Self, RegistryError> {
        registry.validate(&settings)?;
        Ok(Self { registry, settings })
    }

    /// Walking, Falling and PathFollow (in that wire order) with the StartPathFollow and
    /// SuggestedMode global transitions.
    pub fn standard(settings: MovementSettings) -> Result<Self, RegistryError> {
        let mut registry = ModeRegistry::new();
        registry.register(Box::new(WalkingMode::new()))?;
        registry.register(Box::new(FallingMode::new()))?;
        registry.register(Box::new(PathFollowMode::new()))?;
        registry.add_global_transition(Box::new(StartPathFollow));
        registry.add_global_transition(Box::new(SuggestedMode));

        Self::new(registry, settings)
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &MovementSettings {
        &self.settings
    }

    pub fn run_frame(
        &self,
        input: &InputCmd,
        previous: &SyncState,
        time_step: TimeStep,
        body: &MovingBody,
        world: &dyn SimWorld,
    ) -> FrameResult {
        let mut state = previous.clone();
        if !self.registry.contains(state.mode) {
            log::warn!(
                "{}: active mode {} is not registered, resetting to {}",
                body.entity,
                state.mode,
                self.settings.default_air_mode
            );
            state.mode_data = Default::default();
            state.mode = self.settings.default_air_mode;
        }

        let mut substeps: Vec<SubStep> = Vec::new();
        let mut ticked: Vec<ModeName> = Vec::new();
        let mut budget_ms = time_step.step_ms.max(0.0);

        while budget_ms > 0.0 && substeps.len() < self.registry.len() {
            let step = time_step.with_budget(budget_ms);

            let mut applied = None;
            if let Some((transition, target)) =
                self.select_transition(input, &state, step, body, world)
            {
                if ticked.contains(&target) {
                    log::debug!(
                        "{}: {} already ran this frame, ignoring {}",
                        body.entity,
                        target,
                        transition.name()
                    );
                } else {
                    let params = self.params(input, &state, step, body, world);
                    let mut next = state.clone();
                    transition.trigger(&params, &mut next);
                    self.switch_mode(&mut next, target, body);
                    state = next;
                    applied = Some(transition.name());
                }
            }

            if ticked.contains(&state.mode) {
                break;
            }

            let Some(mode) = self.registry.get(state.mode) else {
                break;
            };
            let params = self.params(input, &state, step, body, world);
            let proposed = if substeps.is_empty() {
                mode.generate_move(&params)
            } else {
                ProposedMove::default()
            };
            let output = mode.simulation_tick(&params, &proposed);

            ticked.push(state.mode);
            substeps.push(SubStep {
                mode: state.mode,
                step_ms: budget_ms,
                transition: applied,
                end: output.end,
            });

            state = output.state;
            budget_ms = output.end.remaining_ms.clamp(0.0, budget_ms);

            match output.end.next_mode {
                Some(next) if next != state.mode => {
                    if ticked.contains(&next) {
                        log::debug!(
                            "{}: {} already ran this frame, dropping {budget_ms}ms",
                            body.entity,
                            next
                        );
                        break;
                    }
                    if !self.registry.contains(next) {
                        log::warn!("{}: requested mode {} is not registered", body.entity, next);
                        break;
                    }
                    self.switch_mode(&mut state, next, body);
                }
                _ => break,
            }
        }

        FrameResult { state, substeps }
    }

    fn params<'a>(
        &'a self,
        input: &'a InputCmd,
        start: &'a SyncState,
        time_step: TimeStep,
        body: &'a MovingBody,
        world: &'a dyn SimWorld,
    ) -> TickParams<'a> {
        TickParams {
            input,
            start,
            time_step,
            body,
            world,
            settings: &self.settings,
            registry: &self.registry,
        }
    }

    /// Active mode's transitions first, then the global ones.
    fn select_transition(
        &self,
        input: &InputCmd,
        state: &SyncState,
        step: TimeStep,
        body: &MovingBody,
        world: &dyn SimWorld,
    ) -> Option<(&dyn Transition, ModeName)> {
        let params = self.params(input, state, step, body, world);
        let owned = self
            .registry
            .get(state.mode)
            .map(|mode| mode.transitions())
            .unwrap_or_default();

        owned
            .iter()
            .chain(self.registry.global_transitions())
            .find_map(|transition| {
                let target = transition.evaluate(&params).target()?;
                if target == state.mode {
                    return None;
                }
                if !self.registry.contains(target) {
                    log::warn!(
                        "{}: {} selected unregistered mode {}",
                        body.entity,
                        transition.name(),
                        target
                    );
                    return None;
                }
                Some((transition.as_ref(), target))
            })
    }

    fn switch_mode(&self, state: &mut SyncState, target: ModeName, body: &MovingBody) {
        if let Some(kind) = self
            .registry
            .get(state.mode)
            .and_then(|mode| mode.owned_data())
        {
            state.mode_data.remove(kind);
        }

        log::debug!("{}: {} -> {}", body.entity, state.mode, target);
        state.mode = target;
    }
}
