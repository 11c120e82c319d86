use crate::{
    mode::TickParams,
    sync_state::SyncState,
    transition::{Transition, TransitionEvalResult},
    types::Vec3,
    utils::up,
};

/// Let go of the line when jump goes down.
///
/// The trigger gives a small hop: an upward kick plus part of the traversal speed along the
/// current facing.
pub struct EndPathFollow;

impl Transition for EndPathFollow {
    fn name(&self) -> &'static str {
        "EndPathFollow"
    }

    fn evaluate(&self, params: &TickParams) -> TransitionEvalResult {
        if params.input.jump_just_pressed() {
            TransitionEvalResult::Switch(params.settings.path_follow_exit_mode)
        } else {
            TransitionEvalResult::None
        }
    }

    fn trigger(&self, params: &TickParams, state: &mut SyncState) {
        let settings = params.settings;
        let forward = state.rotation * Vec3::new(0.0, 0.0, -1.0);
        let carry = settings.path_follow_max_speed * settings.path_follow_exit_carry;

        state.velocity = forward * carry + up() * settings.path_follow_exit_up_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{InputAction, InputCmd},
        mode::{ModeRegistry, TimeStep},
        settings::{KccSettings, MovementSettings},
        types::{CapsuleSpec, EntityId, ModeName, MovingBody},
        utils::facing_from_direction,
        world::MoverWorld,
    };

    fn with_params<R>(input: &InputCmd, start: &SyncState, f: impl FnOnce(&TickParams) -> R) -> R {
        let world = MoverWorld::new(Vec::new(), &KccSettings::default());
        let body = MovingBody::new(
            EntityId(1),
            CapsuleSpec {
                radius: 30.0,
                half_height: 60.0,
            },
        );
        let settings = MovementSettings::default();
        let registry = ModeRegistry::new();
        let params = TickParams {
            input,
            start,
            time_step: TimeStep::new(0, 33.0),
            body: &body,
            world: &world,
            settings: &settings,
            registry: &registry,
        };
        f(&params)
    }

    #[test]
    fn only_the_jump_edge_lets_go() {
        let start = SyncState::new(Vec3::zeros(), ModeName::PATH_FOLLOW);

        let held = InputCmd::default().with_action(InputAction::JumpPressed);
        assert_eq!(
            with_params(&held, &start, |p| EndPathFollow.evaluate(p)),
            TransitionEvalResult::None
        );

        let pressed = held.with_action(InputAction::JumpJustPressed);
        assert_eq!(
            with_params(&pressed, &start, |p| EndPathFollow.evaluate(p)),
            TransitionEvalResult::Switch(ModeName::FALLING)
        );
    }

    #[test]
    fn trigger_hops_up_and_forward() {
        let mut start = SyncState::new(Vec3::zeros(), ModeName::PATH_FOLLOW);
        start.rotation = facing_from_direction(&Vec3::new(1.0, 0.0, 0.0)).unwrap();
        start.velocity = Vec3::new(1000.0, 0.0, 0.0);

        let mut state = start.clone();
        with_params(&InputCmd::default(), &start, |p| EndPathFollow.trigger(p, &mut state));

        let settings = MovementSettings::default();
        assert!((state.velocity.y - settings.path_follow_exit_up_speed).abs() < 1.0e-3);
        assert!((state.velocity.x - 250.0).abs() < 1.0e-2);
        assert!(state.velocity.z.abs() < 1.0e-2);
    }
}
