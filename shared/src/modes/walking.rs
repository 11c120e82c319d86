use super::{requested_facing, requested_planar_velocity};
use crate::{
    mode::{MovementEndState, MovementMode, ProposedMove, TickOutput, TickParams},
    transition::Transition,
    transitions::Jump,
    types::{ModeName, Vec3},
};

/// Ground locomotion: planar velocity straight from input, swept with a slight downward bias
/// so the controller keeps contact on slopes and steps.
pub struct WalkingMode {
    transitions: Vec<Box<dyn Transition>>,
}

impl Default for WalkingMode {
    fn default() -> Self {
        Self {
            transitions: vec![Box::new(Jump)],
        }
    }
}

impl WalkingMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementMode for WalkingMode {
    fn name(&self) -> ModeName {
        ModeName::WALKING
    }

    fn transitions(&self) -> &[Box<dyn Transition>] {
        &self.transitions
    }

    fn generate_move(&self, params: &TickParams) -> ProposedMove {
        let planar = requested_planar_velocity(params.input, params.settings);
        ProposedMove {
            linear_velocity: Some(planar),
            facing: requested_facing(params.input, &planar),
        }
    }

    fn simulation_tick(&self, params: &TickParams, proposed: &ProposedMove) -> TickOutput {
        let start = params.start;
        let dt = params.time_step.seconds();
        let mut state = start.clone();

        // Sub-steps get no proposal and keep the planar velocity they arrived with.
        let planar = proposed
            .linear_velocity
            .map(|v| Vec3::new(v.x, 0.0, v.z))
            .unwrap_or_else(|| Vec3::new(start.velocity.x, 0.0, start.velocity.z));
        let rotation = proposed.facing.unwrap_or(start.rotation);
        state.rotation = rotation;

        if dt <= 0.0 {
            return TickOutput {
                state,
                end: MovementEndState::stay(),
            };
        }

        let biased = Vec3::new(planar.x, params.settings.ground_bias_speed, planar.z);
        let moved = params
            .world
            .safe_move(params.body, &start.position, &rotation, &(biased * dt), dt);

        let achieved = (moved.end_position - start.position) / dt;
        state.position = moved.end_position;
        state.velocity = Vec3::new(achieved.x, 0.0, achieved.z);

        let end = if moved.grounded {
            MovementEndState::stay()
        } else {
            log::debug!("{}: lost ground support", params.body.entity);
            MovementEndState::switch(params.settings.default_air_mode, 0.0)
        };

        TickOutput { state, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::InputCmd,
        mode::{ModeRegistry, TimeStep},
        rapier_world::WorldStaticDef,
        settings::{KccSettings, MovementSettings},
        sync_state::SyncState,
        types::{CapsuleSpec, EntityId, MovingBody},
        world::MoverWorld,
    };

    fn body() -> MovingBody {
        MovingBody::new(
            EntityId(1),
            CapsuleSpec {
                radius: 30.0,
                half_height: 60.0,
            },
        )
    }

    fn run(world: &MoverWorld, start: &SyncState, input: &InputCmd) -> TickOutput {
        let settings = MovementSettings::default();
        let registry = ModeRegistry::new();
        let body = body();
        let params = TickParams {
            input,
            start,
            time_step: TimeStep::new(0, 100.0),
            body: &body,
            world,
            settings: &settings,
            registry: &registry,
        };
        let mode = WalkingMode::new();
        let proposed = mode.generate_move(&params);
        mode.simulation_tick(&params, &proposed)
    }

    #[test]
    fn walks_along_intent_on_flat_ground() {
        let world = MoverWorld::new(vec![WorldStaticDef::ground(1, 0.0)], &KccSettings::default());
        let start = SyncState::new(Vec3::new(0.0, 92.0, 0.0), ModeName::WALKING);

        let out = run(&world, &start, &InputCmd::with_intent(Vec3::new(1.0, 0.0, 0.0)));
        assert!(out.state.position.x > 50.0);
        assert!(out.state.velocity.y == 0.0);
        assert_eq!(out.end.next_mode, None);
    }

    #[test]
    fn walking_off_into_nothing_starts_falling() {
        let world = MoverWorld::new(Vec::new(), &KccSettings::default());
        let start = SyncState::new(Vec3::new(0.0, 500.0, 0.0), ModeName::WALKING);

        let out = run(&world, &start, &InputCmd::default());
        assert_eq!(out.end.next_mode, Some(ModeName::FALLING));
        assert_eq!(out.end.remaining_ms, 0.0);
    }
}
