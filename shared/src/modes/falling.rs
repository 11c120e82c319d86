use super::{requested_facing, requested_planar_velocity};
use crate::{
    mode::{MovementEndState, MovementMode, ProposedMove, TickOutput, TickParams},
    transition::Transition,
    types::{ModeName, Vec3},
};

/// Default airborne mode: ballistic vertical motion with limited planar air control.
#[derive(Default)]
pub struct FallingMode {
    transitions: Vec<Box<dyn Transition>>,
}

impl FallingMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementMode for FallingMode {
    fn name(&self) -> ModeName {
        ModeName::FALLING
    }

    fn is_airborne(&self) -> bool {
        true
    }

    fn transitions(&self) -> &[Box<dyn Transition>] {
        &self.transitions
    }

    fn generate_move(&self, params: &TickParams) -> ProposedMove {
        let planar = requested_planar_velocity(params.input, params.settings);
        ProposedMove {
            linear_velocity: Some(planar * params.settings.air_control),
            facing: requested_facing(params.input, &planar),
        }
    }

    fn simulation_tick(&self, params: &TickParams, proposed: &ProposedMove) -> TickOutput {
        let settings = params.settings;
        let start = params.start;
        let dt = params.time_step.seconds();
        let mut state = start.clone();
        let rotation = proposed.facing.unwrap_or(start.rotation);
        state.rotation = rotation;

        if dt <= 0.0 {
            return TickOutput {
                state,
                end: MovementEndState::stay(),
            };
        }

        let mut velocity = start.velocity;
        if let Some(target) = proposed.linear_velocity {
            let alpha = (settings.air_control_response * dt).min(1.0);
            velocity.x += (target.x - velocity.x) * alpha;
            velocity.z += (target.z - velocity.z) * alpha;
        }
        velocity.y = (velocity.y - settings.gravity * dt).max(settings.terminal_fall_speed);

        let moved = params
            .world
            .safe_move(params.body, &start.position, &rotation, &(velocity * dt), dt);
        state.position = moved.end_position;

        if moved.grounded && velocity.y <= 0.0 {
            state.velocity = Vec3::new(velocity.x, 0.0, velocity.z);
            log::debug!("{}: landed", params.body.entity);
            return TickOutput {
                state,
                end: MovementEndState::switch(settings.ground_mode, 0.0),
            };
        }

        // Ceilings and walls eat the blocked part of the velocity.
        state.velocity = if moved.blocked {
            (moved.end_position - start.position) / dt
        } else {
            velocity
        };

        TickOutput {
            state,
            end: MovementEndState::stay(),
        }
    }
}
