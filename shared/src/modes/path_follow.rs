//! Traversal along a line entity at constant speed.
//!
//! The mover hangs below the line: its capsule centre sits half the capsule height under the
//! point it has reached on the segment. Kinematics are closed-form; the only collision query
//! is the safe move of each step's displacement.

use crate::{
    mode::{MovementEndState, MovementMode, ProposedMove, TickOutput, TickParams},
    mode_data::{ModeDataBlock, ModeDataKind, PathFollowState},
    sync_state::SyncState,
    transition::Transition,
    transitions::EndPathFollow,
    types::{EntityId, ModeName, Vec3},
    utils::{
        a_is_nearer, closest_point_on_segment, facing_from_direction, is_nearly_zero,
        project_on_plane, safe_normal, up,
    },
    world::LineEndpoints,
};

pub struct PathFollowMode {
    transitions: Vec<Box<dyn Transition>>,
}

impl Default for PathFollowMode {
    fn default() -> Self {
        Self {
            transitions: vec![Box::new(EndPathFollow)],
        }
    }
}

impl PathFollowMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The line being followed this step, oriented in travel direction.
struct Traversal {
    line: EntityId,
    moving_forward: bool,
    start: Vec3,
    end: Vec3,
}

impl Traversal {
    fn new(line: EntityId, moving_forward: bool, ends: LineEndpoints) -> Self {
        let (start, end) = if moving_forward {
            (ends.a, ends.b)
        } else {
            (ends.b, ends.a)
        };
        Self {
            line,
            moving_forward,
            start,
            end,
        }
    }
}

impl MovementMode for PathFollowMode {
    fn name(&self) -> ModeName {
        ModeName::PATH_FOLLOW
    }

    fn owned_data(&self) -> Option<ModeDataKind> {
        Some(ModeDataKind::PathFollow)
    }

    fn transitions(&self) -> &[Box<dyn Transition>] {
        &self.transitions
    }

    fn generate_move(&self, _params: &TickParams) -> ProposedMove {
        ProposedMove::default()
    }

    fn simulation_tick(&self, params: &TickParams, _proposed: &ProposedMove) -> TickOutput {
        let start_state = params.start;
        let fallback = params.settings.default_air_mode;
        let step_ms = params.time_step.step_ms;

        let (traversal, fresh) = match start_state.mode_data.path_follow() {
            Some(current) => match params.world.line_endpoints(current.line) {
                Some(ends) => (Traversal::new(current.line, current.moving_forward, ends), false),
                None => {
                    log::warn!(
                        "{}: followed line {} no longer resolves, dropping to {}",
                        params.body.entity,
                        current.line,
                        fallback
                    );
                    let mut state = start_state.clone();
                    state.mode_data.remove(ModeDataKind::PathFollow);
                    return TickOutput {
                        state,
                        end: MovementEndState::switch(fallback, step_ms),
                    };
                }
            },
            None => match params
                .world
                .first_overlapping_line(params.body, &start_state.position)
            {
                Some((line, ends)) => {
                    let moving_forward = a_is_nearer(&start_state.position, &ends.a, &ends.b);
                    (Traversal::new(line, moving_forward, ends), true)
                }
                None => {
                    log::debug!(
                        "{}: no line to follow, handing {step_ms}ms to {}",
                        params.body.entity,
                        fallback
                    );
                    return TickOutput {
                        state: start_state.clone(),
                        end: MovementEndState::switch(fallback, step_ms),
                    };
                }
            },
        };

        let direction = safe_normal(&(traversal.end - traversal.start));
        let flat = project_on_plane(&direction, &up());
        let facing = facing_from_direction(&flat).unwrap_or(start_state.rotation);
        let offset = up() * params.body.capsule.half_extent_y();

        let mut state: SyncState = start_state.clone();
        if fresh {
            // Latch on: placed directly, no sweep.
            state.position = traversal.start - offset;
            log::debug!(
                "{}: latched onto line {} (forward: {})",
                params.body.entity,
                traversal.line,
                traversal.moving_forward
            );
        }

        let dt = params.time_step.seconds();
        let step_start = state.position + offset;
        let desired_end = step_start + direction * params.settings.path_follow_max_speed * dt;
        let actual_end = closest_point_on_segment(&desired_end, &traversal.start, &traversal.end);
        let reached_end = is_nearly_zero(&(actual_end - traversal.end));
        let delta = actual_end - step_start;

        state.velocity = Vec3::zeros();
        if dt > 0.0 && !is_nearly_zero(&delta) {
            let moved = params
                .world
                .safe_move(params.body, &state.position, &facing, &delta, dt);
            state.velocity = (moved.end_position - state.position) / dt;
            state.position = moved.end_position;
        }
        state.rotation = facing;
        state.mode_data.insert(ModeDataBlock::PathFollow(PathFollowState::new(
            traversal.line,
            traversal.moving_forward,
        )));

        let end = if reached_end {
            log::debug!(
                "{}: reached the end of line {}",
                params.body.entity,
                traversal.line
            );
            // The step is considered consumed; the next mode starts on the next frame.
            MovementEndState::switch(fallback, 0.0)
        } else {
            MovementEndState::stay()
        };

        TickOutput { state, end }
    }
}
