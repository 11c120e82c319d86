/// PROPERTY-BASED TESTS: line traversal invariants
///
/// 1. Wherever a step starts, it ends on the closed segment.
/// 2. Latching picks the nearer endpoint as the start.
/// 3. Replaying the same inputs from the same state is bit-identical.
use mover_shared::{
    CapsuleSpec, EntityId, FIXED_STEP_MS, InputAction, InputCmd, KccSettings, LineDef,
    ModeDataBlock, ModeName, MoverWorld, MovementMode, MovementSettings, MovementStateMachine,
    MovingBody, PathFollowState, ProposedMove, SyncState, TickParams, TimeStep, Vec3,
    modes::PathFollowMode, utils::closest_point_on_segment,
};
use proptest::prelude::*;

const LINE: EntityId = EntityId(1000);

fn body() -> MovingBody {
    MovingBody::new(
        EntityId(1),
        CapsuleSpec {
            radius: 30.0,
            half_height: 60.0,
        },
    )
}

fn hang() -> Vec3 {
    Vec3::new(0.0, body().capsule.half_extent_y(), 0.0)
}

fn point() -> impl Strategy<Value = Vec3> {
    (-2000.0f32..2000.0, -2000.0f32..2000.0, -2000.0f32..2000.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn world_with_line(a: Vec3, b: Vec3) -> MoverWorld {
    let mut world = MoverWorld::new(Vec::new(), &KccSettings::default());
    world.set_line(LINE, LineDef::new(a, b, 10.0));
    world
}

fn tick(world: &MoverWorld, start: &SyncState, step_ms: f32, settings: &MovementSettings) -> SyncState {
    let machine = MovementStateMachine::standard(settings.clone()).unwrap();
    let input = InputCmd::default();
    let body = body();
    let params = TickParams {
        input: &input,
        start,
        time_step: TimeStep::new(0, step_ms),
        body: &body,
        world,
        settings,
        registry: machine.registry(),
    };
    PathFollowMode::new()
        .simulation_tick(&params, &ProposedMove::default())
        .state
}

fn distance_to_segment(p: &Vec3, a: &Vec3, b: &Vec3) -> f32 {
    (closest_point_on_segment(p, a, b) - p).norm()
}

proptest! {
    #[test]
    fn prop_step_ends_on_the_segment(
        a in point(),
        b in point(),
        from in point(),
        forward in any::<bool>(),
        speed in 0.0f32..5000.0,
        step_ms in 1.0f32..2000.0,
    ) {
        let world = world_with_line(a, b);
        let settings = MovementSettings {
            path_follow_max_speed: speed,
            ..MovementSettings::default()
        };
        let mut start = SyncState::new(from, ModeName::PATH_FOLLOW);
        start.mode_data.insert(ModeDataBlock::PathFollow(PathFollowState::new(LINE, forward)));

        let end = tick(&world, &start, step_ms, &settings);
        prop_assert!(distance_to_segment(&(end.position + hang()), &a, &b) < 0.05);
    }

    #[test]
    fn prop_latching_starts_from_the_nearer_end(
        a in point(),
        b in point(),
        t in 0.0f32..=1.0,
    ) {
        prop_assume!((a - b).norm() > 1.0);
        let world = world_with_line(a, b);
        let on_line = a + (b - a) * t;
        let start = SyncState::new(on_line - hang(), ModeName::PATH_FOLLOW);

        let end = tick(&world, &start, 1.0, &MovementSettings::default());
        let expected_forward =
            (a - start.position).norm_squared() <= (b - start.position).norm_squared();

        prop_assert_eq!(
            end.mode_data.path_follow(),
            Some(&PathFollowState::new(LINE, expected_forward))
        );
    }

    #[test]
    fn prop_replay_is_bit_identical(
        intents in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0, any::<bool>(), any::<bool>()), 1..40),
    ) {
        let machine = MovementStateMachine::standard(MovementSettings::default()).unwrap();
        let world = world_with_line(Vec3::new(-500.0, 0.0, 0.0), Vec3::new(1500.0, 0.0, 0.0));

        let run = || {
            let mut state = SyncState::new(Vec3::new(0.0, -80.0, 0.0), ModeName::FALLING);
            for (frame, (x, z, grab, jump)) in intents.iter().enumerate() {
                let mut input = InputCmd::with_intent(Vec3::new(*x, 0.0, *z));
                input.actions.set(InputAction::WantsPathFollow, *grab);
                input.actions.set(InputAction::JumpJustPressed, *jump);
                state = machine
                    .run_frame(&input, &state, TimeStep::new(frame as u64, FIXED_STEP_MS), &body(), &world)
                    .state;
            }
            state
        };

        let first = run();
        let second = run();
        prop_assert_eq!(first.position.map(f32::to_bits), second.position.map(f32::to_bits));
        prop_assert_eq!(first.velocity.map(f32::to_bits), second.velocity.map(f32::to_bits));
        prop_assert_eq!(first, second);
    }
}
