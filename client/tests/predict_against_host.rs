//! A predicting peer talking to an in-process host over a lagged in-memory link.

use mover_client::{ClientConfig, InputProducer, PredictedMover, ReconcileOutcome, SnapshotBuffer};
use mover_server::{AuthoritativeSnapshot, LevelDef, ServerConfig, ServerSim};
use mover_shared::{
    CapsuleSpec, EntityId, EntityNetMap, LineDef, ModeName, MoverWorld, MovingBody, NetIdTable,
    StatePacket, SyncState, Vec3, WorldStaticDef,
};
use std::collections::VecDeque;

const LINE: EntityId = EntityId(1);
const LAG_FRAMES: usize = 3;

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn capsule() -> CapsuleSpec {
    CapsuleSpec {
        radius: 30.0,
        half_height: 60.0,
    }
}

fn statics() -> Vec<WorldStaticDef> {
    vec![WorldStaticDef::ground(1, 0.0)]
}

fn line_at(y: f32) -> LineDef {
    LineDef::new(Vec3::new(0.0, y, 0.0), Vec3::new(1000.0, y, 0.0), 10.0)
}

struct Session {
    host: ServerSim,
    world: MoverWorld,
    ids: NetIdTable,
    rider: PredictedMover,
    producer: InputProducer,
    in_flight: VecDeque<Vec<AuthoritativeSnapshot>>,
}

impl Session {
    fn new() -> Self {
        let config = ClientConfig::default();
        let level = LevelDef {
            statics: statics(),
            lines: vec![line_at(400.0)],
        };
        let mut host = ServerSim::new(ServerConfig::default(), level).unwrap();
        let spawn = Vec3::new(0.0, 312.0, 0.0);
        let entity = host.spawn_mover(capsule(), spawn);

        let mut world = MoverWorld::new(statics(), &config.kcc);
        world.set_line(LINE, line_at(400.0));
        let mut ids = NetIdTable::new();
        for bound in [LINE, entity] {
            ids.bind(bound, host.net_ids().net_id(bound).unwrap());
        }

        let rider = PredictedMover::new(
            &config,
            MovingBody::new(entity, capsule()),
            ids.net_id(entity).unwrap(),
            SyncState::new(spawn, config.movement.default_air_mode),
            host.frame(),
        )
        .unwrap();

        Self {
            host,
            world,
            ids,
            rider,
            producer: InputProducer::new(config.orient_to_last_move),
            in_flight: VecDeque::new(),
        }
    }

    /// Predict one frame, let the host simulate it, and deliver whatever arrives this frame.
    fn step(&mut self) -> Vec<(u64, ReconcileOutcome)> {
        let packet = self.rider.predict(self.producer.produce(), &self.world);
        let bytes = packet.encode(self.rider.registry()).unwrap();
        let entity = self.rider.body().entity;
        self.host.receive_input_packet(entity, &bytes).unwrap();
        self.in_flight.push_back(self.host.tick().unwrap());

        if self.in_flight.len() <= LAG_FRAMES {
            return Vec::new();
        }
        let arrived = self.in_flight.pop_front().unwrap_or_default();
        arrived
            .into_iter()
            .filter(|snapshot| snapshot.entity == entity)
            .map(|snapshot| {
                let outcome = self
                    .rider
                    .on_state_packet(&snapshot.payload, &self.ids, &self.world)
                    .unwrap();
                (snapshot.frame, outcome)
            })
            .collect()
    }
}

#[test]
fn matching_worlds_confirm_every_frame() {
    init_logging();
    let mut session = Session::new();

    session.producer.set_wants_path_follow(true);
    let mut outcomes = session.step();
    session.producer.set_wants_path_follow(false);
    for _ in 1..20 {
        outcomes.extend(session.step());
    }

    assert_eq!(outcomes.len(), 20 - LAG_FRAMES);
    assert!(
        outcomes
            .iter()
            .all(|(_, outcome)| *outcome == ReconcileOutcome::Confirmed),
        "{outcomes:?}"
    );
    assert_eq!(session.rider.unconfirmed(), LAG_FRAMES);
    assert_eq!(session.rider.state().mode, ModeName::PATH_FOLLOW);
    assert_eq!(
        session.rider.state().mode_data.path_follow().map(|p| p.line),
        Some(LINE)
    );
}

#[test]
fn unseen_line_move_is_rolled_back() {
    init_logging();
    let mut session = Session::new();

    session.producer.set_wants_path_follow(true);
    session.step();
    session.producer.set_wants_path_follow(false);
    for _ in 1..10 {
        session.step();
    }

    // The host raises the line before simulating frame 10; the peer hears about it late.
    assert_eq!(session.host.frame(), 10);
    session.host.move_line(LINE, line_at(450.0)).unwrap();

    let mut outcomes = Vec::new();
    for frame in 10..20 {
        // The update travels with the snapshot for frame 10.
        if frame == 10 + LAG_FRAMES as u64 {
            session.world.set_line(LINE, line_at(450.0));
        }
        outcomes.extend(session.step());
    }

    let mispredicted: Vec<u64> = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, ReconcileOutcome::Resimulated { .. }))
        .map(|(frame, _)| *frame)
        .collect();
    assert_eq!(mispredicted, vec![10], "{outcomes:?}");
    assert!(
        outcomes
            .iter()
            .filter(|(frame, _)| *frame > 10)
            .all(|(_, outcome)| *outcome == ReconcileOutcome::Confirmed)
    );
    assert!(session.rider.state().position.y > 312.0);
}

#[test]
fn remote_mover_is_drawn_between_snapshots() {
    init_logging();
    let mut host = ServerSim::new(ServerConfig::default(), LevelDef {
        statics: statics(),
        lines: Vec::new(),
    })
    .unwrap();
    let walker = host.spawn_mover(capsule(), Vec3::new(0.0, 91.0, 0.0));
    let mut ids = NetIdTable::new();
    ids.bind(walker, host.net_ids().net_id(walker).unwrap());

    let mut buffer = SnapshotBuffer::new(16);
    for frame in 0..20 {
        host.receive_input(walker, frame, mover_shared::InputCmd::with_intent(Vec3::x()))
            .unwrap();
        for snapshot in host.tick().unwrap() {
            let packet = StatePacket::decode(&snapshot.payload, host.registry(), &ids).unwrap();
            assert!(buffer.push(packet.frame, packet.state));
        }
    }

    let newest = buffer.sample(19.0).unwrap().position.x;
    let delayed = buffer.sample_delayed(2.5).unwrap().position.x;
    let older = buffer.sample(16.0).unwrap().position.x;
    assert!(older < delayed && delayed < newest);
}
