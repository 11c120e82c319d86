//! Authoritative fixed-step simulation of every mover.
//!
//! Each call to [`ServerSim::tick`] advances frame `N` for all movers in ascending entity
//! order, consuming the input each peer sent for frame `N`. A mover whose input has not
//! arrived reuses the carried-over form of its last input, so one-shot actions never repeat.

use crate::{
    config::ServerConfig,
    error::ServerError,
    world::{LevelDef, build_world, is_valid_line},
};
use mover_shared::{
    CapsuleSpec, EntityId, EntityNetMap, InputCmd, InputPacket, LineDef, ModeRegistry, MoverWorld,
    MovementStateMachine, MovingBody, NetId, NetIdTable, StatePacket, SyncState, TimeStep, Vec3,
};
use std::collections::BTreeMap;

struct Mover {
    body: MovingBody,
    state: SyncState,
    /// Inputs received for the current and future frames.
    pending: BTreeMap<u64, InputCmd>,
    last_input: InputCmd,
}

/// One mover's authoritative result for a frame, ready to send.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthoritativeSnapshot {
    pub entity: EntityId,
    pub frame: u64,
    pub payload: Vec<u8>,
}

pub struct ServerSim {
    config: ServerConfig,
    machine: MovementStateMachine,
    world: MoverWorld,
    net_ids: NetIdTable,
    movers: BTreeMap<EntityId, Mover>,
    frame: u64,
    next_entity: u64,
}

impl ServerSim {
    pub fn new(config: ServerConfig, level: LevelDef) -> Result<Self, ServerError> {
        let machine = MovementStateMachine::standard(config.movement.clone())?;
        Self::with_machine(config, machine, level)
    }

    /// Host a level with a machine carrying extra modes or transitions.
    pub fn with_machine(
        config: ServerConfig,
        machine: MovementStateMachine,
        level: LevelDef,
    ) -> Result<Self, ServerError> {
        let world = build_world(level.statics, &config.kcc);

        let mut sim = Self {
            config,
            machine,
            world,
            net_ids: NetIdTable::new(),
            movers: BTreeMap::new(),
            frame: 0,
            next_entity: 1,
        };
        for line in level.lines {
            sim.spawn_line(line)?;
        }
        Ok(sim)
    }

    fn allocate(&mut self) -> (EntityId, NetId) {
        let entity = EntityId(self.next_entity);
        self.next_entity += 1;
        (entity, self.net_ids.assign(entity))
    }

    /// Spawn a mover in the default airborne mode; it lands on its own if spawned on ground.
    pub fn spawn_mover(&mut self, capsule: CapsuleSpec, position: Vec3) -> EntityId {
        let (entity, net_id) = self.allocate();
        let body = MovingBody::new(entity, capsule);
        let state = SyncState::new(position, self.config.movement.default_air_mode);

        self.world.set_mover(&body, position);
        self.movers.insert(
            entity,
            Mover {
                body,
                state,
                pending: BTreeMap::new(),
                last_input: InputCmd::default(),
            },
        );
        log::info!("Spawned mover {entity} ({net_id}) at {position:?}");
        entity
    }

    pub fn spawn_line(&mut self, line: LineDef) -> Result<EntityId, ServerError> {
        if !is_valid_line(&line) {
            return Err(ServerError::InvalidLine);
        }
        let (entity, net_id) = self.allocate();
        self.world.set_line(entity, line);
        log::info!("Spawned line {entity} ({net_id})");
        Ok(entity)
    }

    /// Move a line's endpoints. Movers on it follow the new geometry next frame.
    pub fn move_line(&mut self, entity: EntityId, line: LineDef) -> Result<(), ServerError> {
        if self.world.line(entity).is_none() {
            return Err(ServerError::UnknownLine(entity));
        }
        if !is_valid_line(&line) {
            return Err(ServerError::InvalidLine);
        }
        self.world.set_line(entity, line);
        Ok(())
    }

    /// Remove a line or mover. Movers following a removed line drop off on their next frame.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), ServerError> {
        if self.world.remove_line(entity).is_some() {
            self.net_ids.release(entity);
            log::info!("Despawned line {entity}");
            return Ok(());
        }
        if self.movers.remove(&entity).is_some() {
            self.world.remove_mover(entity);
            self.net_ids.release(entity);
            log::info!("Despawned mover {entity}");
            return Ok(());
        }
        Err(ServerError::UnknownMover(entity))
    }

    pub fn receive_input(
        &mut self,
        entity: EntityId,
        frame: u64,
        input: InputCmd,
    ) -> Result<(), ServerError> {
        let current = self.frame;
        let lead = self.config.max_input_lead;
        let Some(mover) = self.movers.get_mut(&entity) else {
            return Err(ServerError::UnknownMover(entity));
        };

        if frame < current {
            log::warn!("Dropping stale input for {entity}: frame {frame} < {current}");
            return Err(ServerError::StaleInput {
                entity,
                frame,
                current,
            });
        }
        if frame > current + lead {
            return Err(ServerError::InputTooFarAhead {
                entity,
                frame,
                current,
            });
        }

        mover.pending.insert(frame, input);
        Ok(())
    }

    /// Decode and queue an input packet sent by the peer controlling `entity`.
    pub fn receive_input_packet(&mut self, entity: EntityId, bytes: &[u8]) -> Result<(), ServerError> {
        let packet = InputPacket::decode(bytes, self.machine.registry())?;
        self.receive_input(entity, packet.frame, packet.cmd)
    }

    /// Advance every mover by one frame and return their encoded authoritative states.
    pub fn tick(&mut self) -> Result<Vec<AuthoritativeSnapshot>, ServerError> {
        let frame = self.frame;
        let time_step = TimeStep::new(frame, self.config.step_ms);

        for (entity, mover) in self.movers.iter_mut() {
            let input = match mover.pending.remove(&frame) {
                Some(input) => input,
                None => {
                    log::debug!("No input from {entity} for frame {frame}, carrying over");
                    mover.last_input.carried_over()
                }
            };

            let result = self
                .machine
                .run_frame(&input, &mover.state, time_step, &mover.body, &self.world);
            mover.state = result.state;
            mover.last_input = input;
            self.world.set_mover(&mover.body, mover.state.position);
        }
        self.frame += 1;

        // Every mover has taken frame N; a bad snapshot must not leave some of them behind.
        let mut snapshots = Vec::with_capacity(self.movers.len());
        let mut first_error = None;
        for (entity, mover) in &self.movers {
            let Some(net_id) = self.net_ids.net_id(*entity) else {
                log::error!("Mover {entity} has no net id");
                continue;
            };
            let packet = StatePacket {
                frame,
                net_id,
                state: mover.state.clone(),
            };
            match packet.encode(self.machine.registry(), &self.net_ids) {
                Ok(payload) => snapshots.push(AuthoritativeSnapshot {
                    entity: *entity,
                    frame,
                    payload,
                }),
                Err(err) => {
                    log::error!("Snapshot of {entity} for frame {frame} failed to encode: {err}");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(snapshots),
        }
    }

    /// The frame the next `tick` will simulate.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn state(&self, entity: EntityId) -> Option<&SyncState> {
        self.movers.get(&entity).map(|mover| &mover.state)
    }

    pub fn net_ids(&self) -> &NetIdTable {
        &self.net_ids
    }

    pub fn registry(&self) -> &ModeRegistry {
        self.machine.registry()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
