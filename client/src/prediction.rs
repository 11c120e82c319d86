//! Local prediction of the controlled mover, with rollback on authoritative mismatch.
//!
//! Every predicted frame is stored together with the input that produced it until the host
//! confirms it. When the host's state for frame `N` disagrees with ours, frame `N` is replaced
//! by the authoritative state and every later stored frame is simulated again from its input.

use crate::{config::ClientConfig, error::ClientError};
use mover_shared::{
    EntityNetMap, InputCmd, InputPacket, ModeRegistry, MovementStateMachine, MovingBody, NetId,
    ReconcileTolerance, SimWorld, StatePacket, SyncState, TimeStep,
};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
struct PredictedFrame {
    frame: u64,
    input: InputCmd,
    state: SyncState,
}

/// What happened to a received authoritative state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Prediction matched within tolerance.
    Confirmed,
    /// Prediction diverged; the authoritative state was adopted and `frames` later frames
    /// were simulated again.
    Resimulated { frames: usize },
    /// The host is ahead of every predicted frame; its state replaces ours outright.
    Adopted,
    /// Older than anything still awaiting confirmation.
    Stale,
}

pub struct PredictedMover {
    machine: MovementStateMachine,
    body: MovingBody,
    net_id: NetId,
    step_ms: f32,
    tolerance: ReconcileTolerance,
    capacity: usize,
    history: VecDeque<PredictedFrame>,
    state: SyncState,
    next_frame: u64,
}

impl PredictedMover {
    /// Start predicting from a state the host produced for `frame - 1` (or spawned at `frame`).
    pub fn new(
        config: &ClientConfig,
        body: MovingBody,
        net_id: NetId,
        state: SyncState,
        frame: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            machine: MovementStateMachine::standard(config.movement.clone())?,
            body,
            net_id,
            step_ms: config.step_ms,
            tolerance: config.tolerance,
            capacity: config.history_len.max(1),
            history: VecDeque::with_capacity(config.history_len),
            state,
            next_frame: frame,
        })
    }

    /// Simulate the next frame locally. Returns the packet to send to the host.
    pub fn predict(&mut self, input: InputCmd, world: &dyn SimWorld) -> InputPacket {
        let frame = self.next_frame;
        let result = self.machine.run_frame(
            &input,
            &self.state,
            TimeStep::new(frame, self.step_ms),
            &self.body,
            world,
        );
        self.state = result.state;
        self.next_frame += 1;

        if self.history.len() == self.capacity {
            if let Some(dropped) = self.history.pop_front() {
                log::warn!(
                    "{}: prediction history full, frame {} will never be reconciled",
                    self.body.entity,
                    dropped.frame
                );
            }
        }
        self.history.push_back(PredictedFrame {
            frame,
            input: input.clone(),
            state: self.state.clone(),
        });

        InputPacket { frame, cmd: input }
    }

    pub fn on_authoritative(
        &mut self,
        frame: u64,
        authoritative: SyncState,
        world: &dyn SimWorld,
    ) -> ReconcileOutcome {
        if frame >= self.next_frame {
            log::debug!(
                "{}: host is at frame {frame}, ahead of prediction at {}",
                self.body.entity,
                self.next_frame
            );
            self.history.clear();
            self.state = authoritative;
            self.next_frame = frame + 1;
            return ReconcileOutcome::Adopted;
        }

        let Some(index) = self.history.iter().position(|p| p.frame == frame) else {
            return ReconcileOutcome::Stale;
        };

        let predicted_mode = self.history[index].state.mode;
        let diverged = self.history[index]
            .state
            .should_reconcile(&authoritative, &self.tolerance);
        // Everything up to and including `frame` is settled either way.
        self.history.drain(..=index);
        if !diverged {
            return ReconcileOutcome::Confirmed;
        }

        log::debug!(
            "{}: mispredicted frame {frame} ({predicted_mode} vs {}), resimulating {} frames",
            self.body.entity,
            authoritative.mode,
            self.history.len()
        );

        let mut state = authoritative;
        for predicted in self.history.iter_mut() {
            state = self
                .machine
                .run_frame(
                    &predicted.input,
                    &state,
                    TimeStep::new(predicted.frame, self.step_ms),
                    &self.body,
                    world,
                )
                .state;
            predicted.state = state.clone();
        }
        self.state = state;

        ReconcileOutcome::Resimulated {
            frames: self.history.len(),
        }
    }

    /// Decode a host state packet addressed to this mover and reconcile against it.
    pub fn on_state_packet(
        &mut self,
        bytes: &[u8],
        net: &dyn EntityNetMap,
        world: &dyn SimWorld,
    ) -> Result<ReconcileOutcome, ClientError> {
        let packet = StatePacket::decode(bytes, self.machine.registry(), net)?;
        if packet.net_id != self.net_id {
            return Err(ClientError::ForeignPacket(packet.net_id));
        }
        Ok(self.on_authoritative(packet.frame, packet.state, world))
    }

    /// Latest predicted state, for rendering.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// The frame the next `predict` will simulate.
    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    /// Number of predicted frames awaiting confirmation.
    pub fn unconfirmed(&self) -> usize {
        self.history.len()
    }

    pub fn registry(&self) -> &ModeRegistry {
        self.machine.registry()
    }

    pub fn body(&self) -> &MovingBody {
        &self.body
    }
}
