//! Presentation smoothing. Nothing here feeds back into simulation.
//!
//! Remote movers are drawn a little in the past, blended between the two host snapshots that
//! bracket the render time. The local mover is drawn at its predicted state plus a visual
//! offset that absorbs reconcile snaps and decays away exponentially.

use mover_shared::{Quat, SyncState, Vec3};
use nalgebra::UnitQuaternion;
use std::collections::VecDeque;

/// Host snapshots of one remote mover, ordered by frame.
#[derive(Clone, Debug)]
pub struct SnapshotBuffer {
    snapshots: VecDeque<(u64, SyncState)>,
    capacity: usize,
}

impl SnapshotBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity: capacity.max(2),
        }
    }

    /// Record a snapshot. Returns false for duplicates and anything older than the newest.
    pub fn push(&mut self, frame: u64, state: SyncState) -> bool {
        if self.newest_frame().is_some_and(|newest| frame <= newest) {
            return false;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back((frame, state));
        true
    }

    pub fn newest_frame(&self) -> Option<u64> {
        self.snapshots.back().map(|(frame, _)| *frame)
    }

    /// State at fractional frame `at`. Clamps to the oldest or newest snapshot outside the
    /// buffered range; remote movers are never extrapolated.
    pub fn sample(&self, at: f64) -> Option<SyncState> {
        let (first_frame, first) = self.snapshots.front()?;
        if at <= *first_frame as f64 {
            return Some(first.clone());
        }

        for pair in self.snapshots.iter().zip(self.snapshots.iter().skip(1)) {
            let ((from_frame, from), (to_frame, to)) = pair;
            let (from_t, to_t) = (*from_frame as f64, *to_frame as f64);
            if at <= to_t {
                let pct = ((at - from_t) / (to_t - from_t)) as f32;
                return Some(SyncState::interpolate(from, to, pct));
            }
        }

        self.snapshots.back().map(|(_, state)| state.clone())
    }

    /// Sample `delay` frames behind the newest snapshot.
    pub fn sample_delayed(&self, delay: f64) -> Option<SyncState> {
        let newest = self.newest_frame()?;
        self.sample(newest as f64 - delay)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Visual offset between where the local mover was drawn and where simulation says it is.
#[derive(Clone, Debug)]
pub struct CorrectionSmoother {
    translation: Vec3,
    rotation: Quat,
    translation_decay: f32,
    rotation_decay: f32,
}

impl CorrectionSmoother {
    pub fn new(translation_decay: f32, rotation_decay: f32) -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: UnitQuaternion::identity(),
            translation_decay,
            rotation_decay,
        }
    }

    /// Absorb a jump in simulated state so the rendered pose does not move this frame.
    pub fn absorb(&mut self, before: &SyncState, after: &SyncState) {
        let (drawn_position, drawn_rotation) = self.apply(before);
        self.translation = drawn_position - after.position;
        self.rotation = drawn_rotation * after.rotation.inverse();
    }

    /// Decay the offset toward zero over `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.translation *= (-self.translation_decay * dt).exp();
        self.rotation = self
            .rotation
            .slerp(&UnitQuaternion::identity(), 1.0 - (-self.rotation_decay * dt).exp());
    }

    /// Pose to draw for `state`.
    pub fn apply(&self, state: &SyncState) -> (Vec3, Quat) {
        (state.position + self.translation, self.rotation * state.rotation)
    }

    pub fn is_settled(&self) -> bool {
        self.translation.norm() < 1.0e-3 && self.rotation.angle() < 1.0e-4
    }
}
