//! Canonical per-entity motion snapshot at a frame boundary.

use crate::{
    mode_data::ModeDataCollection,
    types::{ModeName, Quat, Vec3},
};

/// Thresholds under which predicted and authoritative kinematics count as equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconcileTolerance {
    /// Squared distance (world units^2).
    pub position_sq: f32,
    /// Squared speed difference.
    pub velocity_sq: f32,
    /// Radians.
    pub rotation: f32,
}

impl Default for ReconcileTolerance {
    fn default() -> Self {
        Self {
            position_sq: 1.0e-2,
            velocity_sq: 1.0e-2,
            rotation: 1.0e-3,
        }
    }
}

impl ReconcileTolerance {
    /// Any difference at all triggers a rollback.
    pub const EXACT: ReconcileTolerance = ReconcileTolerance {
        position_sq: 0.0,
        velocity_sq: 0.0,
        rotation: 0.0,
    };
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncState {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub mode: ModeName,
    pub mode_data: ModeDataCollection,
}

impl SyncState {
    pub fn new(position: Vec3, mode: ModeName) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            mode,
            mode_data: ModeDataCollection::default(),
        }
    }

    /// Whether `self` (a predicted state) diverged from `authority` enough to roll back.
    ///
    /// The active mode and every mode data block are compared exactly; kinematics use `tolerance`.
    pub fn should_reconcile(&self, authority: &SyncState, tolerance: &ReconcileTolerance) -> bool {
        if self.mode != authority.mode {
            return true;
        }

        if self.mode_data.should_reconcile(&authority.mode_data) {
            return true;
        }

        (self.position - authority.position).norm_squared() > tolerance.position_sq
            || (self.velocity - authority.velocity).norm_squared() > tolerance.velocity_sq
            || self.rotation.angle_to(&authority.rotation) > tolerance.rotation
    }

    /// Presentation blend between two snapshots. `pct` is clamped to [0, 1].
    ///
    /// Continuous fields blend; the active mode and mode data follow `to`.
    pub fn interpolate(from: &SyncState, to: &SyncState, pct: f32) -> SyncState {
        let t = if pct.is_nan() { 1.0 } else { pct.clamp(0.0, 1.0) };

        let rotation = from
            .rotation
            .try_slerp(&to.rotation, t, 1.0e-6)
            .unwrap_or(to.rotation);

        SyncState {
            position: from.position.lerp(&to.position, t),
            rotation,
            velocity: from.velocity.lerp(&to.velocity, t),
            mode: to.mode,
            mode_data: ModeDataCollection::interpolate(&from.mode_data, &to.mode_data, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mode_data::{ModeDataBlock, PathFollowState},
        types::EntityId,
    };

    fn on_line(line: u64) -> SyncState {
        let mut state = SyncState::new(Vec3::new(1.0, 2.0, 3.0), ModeName::PATH_FOLLOW);
        state
            .mode_data
            .insert(ModeDataBlock::PathFollow(PathFollowState::new(EntityId(line), true)));
        state
    }

    #[test]
    fn identical_states_do_not_reconcile() {
        let state = on_line(3);
        assert!(!state.should_reconcile(&state.clone(), &ReconcileTolerance::EXACT));
    }

    #[test]
    fn small_position_error_is_tolerated() {
        let predicted = on_line(3);
        let mut authority = predicted.clone();
        authority.position.x += 0.05;

        assert!(!predicted.should_reconcile(&authority, &ReconcileTolerance::default()));
        assert!(predicted.should_reconcile(&authority, &ReconcileTolerance::EXACT));
    }

    #[test]
    fn block_divergence_reconciles_even_with_matching_kinematics() {
        assert!(on_line(3).should_reconcile(&on_line(4), &ReconcileTolerance::default()));
    }

    #[test]
    fn mode_divergence_reconciles() {
        let predicted = SyncState::new(Vec3::zeros(), ModeName::WALKING);
        let authority = SyncState::new(Vec3::zeros(), ModeName::FALLING);
        assert!(predicted.should_reconcile(&authority, &ReconcileTolerance::default()));
    }

    #[test]
    fn interpolate_blends_kinematics_and_snaps_discrete_fields() {
        let from = SyncState::new(Vec3::zeros(), ModeName::FALLING);
        let mut to = on_line(9);
        to.position = Vec3::new(10.0, 0.0, 0.0);
        to.velocity = Vec3::new(0.0, 4.0, 0.0);

        let mid = SyncState::interpolate(&from, &to, 0.5);
        assert_eq!(mid.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(mid.velocity, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(mid.mode, ModeName::PATH_FOLLOW);
        assert_eq!(mid.mode_data, to.mode_data);

        let past_end = SyncState::interpolate(&from, &to, 3.0);
        assert_eq!(past_end.position, to.position);
    }
}
