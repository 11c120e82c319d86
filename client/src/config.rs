use mover_shared::{FIXED_STEP_MS, KccSettings, MovementSettings, ReconcileTolerance};

/// Peer configuration. `step_ms`, `movement` and `kcc` must match the host.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub step_ms: f32,
    pub movement: MovementSettings,
    pub kcc: KccSettings,
    /// Unconfirmed predicted frames kept for resimulation.
    pub history_len: usize,
    pub tolerance: ReconcileTolerance,
    /// How far behind the newest snapshot remote movers are rendered, in frames.
    pub interpolation_delay: f64,
    /// Exponential decay rate of the visual translation correction (1/s).
    pub translation_decay: f32,
    /// Exponential decay rate of the visual rotation correction (1/s).
    pub rotation_decay: f32,
    /// Keep facing the last direction the player moved in once input stops.
    pub orient_to_last_move: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            step_ms: FIXED_STEP_MS,
            movement: MovementSettings::default(),
            kcc: KccSettings::default(),
            history_len: 64,
            tolerance: ReconcileTolerance::default(),
            interpolation_delay: 2.0,
            translation_decay: 12.0,
            rotation_decay: 24.0,
            orient_to_last_move: true,
        }
    }
}
