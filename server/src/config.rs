use mover_shared::{FIXED_STEP_MS, KccSettings, MovementSettings};

/// Host configuration. Movement and controller settings must match what peers use.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Length of one simulation frame.
    pub step_ms: f32,
    /// Inputs more than this many frames ahead of the host are rejected.
    pub max_input_lead: u64,
    pub movement: MovementSettings,
    pub kcc: KccSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            step_ms: FIXED_STEP_MS,
            max_input_lead: 32,
            movement: MovementSettings::default(),
            kcc: KccSettings::default(),
        }
    }
}
