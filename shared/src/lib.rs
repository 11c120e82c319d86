pub mod bitmask_flags;
pub mod constants;
pub mod error;
pub mod input;
pub mod mode;
pub mod mode_data;
pub mod modes;
pub mod net;
pub mod rapier_world;
pub mod settings;
pub mod state_machine;
pub mod sync_state;
pub mod transition;
pub mod transitions;
pub mod types;
pub mod utils;
pub mod world;

pub use constants::{FIXED_STEP_MS, PATH_FOLLOW_MAX_SPEED};
pub use error::{RegistryError, WireError};
pub use input::{InputAction, InputCmd, MoveInputType};
pub use mode::{
    ModeRegistry, MovementEndState, MovementMode, ProposedMove, TickOutput, TickParams, TimeStep,
};
pub use mode_data::{ModeDataBlock, ModeDataCollection, ModeDataKind, PathFollowState};
pub use net::{EntityNetMap, InputPacket, NetId, NetIdTable, StatePacket};
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
pub use settings::{KccSettings, MovementSettings};
pub use state_machine::{FrameResult, MovementStateMachine, SubStep};
pub use sync_state::{ReconcileTolerance, SyncState};
pub use transition::{Transition, TransitionEvalResult};
pub use types::{CapsuleSpec, EntityId, ModeName, MovingBody, Quat, Vec3};
pub use world::{LineDef, LineEndpoints, MoverWorld, SafeMoveResult, SimWorld};
