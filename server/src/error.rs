use mover_shared::{EntityId, RegistryError, WireError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServerError {
    #[error("entity {0} is not a mover")]
    UnknownMover(EntityId),
    #[error("entity {0} is not a line")]
    UnknownLine(EntityId),
    #[error("line geometry must be finite with a positive radius")]
    InvalidLine,
    #[error("input for {entity} frame {frame} arrived after frame {current} started")]
    StaleInput {
        entity: EntityId,
        frame: u64,
        current: u64,
    },
    #[error("input for {entity} frame {frame} is too far ahead of frame {current}")]
    InputTooFarAhead {
        entity: EntityId,
        frame: u64,
        current: u64,
    },
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
