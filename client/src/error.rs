use mover_shared::{NetId, RegistryError, WireError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    #[error("state packet for {0} does not belong to this mover")]
    ForeignPacket(NetId),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
