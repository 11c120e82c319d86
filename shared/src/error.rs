use crate::{mode_data::ModeDataKind, types::ModeName};
use thiserror::Error;

/// Failure while decoding replicated movement data.
///
/// An entity reference that cannot be resolved is NOT an error: it decodes as "no block".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("payload truncated while reading {field}")]
    Truncated { field: &'static str },
    #[error("mode index {index} is not in the mode table")]
    UnknownModeIndex { index: u8 },
    #[error("unknown mode data tag {tag}")]
    UnknownDataKind { tag: u8 },
    #[error("mode data kind {kind:?} appears twice")]
    DuplicateDataKind { kind: ModeDataKind },
    #[error("mode {0} is not registered and cannot be encoded")]
    UnregisteredMode(ModeName),
    #[error("too many mode data blocks to encode: {count}")]
    TooManyBlocks { count: usize },
}

/// Invalid mode registry configuration, reported when the registry is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("mode {0} registered twice")]
    DuplicateMode(ModeName),
    #[error("required mode {0} is not registered")]
    MissingMode(ModeName),
    #[error("mode table is full ({count} modes)")]
    TooManyModes { count: usize },
}
