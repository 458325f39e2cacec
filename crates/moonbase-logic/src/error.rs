//! Engine and storage error types.

use thiserror::Error;

use crate::colony::{ColonyId, LinkKey, ModuleId};
use crate::resources::ResourceKind;

/// Result alias used by every engine operation.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the colony engine.
///
/// Validation failures leave storage untouched. `UnknownResource` means the
/// store is structurally inconsistent and the operation was aborted.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("colony {0} does not exist")]
    UnknownColony(ColonyId),

    #[error("colony {0} is not alive")]
    ColonyNotAlive(ColonyId),

    #[error("colony {0} is already colonized")]
    ColonyAlreadyAlive(ColonyId),

    #[error("module {0} does not exist")]
    UnknownModule(ModuleId),

    #[error("link {0} does not exist")]
    UnknownLink(LinkKey),

    #[error("colony {colony} has no {kind:?} ledger entry")]
    UnknownResource { colony: ColonyId, kind: ResourceKind },

    #[error("link {0} already exists")]
    DuplicateLink(LinkKey),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("placement rejected (relief {relief:?}, rationality {rationality:?})")]
    PlacementRejected {
        relief: Option<i32>,
        rationality: Option<i32>,
    },

    #[error("cell ({x}, {y}) is outside zone {zone}")]
    OutOfBounds { zone: usize, x: i32, y: i32 },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Errors raised by store snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),

    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
