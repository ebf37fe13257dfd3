use crate::store::model::RecordId;
use thiserror::Error;

/// Failures surfaced by record creation, the transaction store and its persistence gateway.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Malformed user input; nothing was added to the store.
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("persisted data at {location} is corrupt: {reason}")]
    PersistedStateCorrupt { location: String, reason: String },
    /// The mutation was rolled back in memory, so memory and disk still agree.
    #[error("failed to write transactions to {location}: {reason}")]
    PersistenceWriteFailure { location: String, reason: String },
    #[error("failed to move corrupt data at {location} aside: {reason}")]
    QuarantineFailure { location: String, reason: String },
    #[error("position {position} is out of range, there are {len} transaction(s)")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("no transaction with id {0}")]
    UnknownRecord(RecordId),
    #[error("failed to read transactions: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
