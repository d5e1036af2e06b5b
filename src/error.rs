//! Crate-wide error handling.
//!
//! Mirrors the error-handling design for the streaming core: failures that
//! discard a single chunk's build (`GenerationFailed`), programmer errors
//! (`OutOfBounds`), fail-soft lookups that are logged and recovered rather
//! than propagated (`UnknownBlockName`/`UnknownBlockId`,
//! `AtlasRegionMissing`), and cooperative cancellation (`Cancelled`).

use crate::world::core::ChunkCoordinate;
use std::sync::PoisonError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("generation stage '{stage}' failed for chunk {coord:?}: {reason}")]
    GenerationFailed {
        coord: ChunkCoordinate,
        stage: String,
        reason: String,
    },

    #[error("local coordinate ({x}, {y}, {z}) is out of bounds for a {width}x{height}x{width} chunk")]
    OutOfBounds {
        x: i32,
        y: i32,
        z: i32,
        width: u32,
        height: u32,
    },

    #[error("unknown block name '{0}'")]
    UnknownBlockName(String),

    #[error("unknown block id {0}")]
    UnknownBlockId(u16),

    #[error("atlas region missing for {atlas}@{tile}")]
    AtlasRegionMissing { atlas: String, tile: u32 },

    #[error("job for chunk {0:?} was cancelled")]
    Cancelled(ChunkCoordinate),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("invalid block definition: {0}")]
    InvalidBlockDefinition(String),
}

impl<T> From<PoisonError<T>> for CoreError {
    fn from(_: PoisonError<T>) -> Self {
        CoreError::LockPoisoned("rwlock or mutex".to_string())
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for CoreError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        CoreError::ChannelClosed("crossbeam channel".to_string())
    }
}

impl From<crossbeam_channel::RecvError> for CoreError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        CoreError::ChannelClosed("crossbeam channel".to_string())
    }
}
