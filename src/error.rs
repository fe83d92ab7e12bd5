//! Error taxonomy for session engine operations.

use crate::store::StoreError;
use derive_more::{Display, Error};

/// Errors surfaced by [`crate::SessionEngine`] operations.
///
/// Every variant is a local, recoverable-by-caller condition; none is
/// process-fatal and a failure in one session never affects another.
/// Validation failures leave the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// No session exists with the requested id.
    #[display("Game not found")]
    GameNotFound,
    /// A move arrived while the session was waiting or already finished.
    #[display("Game is not active")]
    GameNotActive,
    /// The mover does not hold the current turn.
    #[display("Not your turn")]
    NotPlayersTurn,
    /// The position is outside the board.
    #[display("Position out of bounds (must be 0-8)")]
    InvalidPosition,
    /// The target cell is already marked.
    #[display("Cell is occupied")]
    CellOccupied,
    /// Another operation held the session past the bounded wait.
    #[display("Session is busy, retry the operation")]
    Contention,
    /// The store kept losing races after the bounded retries.
    #[display("Storage conflict, retry the operation")]
    Conflict,
    /// The underlying store failed to serve the request.
    #[display("Storage unavailable: {}", message)]
    StoreUnavailable {
        /// Store-reported failure detail.
        message: String,
    },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => EngineError::Conflict,
            StoreError::Unavailable { message } => EngineError::StoreUnavailable { message },
        }
    }
}
