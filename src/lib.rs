//! Strictly Sessions - concurrent session engine for two-player tic-tac-toe.
//!
//! This library tracks a shared 3x3 board per session, enforces turn
//! order and move legality, detects wins and draws, and guarantees that
//! concurrent move submissions against one session are applied atomically
//! in a single consistent order.
//!
//! # Architecture
//!
//! - **Board & rules**: typed 3-valued squares, win detection over the 8
//!   fixed lines, draw detection
//! - **Session**: the aggregate (players, board, turn, status, winner)
//!   with its append-only move log for replay
//! - **Engine**: create/join/move/fetch, each mutation running under a
//!   per-session exclusive guard as one atomic read-modify-write
//! - **Store**: narrow async storage contract with version-checked saves
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_sessions::{MemoryStore, SessionEngine};
//!
//! # async fn example() -> Result<(), strictly_sessions::EngineError> {
//! let engine = SessionEngine::new(Arc::new(MemoryStore::new()));
//!
//! let id = engine.create_session("alice".to_owned()).await?;
//! engine.join_session(&id, "bob".to_owned()).await?;
//!
//! let session = engine.apply_move(&id, "alice", 4).await?;
//! println!("{}", session.board().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod engine;
mod error;
mod games;
mod guard;
mod invariants;
mod session;
mod store;
mod validate;

// Crate-level exports - Engine
pub use engine::{EngineConfig, SessionEngine};

// Crate-level exports - Errors
pub use error::EngineError;

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, BoardParseError, Mark, OutOfBounds, Outcome, Position, Square, detect_line, evaluate,
    is_full,
};

// Crate-level exports - Concurrency guard
pub use guard::SessionGuard;

// Crate-level exports - Invariants
pub use invariants::{
    AlternatingTurns, BoardMatchesLog, Invariant, InvariantViolation, SeatingConsistent,
    WinnerHasLine, check_all,
};

// Crate-level exports - Session aggregate
pub use session::{MoveRecord, PlayerId, Session, SessionId, SessionStatus};

// Crate-level exports - Storage
pub use store::{MemoryStore, SessionStore, StoreError};

// Crate-level exports - Validation
pub use validate::validate_move;
