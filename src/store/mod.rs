//! Session storage contract and adapters.

mod memory;

pub use memory::MemoryStore;

use crate::session::Session;
use derive_more::{Display, Error};

/// Failures at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// The write lost a race: the stored version did not match.
    #[display("Version conflict on save")]
    Conflict,
    /// The store could not serve the request.
    #[display("Store unavailable: {}", message)]
    Unavailable {
        /// Backend-reported detail.
        message: String,
    },
}

/// Durable keyed storage for sessions.
///
/// The engine is the only writer and addresses storage exclusively
/// through this interface. `save` must be atomic: either the whole
/// session (board, status, turn, winner, move log) is persisted or
/// nothing is. A save is accepted only when the incoming session's
/// version is exactly one ahead of the stored copy, which is how the
/// engine detects lost races and retries from a fresh load.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Inserts a brand-new session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the id is already taken.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads a consistent snapshot, or `None` for an unknown id.
    async fn load(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// Persists the full session atomically under the version check.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved on.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;
}
