//! Session engine: composes the guard, validator, rules, and store.

use crate::error::EngineError;
use crate::guard::SessionGuard;
use crate::invariants;
use crate::session::{PlayerId, Session, SessionId};
use crate::store::{SessionStore, StoreError};
use crate::validate::validate_move;
use chrono::Utc;
use derive_getters::Getters;
use derive_new::new;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Tunable bounds for engine operations.
#[derive(Debug, Clone, Copy, Getters, new)]
pub struct EngineConfig {
    /// Longest wait for a session's exclusive guard before
    /// [`EngineError::Contention`] surfaces.
    lock_timeout: Duration,
    /// Store conflicts tolerated per operation before
    /// [`EngineError::Conflict`] surfaces.
    save_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 3)
    }
}

/// Orchestrates game sessions against a [`SessionStore`].
///
/// Every mutating operation runs under the session's exclusive guard as
/// one load-validate-compute-persist unit, so concurrent submissions
/// against one session are applied in a single consistent order while
/// different sessions never block each other. Callers only ever receive
/// cloned snapshots; the authoritative copy lives in the store.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    guard: Arc<SessionGuard>,
    config: EngineConfig,
}

impl SessionEngine {
    /// Creates an engine with default bounds.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates an engine with explicit bounds.
    #[instrument(skip(store))]
    pub fn with_config(store: Arc<dyn SessionStore>, config: EngineConfig) -> Self {
        info!(?config, "Creating session engine");
        let guard = Arc::new(SessionGuard::new(*config.lock_timeout()));
        Self {
            store,
            guard,
            config,
        }
    }

    /// Creates a session owned by `creator`, who is seated as player A
    /// and will move first once an opponent joins.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot accept the new session.
    #[instrument(skip(self))]
    pub async fn create_session(&self, creator: PlayerId) -> Result<SessionId, EngineError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), creator);
        self.store.create(&session).await?;
        info!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Seats `joiner` as player B if the second seat is free.
    ///
    /// Joining is idempotent for players already seated, and anyone
    /// arriving at a full session is a spectator: they receive the
    /// current snapshot and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown id, plus the
    /// guard and store failure modes.
    #[instrument(skip(self))]
    pub async fn join_session(
        &self,
        session_id: &str,
        joiner: PlayerId,
    ) -> Result<Session, EngineError> {
        let _guard = self.guard.acquire(session_id).await?;
        let mut attempts = 0;
        loop {
            let mut session = self.load_required(session_id).await?;

            if session.is_participant(&joiner) {
                debug!(joiner = %joiner, "Already seated, join is a no-op");
                return Ok(session);
            }
            if session.player_b().is_some() {
                debug!(joiner = %joiner, "Session full, joiner spectates");
                return Ok(session);
            }

            session.seat_player_b(joiner.clone());
            session.bump_version();
            debug_assert_eq!(invariants::check_all(&session), Ok(()));

            match self.store.save(&session).await {
                Ok(()) => {
                    info!(player_b = %joiner, "Second player joined, game started");
                    return Ok(session);
                }
                Err(StoreError::Conflict) if attempts < *self.config.save_retries() => {
                    attempts += 1;
                    warn!(attempts, "Save conflict on join, reloading");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Applies one move as a single atomic read-modify-write.
    ///
    /// Under the session's guard the engine loads the current state,
    /// validates the move against it, places the mover's mark, settles
    /// win/draw/turn, appends the move record, and persists the whole
    /// session in one store write. Store conflicts are retried from a
    /// fresh load a bounded number of times, re-validating each time so
    /// a retry never acts on stale state.
    ///
    /// # Errors
    ///
    /// Validation failures ([`EngineError::GameNotActive`],
    /// [`EngineError::NotPlayersTurn`], [`EngineError::InvalidPosition`],
    /// [`EngineError::CellOccupied`]) leave the session untouched.
    /// [`EngineError::GameNotFound`], [`EngineError::Contention`],
    /// [`EngineError::Conflict`], and [`EngineError::StoreUnavailable`]
    /// report the infrastructure conditions.
    #[instrument(skip(self))]
    pub async fn apply_move(
        &self,
        session_id: &str,
        player_id: &str,
        position: usize,
    ) -> Result<Session, EngineError> {
        let _guard = self.guard.acquire(session_id).await?;
        let mut attempts = 0;
        loop {
            let mut session = self.load_required(session_id).await?;
            let pos = validate_move(&session, player_id, position)?;

            session.apply_move(player_id, pos, Utc::now());
            session.bump_version();
            debug_assert_eq!(invariants::check_all(&session), Ok(()));

            match self.store.save(&session).await {
                Ok(()) => {
                    info!(
                        player_id,
                        position,
                        status = ?session.status(),
                        board = %session.board(),
                        "Move applied"
                    );
                    return Ok(session);
                }
                Err(StoreError::Conflict) if attempts < *self.config.save_retries() => {
                    attempts += 1;
                    warn!(attempts, "Save conflict on move, revalidating against fresh state");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Read-only snapshot fetch, including the full ordered move log for
    /// replay consumers. Never mutates and takes no guard.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str) -> Result<Session, EngineError> {
        self.load_required(session_id).await
    }

    async fn load_required(&self, session_id: &str) -> Result<Session, EngineError> {
        self.store
            .load(session_id)
            .await?
            .ok_or(EngineError::GameNotFound)
    }
}
