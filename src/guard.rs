//! Per-session exclusive access guard.

use crate::error::EngineError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, instrument, warn};

/// Serializes mutating operations per session id.
///
/// Each session id gets its own async mutex, so at most one mutating
/// operation is in flight per session while operations on different
/// sessions proceed independently. Acquisition waits at most the
/// configured timeout before surfacing [`EngineError::Contention`]; the
/// returned guard releases on drop on every exit path, including caller
/// cancellation, so a failed or abandoned operation can never leave a
/// session locked.
#[derive(Debug)]
pub struct SessionGuard {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl SessionGuard {
    /// Creates a guard with the given acquisition timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Acquires exclusive access to the given session id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Contention`] if the session stays held by
    /// another operation past the bounded wait.
    #[instrument(skip(self))]
    pub async fn acquire(&self, session_id: &str) -> Result<OwnedMutexGuard<()>, EngineError> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!(session_id, "Session lock acquired");
                Ok(guard)
            }
            Err(_) => {
                warn!(
                    session_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Session lock wait expired"
                );
                Err(EngineError::Contention)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reacquire_after_release() {
        let guard = SessionGuard::new(Duration::from_millis(100));
        let held = guard.acquire("s1").await.expect("first acquire");
        drop(held);
        guard.acquire("s1").await.expect("second acquire");
    }

    #[tokio::test]
    async fn test_contention_after_timeout() {
        let guard = SessionGuard::new(Duration::from_millis(20));
        let _held = guard.acquire("s1").await.expect("first acquire");
        assert_eq!(guard.acquire("s1").await.err(), Some(EngineError::Contention));
    }

    #[tokio::test]
    async fn test_sessions_do_not_contend() {
        let guard = SessionGuard::new(Duration::from_millis(20));
        let _held = guard.acquire("s1").await.expect("acquire s1");
        guard.acquire("s2").await.expect("acquire s2");
    }
}
