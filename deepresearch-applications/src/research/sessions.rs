//! In-memory store for suspended and finished workflows

use super::workflow::WorkflowState;
use chrono::{DateTime, Duration, Utc};
use deepresearch_core::{invalid_state_error, not_found_error, DeepResearchResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct StoredSession {
    state: WorkflowState,
    last_access: DateTime<Utc>,
    /// Held while a caller advances this session
    lock: Arc<Mutex<()>>,
}

impl StoredSession {
    fn new(state: WorkflowState) -> Self {
        Self {
            state,
            last_access: Utc::now(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn is_claimed(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

/// Exclusive right to advance one session.
///
/// Dropping the claim without committing releases the session unchanged.
#[derive(Debug)]
pub struct SessionClaim {
    state: WorkflowState,
    lock: Arc<Mutex<()>>,
    _guard: OwnedMutexGuard<()>,
}

impl SessionClaim {
    /// State of the session at the time it was claimed
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }
}

/// Session-local workflow states keyed by session id
#[derive(Debug, Clone, Default)]
pub struct WorkflowSessions {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl WorkflowSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the state of a new session
    pub async fn store(&self, state: WorkflowState) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(state.session_id.clone(), StoredSession::new(state));
    }

    /// Claim a session so that only one caller advances it at a time.
    ///
    /// Fails with `NotFound` for unknown sessions and `InvalidState` while another
    /// claim on the same session is alive.
    pub async fn claim(&self, session_id: &str, action: &str) -> DeepResearchResult<SessionClaim> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found_error!(format!("research session {}", session_id), "sessions"))?;

        let guard = stored.lock.clone().try_lock_owned().map_err(|_| {
            invalid_state_error!(
                format!("{} (busy)", stored.state.stage),
                action,
                "sessions"
            )
        })?;
        stored.last_access = Utc::now();

        Ok(SessionClaim {
            state: stored.state.clone(),
            lock: stored.lock.clone(),
            _guard: guard,
        })
    }

    /// Store the state reached under a claim and release it.
    ///
    /// Returns false when the session was removed while claimed; it is not recreated.
    pub async fn commit(&self, claim: SessionClaim, next: WorkflowState) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&claim.state.session_id) {
            Some(stored) if Arc::ptr_eq(&stored.lock, &claim.lock) => {
                stored.state = next;
                stored.last_access = Utc::now();
                true
            }
            _ => {
                info!(
                    session_id = %claim.state.session_id,
                    "Session was abandoned while it was being advanced"
                );
                false
            }
        }
    }

    /// Snapshot of a session's state, refreshing its last access time
    pub async fn get(&self, session_id: &str) -> Option<WorkflowState> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(|stored| {
            stored.last_access = Utc::now();
            stored.state.clone()
        })
    }

    pub async fn remove(&self, session_id: &str) -> Option<WorkflowState> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|stored| stored.state)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop unclaimed sessions not accessed within `ttl`; returns how many were removed
    pub async fn cleanup_expired(&self, ttl: Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.last_access >= cutoff || stored.is_claimed());
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(removed = removed, remaining = sessions.len(), "Expired workflow sessions");
        }
        removed
    }
}
