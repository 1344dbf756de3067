//! Registry of open onboarding wizard sessions.
//!
//! A member has at most one session. It is opened on first visit, resumed
//! on later requests, and dropped once onboarding completes or after sitting
//! idle (see [`WizardRegistry::evict_idle`]). An evicted member reopens a
//! session prefilled from whatever the store holds.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use ym_core::error::CoreError;
use ym_core::onboarding::steps::Step;
use ym_core::onboarding::store::OnboardingStore;
use ym_core::onboarding::WizardSession;
use ym_core::reference::ReferenceSource;
use ym_core::types::AuthId;

struct Entry {
    session: Arc<WizardSession>,
    last_seen: Instant,
}

impl Entry {
    fn is_idle(&self, idle_for: Duration) -> bool {
        self.last_seen.elapsed() >= idle_for && !self.session.coordinator().has_saves_in_flight()
    }
}

/// Thread-safe via interior `RwLock`; wrapped in `Arc` inside [`AppState`].
///
/// [`AppState`]: crate::state::AppState
pub struct WizardRegistry {
    sessions: RwLock<HashMap<AuthId, Entry>>,
    store: Arc<dyn OnboardingStore>,
    source: Arc<dyn ReferenceSource>,
}

impl WizardRegistry {
    pub fn new(store: Arc<dyn OnboardingStore>, source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
            source,
        }
    }

    /// Look up the member's session and mark it as used.
    pub async fn get(&self, auth_id: AuthId) -> Option<Arc<WizardSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&auth_id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Return the member's session, opening one at `start` if none exists.
    pub async fn open_or_resume(
        &self,
        auth_id: AuthId,
        start: Step,
    ) -> Result<Arc<WizardSession>, CoreError> {
        if let Some(session) = self.get(auth_id).await {
            return Ok(session);
        }

        let session = Arc::new(
            WizardSession::open(
                auth_id,
                Arc::clone(&self.store),
                Arc::clone(&self.source),
                start,
            )
            .await?,
        );

        // A concurrent request may have opened one while we were loading.
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(auth_id).or_insert(Entry {
            session,
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, auth_id: AuthId) {
        if self.sessions.write().await.remove(&auth_id).is_some() {
            tracing::info!(auth_id = %auth_id, "Wizard session closed");
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions unused for `idle_for` that have no save running.
    ///
    /// A pending failed save is retried before its session goes; if the
    /// retry fails too, that step's edits are lost. Returns how many
    /// sessions were dropped.
    pub async fn evict_idle(&self, idle_for: Duration) -> usize {
        let idle: Vec<(AuthId, Arc<WizardSession>)> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.is_idle(idle_for))
            .map(|(auth_id, entry)| (*auth_id, Arc::clone(&entry.session)))
            .collect();

        let mut evicted = 0;
        for (auth_id, session) in idle {
            if let Err(e) = session.coordinator().flush_pending_saves().await {
                tracing::warn!(auth_id = %auth_id, error = %e, "Dropping idle wizard with an unsaved step");
            }

            // The member may have come back while the retry ran.
            let mut sessions = self.sessions.write().await;
            let still_idle = sessions
                .get(&auth_id)
                .is_some_and(|entry| Arc::ptr_eq(&entry.session, &session) && entry.is_idle(idle_for));
            if still_idle {
                sessions.remove(&auth_id);
                evicted += 1;
                tracing::debug!(auth_id = %auth_id, "Idle wizard session evicted");
            }
        }
        evicted
    }

    /// Retry every session's pending background save. Used on shutdown.
    pub async fn flush_all(&self) {
        let sessions: Vec<Arc<WizardSession>> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.session))
            .collect();
        for session in sessions {
            if let Err(e) = session.coordinator().flush_pending_saves().await {
                tracing::warn!(auth_id = %session.auth_id(), error = %e, "Pending save lost on shutdown");
            }
        }
    }
}
