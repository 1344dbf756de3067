//! Background and foreground persistence of onboarding steps.
//!
//! Background saves are spawned and never awaited by navigation. At most one
//! failure is remembered: each new failure overwrites the previous one,
//! whatever step it belonged to. The slot is a `watch` channel so callers
//! can either poll [`SaveCoordinator::pending_error`] or subscribe.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::CoreError;
use crate::onboarding::steps::Step;
use crate::onboarding::store::{OnboardingStore, StepPayload};
use crate::types::{AuthId, DbId, Timestamp};

/// The most recent background save that failed, with the data it tried to
/// write so it can be retried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSaveError {
    pub step: Step,
    pub error: String,
    pub data: StepPayload,
}

pub struct SaveCoordinator {
    auth_id: AuthId,
    store: Arc<dyn OnboardingStore>,
    /// Internal id from the first successful save, passed to later saves.
    user_id: OnceLock<DbId>,
    pending: watch::Sender<Option<PendingSaveError>>,
    saving: AtomicBool,
    /// Background saves spawned and not yet finished.
    in_flight: AtomicUsize,
}

impl SaveCoordinator {
    pub fn new(auth_id: AuthId, store: Arc<dyn OnboardingStore>) -> Self {
        let (pending, _) = watch::channel(None);
        Self {
            auth_id,
            store,
            user_id: OnceLock::new(),
            pending,
            saving: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn auth_id(&self) -> AuthId {
        self.auth_id
    }

    pub fn cached_user_id(&self) -> Option<DbId> {
        self.user_id.get().copied()
    }

    /// Spawn a save for `payload` and return immediately.
    ///
    /// The handle may be dropped; the task keeps running.
    pub fn save_step_in_background(self: &Arc<Self>, payload: StepPayload) -> JoinHandle<()> {
        let this = Arc::clone(self);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let step = payload.step();
            let result = this
                .store
                .save_step(this.auth_id, &payload, this.cached_user_id())
                .await;
            match result {
                Ok(user_id) => {
                    this.remember_user_id(user_id);
                    this.resolve(step);
                    tracing::debug!(auth_id = %this.auth_id, step = step.number(), "Background save succeeded");
                }
                Err(error) => {
                    tracing::warn!(
                        auth_id = %this.auth_id,
                        step = step.number(),
                        error = %error,
                        "Background save failed",
                    );
                    this.pending.send_replace(Some(PendingSaveError {
                        step,
                        error,
                        data: payload,
                    }));
                }
            }
            this.in_flight.fetch_sub(1, Ordering::SeqCst);
        })
    }

    /// Save `payload` and wait for the result.
    pub async fn save_step_data(&self, payload: StepPayload) -> Result<DbId, CoreError> {
        let step = payload.step();
        self.saving.store(true, Ordering::SeqCst);
        let result = self
            .store
            .save_step(self.auth_id, &payload, self.cached_user_id())
            .await;
        self.saving.store(false, Ordering::SeqCst);

        match result {
            Ok(user_id) => {
                self.remember_user_id(user_id);
                self.resolve(step);
                Ok(user_id)
            }
            Err(message) => {
                tracing::error!(auth_id = %self.auth_id, step = step.number(), error = %message, "Save failed");
                Err(CoreError::SaveFailed {
                    step: step.number(),
                    message,
                })
            }
        }
    }

    /// Re-attempt the pending failed save, if any.
    ///
    /// With nothing pending this succeeds without touching the store. A
    /// failed retry updates the slot's error, unless another save replaced
    /// or cleared the slot while the retry ran.
    pub async fn flush_pending_saves(&self) -> Result<(), CoreError> {
        let Some(pending) = self.pending_error() else {
            return Ok(());
        };

        tracing::info!(auth_id = %self.auth_id, step = pending.step.number(), "Retrying pending save");
        match self.save_step_data(pending.data.clone()).await {
            Ok(_) => Ok(()),
            Err(err) => {
                if let CoreError::SaveFailed { message, .. } = &err {
                    self.pending.send_if_modified(|slot| {
                        if slot.as_ref() != Some(&pending) {
                            return false;
                        }
                        *slot = Some(PendingSaveError {
                            error: message.clone(),
                            ..pending.clone()
                        });
                        true
                    });
                }
                Err(err)
            }
        }
    }

    /// Write the completion timestamp.
    pub async fn complete(&self) -> Result<Timestamp, CoreError> {
        self.store
            .complete(self.auth_id, self.cached_user_id())
            .await
            .map_err(|message| CoreError::SaveFailed {
                step: Step::Complete.number(),
                message,
            })
    }

    pub fn pending_error(&self) -> Option<PendingSaveError> {
        self.pending.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PendingSaveError>> {
        self.pending.subscribe()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Whether any save, background or foreground, is still running.
    pub fn has_saves_in_flight(&self) -> bool {
        self.is_saving() || self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn remember_user_id(&self, user_id: DbId) {
        let _ = self.user_id.set(user_id);
    }

    /// Clear the slot if it holds a failure for `step`.
    fn resolve(&self, step: Step) {
        self.pending.send_if_modified(|slot| {
            if slot.as_ref().is_some_and(|p| p.step == step) {
                *slot = None;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::store::tests::FakeStore;

    use assert_matches::assert_matches;

    fn coordinator(store: &Arc<FakeStore>) -> Arc<SaveCoordinator> {
        Arc::new(SaveCoordinator::new(uuid::Uuid::new_v4(), store.clone()))
    }

    fn skills(names: &[&str]) -> StepPayload {
        StepPayload::Skills {
            skills: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn location(neighbor_net_id: i64) -> StepPayload {
        StepPayload::Location {
            subregion_id: Some(1),
            neighbor_net_id: Some(neighbor_net_id),
        }
    }

    // -- Pending slot --

    #[tokio::test]
    async fn second_failure_overwrites_first() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        store.fail_next_save("A");
        coord.save_step_in_background(location(10)).await.unwrap();
        store.fail_next_save("B");
        coord.save_step_in_background(skills(&["x"])).await.unwrap();

        let pending = coord.pending_error().unwrap();
        assert_eq!(pending.error, "B");
        assert_eq!(pending.step, Step::Skills);
    }

    #[tokio::test]
    async fn success_for_other_step_leaves_slot() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        store.fail_next_save("down");
        coord.save_step_in_background(location(10)).await.unwrap();
        coord.save_step_in_background(skills(&["x"])).await.unwrap();
        assert_eq!(coord.pending_error().unwrap().step, Step::Location);

        coord.save_step_in_background(location(10)).await.unwrap();
        assert!(coord.pending_error().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_failures() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);
        let mut rx = coord.subscribe();

        store.fail_next_save("offline");
        coord.save_step_in_background(skills(&["a"])).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().error, "offline");
    }

    #[tokio::test]
    async fn background_save_is_in_flight_until_it_finishes() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);
        let resume = Arc::new(tokio::sync::Notify::new());
        *store.pause.lock().unwrap() = Some(Arc::clone(&resume));

        let handle = coord.save_step_in_background(skills(&["a"]));
        assert!(coord.has_saves_in_flight());

        resume.notify_one();
        handle.await.unwrap();
        assert!(!coord.has_saves_in_flight());
    }

    // -- flush_pending_saves --

    #[tokio::test]
    async fn flush_with_nothing_pending_skips_store() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);
        coord.flush_pending_saves().await.unwrap();
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn flush_retries_pending_data_and_clears() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        store.fail_next_save("timeout");
        coord.save_step_in_background(skills(&["a", "b", "c"])).await.unwrap();

        coord.flush_pending_saves().await.unwrap();
        assert!(coord.pending_error().is_none());
        assert_eq!(store.saved.lock().unwrap().last(), Some(&skills(&["a", "b", "c"])));
    }

    #[tokio::test]
    async fn failed_flush_keeps_slot_with_new_error() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        store.fail_next_save("first");
        coord.save_step_in_background(skills(&["a"])).await.unwrap();
        store.fail_next_save("second");

        assert_matches!(
            coord.flush_pending_saves().await,
            Err(CoreError::SaveFailed { step: 6, .. })
        );
        assert_eq!(coord.pending_error().unwrap().error, "second");
    }

    #[tokio::test]
    async fn failed_flush_keeps_newer_failure() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        store.fail_next_save("location down");
        coord.save_step_in_background(location(10)).await.unwrap();

        let resume = Arc::new(tokio::sync::Notify::new());
        *store.pause.lock().unwrap() = Some(Arc::clone(&resume));
        store.fail_next_save("retry down");
        store.fail_next_save("skills down");

        let flushing = Arc::clone(&coord);
        let flush = tokio::spawn(async move { flushing.flush_pending_saves().await });
        while store.saves() < 2 {
            tokio::task::yield_now().await;
        }

        // A newer step fails while the retry is still in flight.
        coord.save_step_in_background(skills(&["a"])).await.unwrap();
        resume.notify_one();

        assert_matches!(flush.await.unwrap(), Err(CoreError::SaveFailed { step: 2, .. }));
        let pending = coord.pending_error().unwrap();
        assert_eq!(pending.step, Step::Skills);
        assert_eq!(pending.error, "skills down");
    }

    // -- Foreground saves --

    #[tokio::test]
    async fn foreground_failure_is_returned() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);
        store.fail_next_save("constraint violated");

        let err = coord.save_step_data(location(10)).await.unwrap_err();
        assert_matches!(err, CoreError::SaveFailed { step: 2, ref message } if message == "constraint violated");
        assert!(!coord.is_saving());
        assert!(coord.pending_error().is_none());
    }

    #[tokio::test]
    async fn internal_id_cached_after_first_success() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);

        coord.save_step_data(location(10)).await.unwrap();
        coord.save_step_data(skills(&["a"])).await.unwrap();

        assert_eq!(coord.cached_user_id(), Some(42));
        assert_eq!(*store.cached_ids_seen.lock().unwrap(), vec![None, Some(42)]);
    }

    // -- complete --

    #[tokio::test]
    async fn complete_failure_reports_final_step() {
        let store = Arc::new(FakeStore::default());
        let coord = coordinator(&store);
        store.fail_next_complete("rls denied");
        assert_matches!(coord.complete().await, Err(CoreError::SaveFailed { step: 7, .. }));
    }
}
