//! One member's wizard session.
//!
//! Owns the form state and the sequencer behind a single mutex, shares the
//! save coordinator with its background tasks, and loads reference data
//! once on first use.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::onboarding::form_state::OnboardingFormState;
use crate::onboarding::record::{OnboardingPatch, OnboardingRecord};
use crate::onboarding::save_coordinator::{PendingSaveError, SaveCoordinator};
use crate::onboarding::sequencer::{SequencerState, StepSequencer, Transition};
use crate::onboarding::steps::{SaveMode, Step, TOTAL_STEPS};
use crate::onboarding::store::OnboardingStore;
use crate::reference::{NeighborNet, ReferenceCache, ReferenceData, ReferenceSource};
use crate::types::{AuthId, DbId};

/// What a client needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: u8,
    pub label: &'static str,
    pub total_steps: u8,
    pub progress_percent: u8,
    pub save_mode: Option<SaveMode>,
    pub state: SequencerState,
    pub record: OnboardingRecord,
    pub pending_error: Option<PendingSaveError>,
    pub is_saving: bool,
}

struct Inner {
    form: OnboardingFormState,
    sequencer: StepSequencer,
}

pub struct WizardSession {
    auth_id: AuthId,
    inner: Mutex<Inner>,
    coordinator: Arc<SaveCoordinator>,
    reference: ReferenceCache,
}

impl std::fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
            .field("auth_id", &self.auth_id)
            .field("is_saving", &self.coordinator.is_saving())
            .finish_non_exhaustive()
    }
}

impl WizardSession {
    /// Open a session, prefilled with whatever was flushed earlier.
    ///
    /// Returns `Conflict` when the member already completed onboarding.
    pub async fn open(
        auth_id: AuthId,
        store: Arc<dyn OnboardingStore>,
        source: Arc<dyn ReferenceSource>,
        start: Step,
    ) -> Result<Self, CoreError> {
        let existing = store
            .load(auth_id)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to load onboarding data: {e}")))?
            .unwrap_or_default();

        if existing.completed_at.is_some() {
            return Err(CoreError::Conflict(
                "Onboarding is already complete".to_string(),
            ));
        }

        tracing::info!(auth_id = %auth_id, step = start.number(), "Wizard session opened");
        Ok(Self {
            auth_id,
            inner: Mutex::new(Inner {
                form: OnboardingFormState::prefill(existing),
                sequencer: StepSequencer::new(start),
            }),
            coordinator: Arc::new(SaveCoordinator::new(auth_id, store)),
            reference: ReferenceCache::new(source),
        })
    }

    pub fn auth_id(&self) -> AuthId {
        self.auth_id
    }

    pub fn coordinator(&self) -> &Arc<SaveCoordinator> {
        &self.coordinator
    }

    pub async fn view(&self) -> WizardView {
        let inner = self.inner.lock().await;
        self.render(&inner)
    }

    fn render(&self, inner: &Inner) -> WizardView {
        let step = inner.sequencer.current();
        WizardView {
            step: step.number(),
            label: step.label(),
            total_steps: TOTAL_STEPS,
            progress_percent: step.progress_percent(),
            save_mode: step.rule().save_mode,
            state: inner.sequencer.state(),
            record: inner.form.record().clone(),
            pending_error: self.coordinator.pending_error(),
            is_saving: self.coordinator.is_saving(),
        }
    }

    pub async fn is_complete(&self) -> bool {
        self.inner.lock().await.sequencer.is_complete()
    }

    pub async fn goto(&self, param: Option<&str>) -> Result<WizardView, CoreError> {
        let mut inner = self.inner.lock().await;
        inner.sequencer.goto(param)?;
        Ok(self.render(&inner))
    }

    pub async fn update(&self, patch: OnboardingPatch) -> Result<WizardView, CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.sequencer.is_complete() {
            return Err(CoreError::Conflict("Onboarding is already complete".to_string()));
        }
        inner.form.update(patch);
        Ok(self.render(&inner))
    }

    pub async fn next(&self) -> Result<(Transition, WizardView), CoreError> {
        let reference = self.reference.get().await?;
        let mut inner = self.inner.lock().await;
        let Inner { form, sequencer } = &mut *inner;
        let transition = sequencer.next(form, reference, &self.coordinator).await?;
        Ok((transition, self.render(&inner)))
    }

    pub async fn back(&self) -> Result<(Transition, WizardView), CoreError> {
        let mut inner = self.inner.lock().await;
        let Inner { form, sequencer } = &mut *inner;
        let transition = sequencer.back(form, &self.coordinator).await?;
        Ok((transition, self.render(&inner)))
    }

    /// Retry the pending background save.
    pub async fn retry(&self) -> Result<WizardView, CoreError> {
        self.coordinator.flush_pending_saves().await?;
        Ok(self.view().await)
    }

    /// Complete onboarding. On success the form state is cleared and the
    /// session is terminal; callers should drop it.
    pub async fn complete(&self) -> Result<WizardView, CoreError> {
        let mut inner = self.inner.lock().await;
        inner.sequencer.complete(&self.coordinator).await?;
        inner.form.clear();
        Ok(self.render(&inner))
    }

    pub async fn reference(&self) -> Result<&ReferenceData, CoreError> {
        self.reference.get().await
    }

    pub async fn neighbor_nets_for(&self, subregion_id: DbId) -> Result<Vec<NeighborNet>, CoreError> {
        self.reference.neighbor_nets_for(subregion_id).await
    }
}
