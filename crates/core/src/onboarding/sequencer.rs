//! Step navigation for the onboarding wizard.
//!
//! `Next` validates the current step against the rule table, then persists
//! its slice either in the foreground (blocking the move on failure) or in
//! the background (moving immediately). `Back` always persists in the
//! background without validating.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::CoreError;
use crate::onboarding::form_state::OnboardingFormState;
use crate::onboarding::save_coordinator::SaveCoordinator;
use crate::onboarding::steps::{validate_step, SaveMode, Step};
use crate::onboarding::store::StepPayload;
use crate::reference::ReferenceData;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SequencerState {
    Step { step: Step },
    Complete { completed_at: Timestamp },
}

/// Result of a `next` or `back` move.
#[derive(Debug)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    /// Handle of the spawned save, for steps that persist in the background.
    pub background_save: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct StepSequencer {
    state: SequencerState,
}

impl StepSequencer {
    pub fn new(start: Step) -> Self {
        Self {
            state: SequencerState::Step { step: start },
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// The current step. The terminal state reports the final step.
    pub fn current(&self) -> Step {
        match self.state {
            SequencerState::Step { step } => step,
            SequencerState::Complete { .. } => Step::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SequencerState::Complete { .. })
    }

    fn active_step(&self) -> Result<Step, CoreError> {
        match self.state {
            SequencerState::Step { step } => Ok(step),
            SequencerState::Complete { .. } => {
                Err(CoreError::Conflict("Onboarding is already complete".to_string()))
            }
        }
    }

    /// Jump to the step named by a `step` query parameter. Invalid values
    /// land on the first step.
    pub fn goto(&mut self, param: Option<&str>) -> Result<Step, CoreError> {
        self.active_step()?;
        let step = Step::from_query(param);
        self.state = SequencerState::Step { step };
        Ok(step)
    }

    pub async fn next(
        &mut self,
        form: &OnboardingFormState,
        reference: &ReferenceData,
        coordinator: &Arc<SaveCoordinator>,
    ) -> Result<Transition, CoreError> {
        let from = self.active_step()?;
        validate_step(from, form.record(), reference)?;

        let (Some(to), Some(mode), Some(payload)) = (
            from.next(),
            from.rule().save_mode,
            StepPayload::from_record(from, form.record()),
        ) else {
            return Err(CoreError::Validation(format!(
                "Step {from} has no following step"
            )));
        };

        let background_save = match mode {
            SaveMode::Foreground => {
                coordinator.save_step_data(payload).await?;
                None
            }
            SaveMode::Background => Some(coordinator.save_step_in_background(payload)),
        };

        self.state = SequencerState::Step { step: to };
        tracing::info!(
            auth_id = %coordinator.auth_id(),
            from = from.number(),
            to = to.number(),
            "Onboarding step advanced",
        );
        Ok(Transition {
            from,
            to,
            background_save,
        })
    }

    pub async fn back(
        &mut self,
        form: &OnboardingFormState,
        coordinator: &Arc<SaveCoordinator>,
    ) -> Result<Transition, CoreError> {
        let from = self.active_step()?;
        let to = from
            .prev()
            .ok_or_else(|| CoreError::Validation("Already on the first step".to_string()))?;

        let background_save = StepPayload::from_record(from, form.record())
            .map(|payload| coordinator.save_step_in_background(payload));

        self.state = SequencerState::Step { step: to };
        tracing::info!(
            auth_id = %coordinator.auth_id(),
            from = from.number(),
            to = to.number(),
            "Onboarding step went back",
        );
        Ok(Transition {
            from,
            to,
            background_save,
        })
    }

    /// Flush outstanding background saves, then write the completion
    /// timestamp. Either failure leaves the sequencer on the final step.
    pub async fn complete(
        &mut self,
        coordinator: &Arc<SaveCoordinator>,
    ) -> Result<Timestamp, CoreError> {
        let step = self.active_step()?;
        if step != Step::Complete {
            return Err(CoreError::Validation(format!(
                "Onboarding can only be completed from step {}",
                Step::Complete.number()
            )));
        }

        coordinator.flush_pending_saves().await?;
        let completed_at = coordinator.complete().await?;

        self.state = SequencerState::Complete { completed_at };
        tracing::info!(auth_id = %coordinator.auth_id(), %completed_at, "Onboarding completed");
        Ok(completed_at)
    }
}
