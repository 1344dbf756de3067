//! In-progress onboarding data for one wizard session.

use crate::onboarding::record::{OnboardingPatch, OnboardingRecord};

/// The accumulated, not-yet-complete record. Owned by exactly one session.
#[derive(Debug, Default)]
pub struct OnboardingFormState {
    record: OnboardingRecord,
}

impl OnboardingFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the state from data flushed in an earlier session.
    pub fn prefill(record: OnboardingRecord) -> Self {
        Self { record }
    }

    /// Shallow merge; fields absent from `patch` keep their current value.
    pub fn update(&mut self, patch: OnboardingPatch) {
        patch.apply_to(&mut self.record);
    }

    pub fn clear(&mut self) {
        self.record = OnboardingRecord::default();
    }

    pub fn record(&self) -> &OnboardingRecord {
        &self.record
    }
}
