//! The onboarding wizard: record, steps, form state, save coordination and
//! the per-member session that ties them together.

pub mod form_state;
pub mod record;
pub mod save_coordinator;
pub mod sequencer;
pub mod session;
pub mod steps;
pub mod store;

pub use form_state::OnboardingFormState;
pub use record::{
    Designation, EducationEntry, OnboardingPatch, OnboardingRecord, ProjectEntry, RoleEntry,
    Tenure,
};
pub use save_coordinator::{PendingSaveError, SaveCoordinator};
pub use sequencer::{SequencerState, StepSequencer};
pub use session::{WizardSession, WizardView};
pub use steps::{validate_step, SaveMode, Step};
pub use store::{OnboardingStore, StepPayload};
