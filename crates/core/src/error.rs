use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A persistence call for an onboarding step (or the completion write)
    /// returned an error. The message comes straight from the store.
    #[error("Save failed for step {step}: {message}")]
    SaveFailed { step: u8, message: String },

    /// Reference data needed to render a step could not be loaded.
    #[error("Reference data unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
