//! Handlers for the `/onboarding` wizard.
//!
//! Every handler works on the caller's [`WizardSession`], opening it on first
//! use. Opening also claims the member row so later saves can resolve the
//! member's internal id.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use ym_core::onboarding::record::OnboardingPatch;
use ym_core::onboarding::sequencer::Transition;
use ym_core::onboarding::steps::Step;
use ym_core::onboarding::{WizardSession, WizardView};
use ym_core::reference::{NeighborNet, ReferenceData};
use ym_db::models::user::ClaimUser;
use ym_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{StepParams, SubregionParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of a `next` or `back` move.
#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub from: u8,
    pub to: u8,
    /// The step was persisted in the background; failures surface later as
    /// `view.pending_error`.
    pub saved_in_background: bool,
    pub view: WizardView,
}

impl NavigationResponse {
    fn new(transition: Transition, view: WizardView) -> Self {
        Self {
            from: transition.from.number(),
            to: transition.to.number(),
            saved_in_background: transition.background_save.is_some(),
            view,
        }
    }
}

async fn session_for(state: &AppState, user: &AuthUser, start: Step) -> AppResult<Arc<WizardSession>> {
    if let Some(session) = state.wizards.get(user.auth_id).await {
        return Ok(session);
    }

    UserRepo::claim(
        &state.pool,
        &ClaimUser {
            auth_id: user.auth_id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        },
    )
    .await?;

    Ok(state.wizards.open_or_resume(user.auth_id, start).await?)
}

/// GET /api/v1/onboarding?step=N
///
/// Opens or resumes the wizard. With `step`, jumps there (invalid values
/// land on step 1); without it, stays where the session was.
pub async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StepParams>,
) -> AppResult<Json<DataResponse<WizardView>>> {
    let session = session_for(&state, &user, Step::from_query(params.step.as_deref())).await?;
    let view = match params.step.as_deref() {
        Some(step) => session.goto(Some(step)).await?,
        None => session.view().await,
    };
    Ok(Json(DataResponse { data: view }))
}

/// PATCH /api/v1/onboarding/data
pub async fn update_data(
    State(state): State<AppState>,
    user: AuthUser,
    Json(patch): Json<OnboardingPatch>,
) -> AppResult<Json<DataResponse<WizardView>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let view = session.update(patch).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/onboarding/next
pub async fn next(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<NavigationResponse>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let (transition, view) = session.next().await?;
    Ok(Json(DataResponse {
        data: NavigationResponse::new(transition, view),
    }))
}

/// POST /api/v1/onboarding/back
pub async fn back(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<NavigationResponse>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let (transition, view) = session.back().await?;
    Ok(Json(DataResponse {
        data: NavigationResponse::new(transition, view),
    }))
}

/// POST /api/v1/onboarding/retry
pub async fn retry(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<WizardView>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let view = session.retry().await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/onboarding/complete
///
/// On success the session is dropped; the access gate sends the member home
/// from then on.
pub async fn complete(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<WizardView>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let view = session.complete().await?;
    state.wizards.remove(user.auth_id).await;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/onboarding/reference
pub async fn reference(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<ReferenceData>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let data = session.reference().await?.clone();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/onboarding/neighbor-nets?subregion_id=
pub async fn neighbor_nets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SubregionParams>,
) -> AppResult<Json<DataResponse<Vec<NeighborNet>>>> {
    let session = session_for(&state, &user, Step::PersonalInfo).await?;
    let data = session.neighbor_nets_for(params.subregion_id).await?;
    Ok(Json(DataResponse { data }))
}
