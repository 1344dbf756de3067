//! Route definitions for the `/onboarding` wizard.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// ```text
/// GET    /                      -> show (?step=N)
/// PATCH  /data                  -> update_data
/// POST   /next                  -> next
/// POST   /back                  -> back
/// POST   /retry                 -> retry
/// POST   /complete              -> complete
/// GET    /reference             -> reference
/// GET    /neighbor-nets         -> neighbor_nets (?subregion_id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(onboarding::show))
        .route("/data", patch(onboarding::update_data))
        .route("/next", post(onboarding::next))
        .route("/back", post(onboarding::back))
        .route("/retry", post(onboarding::retry))
        .route("/complete", post(onboarding::complete))
        .route("/reference", get(onboarding::reference))
        .route("/neighbor-nets", get(onboarding::neighbor_nets))
}
