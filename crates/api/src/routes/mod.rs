pub mod health;
pub mod me;
pub mod onboarding;
pub mod people;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /onboarding                                      wizard (see routes::onboarding)
/// /people                                          directory (see routes::people)
/// /me/context                                      home page card
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/onboarding", onboarding::router())
        .nest("/people", people::router())
        .nest("/me", me::router())
}
