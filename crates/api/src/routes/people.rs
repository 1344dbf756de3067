//! Route definitions for the `/people` directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::people;
use crate::state::AppState;

/// Routes mounted at `/people`.
///
/// ```text
/// GET    /                      -> list (snapshot + filter options)
/// GET    /search                -> search (filters, ?pages=N)
/// GET    /{id}                  -> get_by_id (read-only profile)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(people::list))
        .route("/search", get(people::search))
        .route("/{id}", get(people::get_by_id))
}
