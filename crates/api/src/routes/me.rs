use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new().route("/context", get(me::context))
}
