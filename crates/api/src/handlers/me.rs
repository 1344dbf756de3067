//! Handlers for the signed-in member's own data.

use axum::extract::State;
use axum::Json;
use ym_core::member::UserContext;
use ym_db::views::load_user_context;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me/context
///
/// Falls back to the token's names when the member has no row yet.
pub async fn context(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserContext>>> {
    let context = match load_user_context(&state.pool, user.auth_id).await? {
        Some(context) => context,
        None => UserContext::new(
            user.first_name.as_deref(),
            user.last_name.as_deref(),
            Vec::new(),
            None,
            None,
        ),
    };
    Ok(Json(DataResponse { data: context }))
}
