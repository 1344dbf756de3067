//! Access gate middleware.
//!
//! Runs on every request. Decisions come from `ym_core::access`; this layer
//! resolves the session, looks up onboarding status when asked to, and turns
//! a redirect decision into a `303 See Other`.

use axum::extract::{Request, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ym_core::access::{
    evaluate_completion, evaluate_session, Completion, GateDecision, Redirect, SessionState,
};
use ym_core::types::AuthId;
use ym_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::middleware::auth::{session_token, SESSION_COOKIE};
use crate::state::AppState;

pub async fn access_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let claims = session_token(request.headers()).map(|t| validate_token(t, &state.config.jwt));
    let (session, auth_id) = match claims {
        None => (SessionState::Missing, None),
        Some(Err(e)) => {
            tracing::debug!(path = %path, error = %e, "Rejected session token");
            (SessionState::Invalid, None)
        }
        Some(Ok(claims)) => (SessionState::Valid { email: claims.email }, Some(claims.sub)),
    };

    let mut decision = evaluate_session(&path, &session, &state.config.allowed_email_domain);
    if let (GateDecision::CheckCompletion(kind), Some(auth_id)) = (&decision, auth_id) {
        let completion = lookup_completion(&state, auth_id).await;
        decision = evaluate_completion(*kind, completion);
    }

    match decision {
        GateDecision::Redirect(redirect) => {
            tracing::debug!(path = %path, location = %redirect.location, "Access gate redirect");
            redirect_response(&redirect)
        }
        GateDecision::Allow | GateDecision::CheckCompletion(_) => next.run(request).await,
    }
}

async fn lookup_completion(state: &AppState, auth_id: AuthId) -> Completion {
    match UserRepo::completion_status(&state.pool, auth_id).await {
        Ok(Some(Some(_))) => Completion::Complete,
        Ok(_) => Completion::Incomplete,
        Err(e) => {
            tracing::warn!(auth_id = %auth_id, error = %e, "Onboarding status lookup failed");
            Completion::LookupFailed
        }
    }
}

fn redirect_response(redirect: &Redirect) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    let headers = response.headers_mut();
    if let Ok(location) = HeaderValue::from_str(&redirect.location) {
        headers.insert(LOCATION, location);
    }
    if redirect.clear_session {
        if let Ok(cookie) = HeaderValue::from_str(&expired_session_cookie()) {
            headers.insert(SET_COOKIE, cookie);
        }
    }
    response
}

fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
