//! Per-request access decisions.
//!
//! The gate runs in two phases: [`evaluate_session`] looks only at the path
//! and the resolved session; when it answers
//! [`GateDecision::CheckCompletion`] the caller looks up the member's
//! onboarding status and finishes with [`evaluate_completion`].

use crate::contact::email_in_domain;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";
pub const ONBOARDING_ENTRY: &str = "/onboarding?step=1";

/// Error code appended to the login redirect when a token is rejected.
pub const ERROR_SESSION_EXPIRED: &str = "session_expired";

/// Error code appended to the login redirect for outside-domain accounts.
pub const ERROR_INVALID_DOMAIN: &str = "invalid_domain";

const PUBLIC_PREFIXES: &[&str] = &["/login", "/auth", "/legal-lol", "/api/legal-lol"];
const PUBLIC_EXACT: &[&str] = &["/", "/health"];
const ONBOARDING_PREFIXES: &[&str] = &["/onboarding", "/api/v1/onboarding"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Public,
    Onboarding,
    Protected,
}

pub fn classify_path(path: &str) -> RouteKind {
    if PUBLIC_EXACT.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteKind::Public
    } else if ONBOARDING_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteKind::Onboarding
    } else {
        RouteKind::Protected
    }
}

/// What the request carried in the way of credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token at all.
    Missing,
    /// A token was present but failed verification or has expired.
    Invalid,
    Valid { email: String },
}

/// Result of looking up `onboarding_completed_at` for the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Complete,
    /// No completion timestamp, or no member row yet.
    Incomplete,
    LookupFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    /// Expire the session cookie on the way out.
    pub clear_session: bool,
}

impl Redirect {
    fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            clear_session: false,
        }
    }

    fn login_error(code: &str) -> Self {
        Self {
            location: format!("{LOGIN_PATH}?error={code}"),
            clear_session: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    CheckCompletion(RouteKind),
    Redirect(Redirect),
}

/// First phase: authentication and domain.
///
/// The domain check applies on every path except the login pages
/// themselves, which is where a rejected member is sent.
pub fn evaluate_session(path: &str, session: &SessionState, allowed_domain: &str) -> GateDecision {
    let kind = classify_path(path);

    match session {
        SessionState::Missing if kind == RouteKind::Public => GateDecision::Allow,
        SessionState::Missing => GateDecision::Redirect(Redirect::to(LOGIN_PATH)),
        SessionState::Invalid if kind == RouteKind::Public => GateDecision::Allow,
        SessionState::Invalid => GateDecision::Redirect(Redirect::login_error(ERROR_SESSION_EXPIRED)),
        SessionState::Valid { email } => {
            if !email_in_domain(email, allowed_domain) && !path.starts_with(LOGIN_PATH) {
                return GateDecision::Redirect(Redirect::login_error(ERROR_INVALID_DOMAIN));
            }
            match kind {
                RouteKind::Public => GateDecision::Allow,
                other => GateDecision::CheckCompletion(other),
            }
        }
    }
}

/// Second phase: onboarding status. A failed lookup never redirects.
pub fn evaluate_completion(kind: RouteKind, completion: Completion) -> GateDecision {
    match (kind, completion) {
        (_, Completion::LookupFailed) => GateDecision::Allow,
        (RouteKind::Onboarding, Completion::Complete) => GateDecision::Redirect(Redirect::to(HOME_PATH)),
        (RouteKind::Protected, Completion::Incomplete) => {
            GateDecision::Redirect(Redirect::to(ONBOARDING_ENTRY))
        }
        _ => GateDecision::Allow,
    }
}
