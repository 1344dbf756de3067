//! Request authentication and the access gate.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in member from the session token.
//! - [`access_gate::access_gate`] -- Redirects requests by session, email
//!   domain and onboarding status before they reach a handler.

pub mod access_gate;
pub mod auth;
