//! Session token verification.
//!
//! - [`jwt`] -- decoding the identity provider's HS256 session tokens.

pub mod jwt;
