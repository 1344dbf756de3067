//! Domain logic for the YM membership backend.
//!
//! This crate has no database or HTTP dependencies so the onboarding state
//! machine, the save coordinator, the reference cache and the directory
//! filter engine can be exercised directly in unit tests. Persistence and
//! reference lookups sit behind the traits in [`onboarding::store`] and
//! [`reference`].

pub mod access;
pub mod contact;
pub mod directory;
pub mod error;
pub mod member;
pub mod onboarding;
pub mod reference;
pub mod search;
pub mod types;
