//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create DTOs for inserts where the table is written to
//! - Conversions to and from the `ym-core` domain types

pub mod directory;
pub mod membership;
pub mod reference;
pub mod role_assignment;
pub mod user;
pub mod user_project;
