//! Rows backing the member directory listing.

use chrono::NaiveDate;
use sqlx::FromRow;
use ym_core::types::{DbId, Timestamp};

/// The subset of `users` the directory shows.
#[derive(Debug, Clone, FromRow)]
pub struct DirectoryUser {
    pub id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
    pub claimed_at: Option<Timestamp>,
}

/// Active membership with the full geography chain resolved.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipGeography {
    pub user_id: DbId,
    pub joined_at: NaiveDate,
    pub neighbor_net_id: DbId,
    pub neighbor_net_name: String,
    pub subregion_id: DbId,
    pub subregion_name: String,
    pub region_id: Option<DbId>,
    pub region_name: Option<String>,
}
