//! Membership entity model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use ym_core::types::{DbId, Timestamp};

/// Membership status values stored in `memberships.status`.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Membership {
    pub id: DbId,
    pub user_id: DbId,
    pub neighbor_net_id: DbId,
    pub status: String,
    pub joined_at: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Active membership joined with its neighbor-net's subregion.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipLocation {
    pub neighbor_net_id: DbId,
    pub subregion_id: DbId,
}
