//! Reference table rows: geography, role types and selectable members.

use serde::Serialize;
use sqlx::FromRow;
use ym_core::reference::{NeighborNet, RoleType, Subregion, UserOption};
use ym_core::types::DbId;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegionRow {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubregionRow {
    pub id: DbId,
    pub name: String,
    pub region_id: Option<DbId>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NeighborNetRow {
    pub id: DbId,
    pub name: String,
    pub subregion_id: DbId,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleTypeRow {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserOptionRow {
    pub id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
}

impl From<SubregionRow> for Subregion {
    fn from(row: SubregionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            region_id: row.region_id,
        }
    }
}

impl From<NeighborNetRow> for NeighborNet {
    fn from(row: NeighborNetRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            subregion_id: row.subregion_id,
        }
    }
}

impl From<RoleTypeRow> for RoleType {
    fn from(row: RoleTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
        }
    }
}

impl From<UserOptionRow> for UserOption {
    fn from(row: UserOptionRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}
