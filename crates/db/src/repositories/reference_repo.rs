//! Read-only queries over the reference tables.

use sqlx::PgPool;
use ym_core::types::DbId;

use crate::models::reference::{NeighborNetRow, RegionRow, RoleTypeRow, SubregionRow};

pub struct ReferenceRepo;

impl ReferenceRepo {
    pub async fn list_regions(pool: &PgPool) -> Result<Vec<RegionRow>, sqlx::Error> {
        sqlx::query_as::<_, RegionRow>(
            "SELECT id, name FROM regions WHERE is_active = true ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn list_subregions(pool: &PgPool) -> Result<Vec<SubregionRow>, sqlx::Error> {
        sqlx::query_as::<_, SubregionRow>(
            "SELECT id, name, region_id FROM subregions WHERE is_active = true ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Active neighbor-nets, optionally restricted to one subregion.
    pub async fn list_neighbor_nets(
        pool: &PgPool,
        subregion_id: Option<DbId>,
    ) -> Result<Vec<NeighborNetRow>, sqlx::Error> {
        sqlx::query_as::<_, NeighborNetRow>(
            "SELECT id, name, subregion_id FROM neighbor_nets
             WHERE is_active = true AND ($1::BIGINT IS NULL OR subregion_id = $1)
             ORDER BY name",
        )
        .bind(subregion_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_role_types(pool: &PgPool) -> Result<Vec<RoleTypeRow>, sqlx::Error> {
        sqlx::query_as::<_, RoleTypeRow>(
            "SELECT id, name, category FROM role_types ORDER BY sort_order, name",
        )
        .fetch_all(pool)
        .await
    }
}
