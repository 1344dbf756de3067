//! Repository for the `memberships` table.

use sqlx::PgPool;
use ym_core::types::DbId;

use crate::models::directory::MembershipGeography;
use crate::models::membership::{Membership, MembershipLocation, STATUS_ACTIVE, STATUS_INACTIVE};

const COLUMNS: &str = "id, user_id, neighbor_net_id, status, joined_at, created_at, updated_at";

const GEOGRAPHY_SELECT: &str = "SELECT m.user_id, m.joined_at,
            nn.id AS neighbor_net_id, nn.name AS neighbor_net_name,
            s.id AS subregion_id, s.name AS subregion_name,
            r.id AS region_id, r.name AS region_name
     FROM memberships m
     JOIN neighbor_nets nn ON nn.id = m.neighbor_net_id
     JOIN subregions s ON s.id = nn.subregion_id
     LEFT JOIN regions r ON r.id = s.region_id";

pub struct MembershipRepo;

impl MembershipRepo {
    /// Deactivate the member's active membership and start a new one in
    /// `neighbor_net_id`, joined today. Runs in one transaction.
    pub async fn replace_active(
        pool: &PgPool,
        user_id: DbId,
        neighbor_net_id: DbId,
    ) -> Result<Membership, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE memberships SET status = $2 WHERE user_id = $1 AND status = $3")
            .bind(user_id)
            .bind(STATUS_INACTIVE)
            .bind(STATUS_ACTIVE)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO memberships (user_id, neighbor_net_id, status, joined_at)
             VALUES ($1, $2, $3, CURRENT_DATE)
             RETURNING {COLUMNS}"
        );
        let membership = sqlx::query_as::<_, Membership>(&query)
            .bind(user_id)
            .bind(neighbor_net_id)
            .bind(STATUS_ACTIVE)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// The member's active neighbor-net and its subregion.
    pub async fn find_active_location(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<MembershipLocation>, sqlx::Error> {
        sqlx::query_as::<_, MembershipLocation>(
            "SELECT m.neighbor_net_id, nn.subregion_id
             FROM memberships m
             JOIN neighbor_nets nn ON nn.id = m.neighbor_net_id
             WHERE m.user_id = $1 AND m.status = $2",
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(pool)
        .await
    }

    /// Active membership geography for every member.
    pub async fn list_active_geography(pool: &PgPool) -> Result<Vec<MembershipGeography>, sqlx::Error> {
        let query = format!("{GEOGRAPHY_SELECT} WHERE m.status = $1");
        sqlx::query_as::<_, MembershipGeography>(&query)
            .bind(STATUS_ACTIVE)
            .fetch_all(pool)
            .await
    }

    /// Active membership geography for one member.
    pub async fn find_active_geography(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<MembershipGeography>, sqlx::Error> {
        let query = format!("{GEOGRAPHY_SELECT} WHERE m.status = $1 AND m.user_id = $2");
        sqlx::query_as::<_, MembershipGeography>(&query)
            .bind(STATUS_ACTIVE)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
