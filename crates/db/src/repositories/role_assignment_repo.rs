//! Repository for the `role_assignments` table.

use sqlx::PgPool;
use ym_core::types::DbId;

use crate::models::role_assignment::{
    ActiveRole, CreateRoleAssignment, RoleAssignment, RoleAssignmentWithNames,
};

const COLUMNS: &str = "id, user_id, role_type_id, role_type_custom, amir_user_id, \
                       amir_custom_name, start_date, end_date, is_active, notes, \
                       created_at, updated_at";

pub struct RoleAssignmentRepo;

impl RoleAssignmentRepo {
    /// Replace all of a member's role assignments in one transaction.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        roles: &[CreateRoleAssignment],
    ) -> Result<Vec<RoleAssignment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_assignments WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO role_assignments
                (user_id, role_type_id, role_type_custom, amir_user_id, amir_custom_name,
                 start_date, end_date, is_active, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(roles.len());
        for role in roles {
            let row = sqlx::query_as::<_, RoleAssignment>(&query)
                .bind(user_id)
                .bind(role.role_type_id)
                .bind(&role.role_type_custom)
                .bind(role.amir_user_id)
                .bind(&role.amir_custom_name)
                .bind(role.start_date)
                .bind(role.end_date)
                .bind(role.is_active)
                .bind(&role.notes)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// All of a member's role assignments, most recent start first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<RoleAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM role_assignments
             WHERE user_id = $1
             ORDER BY start_date DESC NULLS LAST, id"
        );
        sqlx::query_as::<_, RoleAssignment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Like [`Self::list_for_user`], with role type and amir names joined in.
    pub async fn list_for_user_with_names(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RoleAssignmentWithNames>, sqlx::Error> {
        sqlx::query_as::<_, RoleAssignmentWithNames>(
            "SELECT ra.id, ra.user_id, ra.role_type_id, ra.role_type_custom, ra.amir_user_id,
                    ra.amir_custom_name, ra.start_date, ra.end_date, ra.is_active, ra.notes,
                    ra.created_at, ra.updated_at,
                    rt.name AS role_type_name,
                    amir.first_name AS amir_first_name, amir.last_name AS amir_last_name
             FROM role_assignments ra
             LEFT JOIN role_types rt ON rt.id = ra.role_type_id
             LEFT JOIN users amir ON amir.id = ra.amir_user_id
             WHERE ra.user_id = $1
             ORDER BY ra.start_date DESC NULLS LAST, ra.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Active roles for every member (or one member when `user_id` is set).
    pub async fn list_active(
        pool: &PgPool,
        user_id: Option<DbId>,
    ) -> Result<Vec<ActiveRole>, sqlx::Error> {
        sqlx::query_as::<_, ActiveRole>(
            "SELECT ra.user_id, ra.role_type_id, rt.name AS role_type_name,
                    rt.category AS role_type_category, ra.role_type_custom
             FROM role_assignments ra
             LEFT JOIN role_types rt ON rt.id = ra.role_type_id
             WHERE ra.is_active = true AND ($1::BIGINT IS NULL OR ra.user_id = $1)
             ORDER BY ra.user_id, rt.sort_order NULLS LAST, ra.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
