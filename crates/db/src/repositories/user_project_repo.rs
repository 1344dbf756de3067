//! Repository for the `user_projects` table.

use sqlx::PgPool;
use ym_core::types::DbId;

use crate::models::user_project::{CreateUserProject, UserProject, UserProjectWithNames};

const COLUMNS: &str = "id, user_id, project_type, project_type_custom, role, amir_user_id, \
                       amir_custom_name, start_month, start_year, end_month, end_year, \
                       is_current, description, created_at, updated_at";

pub struct UserProjectRepo;

impl UserProjectRepo {
    /// Replace all of a member's projects in one transaction.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        projects: &[CreateUserProject],
    ) -> Result<Vec<UserProject>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_projects WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO user_projects
                (user_id, project_type, project_type_custom, role, amir_user_id,
                 amir_custom_name, start_month, start_year, end_month, end_year,
                 is_current, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(projects.len());
        for project in projects {
            let row = sqlx::query_as::<_, UserProject>(&query)
                .bind(user_id)
                .bind(&project.project_type)
                .bind(&project.project_type_custom)
                .bind(&project.role)
                .bind(project.amir_user_id)
                .bind(&project.amir_custom_name)
                .bind(project.start_month)
                .bind(project.start_year)
                .bind(project.end_month)
                .bind(project.end_year)
                .bind(project.is_current)
                .bind(&project.description)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// All of a member's projects, most recent start first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserProject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_projects
             WHERE user_id = $1
             ORDER BY start_year DESC NULLS LAST, start_month DESC NULLS LAST, id"
        );
        sqlx::query_as::<_, UserProject>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_user_with_names(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserProjectWithNames>, sqlx::Error> {
        sqlx::query_as::<_, UserProjectWithNames>(
            "SELECT up.id, up.user_id, up.project_type, up.project_type_custom, up.role,
                    up.amir_user_id, up.amir_custom_name, up.start_month, up.start_year,
                    up.end_month, up.end_year, up.is_current, up.description,
                    up.created_at, up.updated_at,
                    amir.first_name AS amir_first_name, amir.last_name AS amir_last_name
             FROM user_projects up
             LEFT JOIN users amir ON amir.id = up.amir_user_id
             WHERE up.user_id = $1
             ORDER BY up.start_year DESC NULLS LAST, up.start_month DESC NULLS LAST, up.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
