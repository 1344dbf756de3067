//! Repository for the `users` table.

use sqlx::PgPool;
use uuid::Uuid;
use ym_core::types::{DbId, Timestamp};

use crate::models::reference::UserOptionRow;
use crate::models::user::{ClaimUser, UpdatePersonalInfo, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, auth_id, email, first_name, last_name, avatar_url, phone, \
                       personal_email, ethnicity, date_of_birth, education_level, education, \
                       skills, claimed_at, onboarding_completed_at, created_at, updated_at";

/// Provides lookups and onboarding writes for members.
pub struct UserRepo;

impl UserRepo {
    /// Find a member by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a member by identity-provider subject.
    pub async fn find_by_auth_id(pool: &PgPool, auth_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE auth_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(auth_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the internal ID for an identity-provider subject.
    pub async fn find_id_by_auth_id(pool: &PgPool, auth_id: Uuid) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM users WHERE auth_id = $1")
            .bind(auth_id)
            .fetch_optional(pool)
            .await
    }

    /// Link `auth_id` to the member row with the same email, creating the
    /// row if the member was never imported.
    ///
    /// The email decides which row is linked. A row linked to a different
    /// subject is rebound to `auth_id`, and any other row still holding
    /// `auth_id` (the member's address changed upstream) is unlinked first.
    pub async fn claim(pool: &PgPool, input: &ClaimUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let unlinked = sqlx::query(
            "UPDATE users SET auth_id = NULL
             WHERE auth_id = $1 AND email <> LOWER($2)",
        )
        .bind(input.auth_id)
        .bind(&input.email)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if unlinked > 0 {
            tracing::warn!(auth_id = %input.auth_id, "Unlinked subject from a member row with another email");
        }

        let query = format!(
            "INSERT INTO users (auth_id, email, first_name, last_name)
             VALUES ($1, LOWER($2), $3, $4)
             ON CONFLICT ON CONSTRAINT uq_users_email DO UPDATE SET
                auth_id = EXCLUDED.auth_id,
                first_name = COALESCE(users.first_name, EXCLUDED.first_name),
                last_name = COALESCE(users.last_name, EXCLUDED.last_name)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(input.auth_id)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Completion timestamp for a member.
    ///
    /// Outer `None` means no member row; inner `None` means not completed.
    pub async fn completion_status(
        pool: &PgPool,
        auth_id: Uuid,
    ) -> Result<Option<Option<Timestamp>>, sqlx::Error> {
        sqlx::query_scalar("SELECT onboarding_completed_at FROM users WHERE auth_id = $1")
            .bind(auth_id)
            .fetch_optional(pool)
            .await
    }

    /// Write the personal-info step. Returns `true` if the row was updated.
    pub async fn update_personal_info(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePersonalInfo,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET phone = $2, personal_email = $3, ethnicity = $4, date_of_birth = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.phone)
        .bind(&input.personal_email)
        .bind(&input.ethnicity)
        .bind(input.date_of_birth)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the education step.
    pub async fn update_education(
        pool: &PgPool,
        id: DbId,
        education_level: Option<&str>,
        education: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET education_level = $2, education = $3 WHERE id = $1")
                .bind(id)
                .bind(education_level)
                .bind(education)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the skills step.
    pub async fn update_skills(pool: &PgPool, id: DbId, skills: &[String]) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET skills = $2 WHERE id = $1")
            .bind(id)
            .bind(skills)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp onboarding completion (and the claim time, if unset).
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn mark_onboarding_complete(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET
                onboarding_completed_at = NOW(),
                claimed_at = COALESCE(claimed_at, NOW())
             WHERE id = $1
             RETURNING onboarding_completed_at",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Members who finished onboarding, for amir pickers.
    pub async fn list_selectable(pool: &PgPool) -> Result<Vec<UserOptionRow>, sqlx::Error> {
        sqlx::query_as::<_, UserOptionRow>(
            "SELECT id, first_name, last_name, email FROM users
             WHERE onboarding_completed_at IS NOT NULL
             ORDER BY first_name NULLS LAST, last_name NULLS LAST",
        )
        .fetch_all(pool)
        .await
    }
}
