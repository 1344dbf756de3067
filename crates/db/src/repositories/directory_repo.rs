//! Snapshot queries for the member directory.

use sqlx::PgPool;

use crate::models::directory::DirectoryUser;

pub struct DirectoryRepo;

impl DirectoryRepo {
    /// Every member, claimed members first (most recently claimed first).
    pub async fn list_users(pool: &PgPool) -> Result<Vec<DirectoryUser>, sqlx::Error> {
        sqlx::query_as::<_, DirectoryUser>(
            "SELECT id, first_name, last_name, email, avatar_url, skills, claimed_at
             FROM users
             ORDER BY claimed_at DESC NULLS LAST, id",
        )
        .fetch_all(pool)
        .await
    }
}
