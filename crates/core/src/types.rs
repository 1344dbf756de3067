/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Subject of an identity-provider token (the `auth_id` column on `users`).
pub type AuthId = uuid::Uuid;
