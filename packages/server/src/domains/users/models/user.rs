use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::{Role, UserId};

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn find_by_id<'e>(id: UserId, executor: impl PgExecutor<'e>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Insert an account projection (seeding and tests; accounts are owned
    /// by the identity service).
    pub async fn create(email: &str, username: &str, role: Role, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (email, username, role)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(email)
        .bind(username)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
