/// Venue model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE places (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     address VARCHAR(512) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Where an event takes place
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlace {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
}

impl Place {
    pub async fn create(pool: &PgPool, data: CreatePlace) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places (name, address, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.address)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Place>(
            "SELECT id, name, address, description, created_at FROM places WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
