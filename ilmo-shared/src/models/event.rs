/// Event model and database operations
///
/// Events are addressed publicly by their `url_alias`. The registration form
/// is stored alongside the event as a JSONB field specification.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     url_alias VARCHAR(100) NOT NULL UNIQUE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     starts_at TIMESTAMPTZ NOT NULL,
///     capacity INTEGER,
///     place_id UUID NOT NULL REFERENCES places(id),
///     payment_id UUID REFERENCES payments(id) ON DELETE SET NULL,
///     form_fields JSONB NOT NULL DEFAULT '[]',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ilmo_shared::models::event::Event;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(event) = Event::find_by_url_alias(&pool, "sitsit-2025").await? {
///     let full = event.is_full(&pool).await?;
///     println!("{} full: {}", event.title, full);
/// }
/// # Ok(())
/// # }
/// ```

use crate::forms::{generate_form, DynamicForm, FieldDescriptor, FieldSpecError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,

    /// Unique path segment used in public URLs
    pub url_alias: String,

    pub title: String,

    pub description: String,

    pub starts_at: DateTime<Utc>,

    /// Maximum number of regular attendees (None = unlimited)
    pub capacity: Option<i32>,

    pub place_id: Uuid,

    pub payment_id: Option<Uuid>,

    /// Registration form specification
    pub form_fields: Json<Vec<FieldDescriptor>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub url_alias: String,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub place_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub form_fields: Vec<FieldDescriptor>,
}

const EVENT_COLUMNS: &str = "id, url_alias, title, description, starts_at, capacity, \
                             place_id, payment_id, form_fields, created_at";

impl Event {
    /// Whether `attendee_count` registrations fill the event
    pub fn is_full_with(&self, attendee_count: i64) -> bool {
        match self.capacity {
            Some(capacity) => attendee_count >= i64::from(capacity),
            None => false,
        }
    }

    /// Whether the event has reached capacity right now
    ///
    /// Backup registrations count toward the total.
    pub async fn is_full(&self, pool: &PgPool) -> Result<bool, sqlx::Error> {
        if self.capacity.is_none() {
            return Ok(false);
        }
        let count = Self::attendee_count(pool, self.id).await?;
        Ok(self.is_full_with(count))
    }

    /// Builds the registration form from the stored specification
    pub fn form(&self) -> Result<DynamicForm, FieldSpecError> {
        generate_form(&self.form_fields.0)
    }

    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO events (url_alias, title, description, starts_at, capacity,
                                place_id, payment_id, form_fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(data.url_alias)
            .bind(data.title)
            .bind(data.description)
            .bind(data.starts_at)
            .bind(data.capacity)
            .bind(data.place_id)
            .bind(data.payment_id)
            .bind(Json(data.form_fields))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_url_alias(
        pool: &PgPool,
        url_alias: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM events WHERE url_alias = $1", EVENT_COLUMNS);
        sqlx::query_as::<_, Event>(&query)
            .bind(url_alias)
            .fetch_optional(pool)
            .await
    }

    /// Events starting at or after `now`, soonest first
    pub async fn list_upcoming(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM events WHERE starts_at >= $1 ORDER BY starts_at ASC",
            EVENT_COLUMNS
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Replaces the registration form specification
    ///
    /// Returns false if no event has the alias.
    pub async fn set_form_fields(
        pool: &PgPool,
        url_alias: &str,
        form_fields: Vec<FieldDescriptor>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET form_fields = $1 WHERE url_alias = $2")
            .bind(Json(form_fields))
            .bind(url_alias)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn attendee_count(pool: &PgPool, event_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// Deletes the event and, by cascade, its attendees
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
