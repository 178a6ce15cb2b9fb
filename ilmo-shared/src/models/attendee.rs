/// Event attendee model and database operations
///
/// One row per registration. Answers outside the fixed name/email/phone
/// columns are kept as JSON text in `attendee_details`; the column is plain
/// TEXT, so readers must tolerate content that does not decode.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE attendee_gender AS ENUM ('male', 'female', 'unknown');
///
/// CREATE TABLE event_attendees (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
///     attendee_name VARCHAR(255) NOT NULL,
///     attendee_email VARCHAR(255) NOT NULL,
///     attendee_phone VARCHAR(64) NOT NULL,
///     attendee_gender attendee_gender NOT NULL DEFAULT 'unknown',
///     attendee_details TEXT NOT NULL DEFAULT '{}',
///     isbackup BOOLEAN NOT NULL DEFAULT FALSE,
///     haspaid BOOLEAN NOT NULL DEFAULT FALSE,
///     registration_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     reference_seq BIGINT GENERATED ALWAYS AS IDENTITY
/// );
/// ```

use crate::gender::Gender;
use crate::reference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventAttendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: String,
    pub attendee_gender: Gender,

    /// JSON object of the extra answers
    pub attendee_details: String,

    /// Registered after the event was already full
    pub isbackup: bool,

    pub haspaid: bool,

    pub registration_date: DateTime<Utc>,

    /// Sequence number the payment reference is derived from
    pub reference_seq: i64,
}

/// Input for inserting an attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventAttendee {
    pub event_id: Uuid,
    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: String,
    pub attendee_gender: Gender,
    pub attendee_details: String,
    pub isbackup: bool,
    pub registration_date: DateTime<Utc>,
}

/// Attendee row joined with its event title, as used by exports
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendeeExportRow {
    pub event_title: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: String,
    pub attendee_details: String,
}

const ATTENDEE_COLUMNS: &str = "id, event_id, attendee_name, attendee_email, attendee_phone, \
                                attendee_gender, attendee_details, isbackup, haspaid, \
                                registration_date, reference_seq";

/// Decodes a details blob, yielding an empty map for anything but a JSON object
pub fn decode_details(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl EventAttendee {
    /// Payment reference number for this attendee
    pub fn reference_number(&self) -> String {
        reference::reference_number(self.reference_seq)
    }

    /// Extra answers, empty if the stored JSON is malformed
    pub fn details(&self) -> Map<String, Value> {
        decode_details(&self.attendee_details)
    }

    pub async fn create(pool: &PgPool, data: CreateEventAttendee) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO event_attendees (event_id, attendee_name, attendee_email, attendee_phone,
                                         attendee_gender, attendee_details, isbackup,
                                         registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ATTENDEE_COLUMNS
        );

        sqlx::query_as::<_, EventAttendee>(&query)
            .bind(data.event_id)
            .bind(data.attendee_name)
            .bind(data.attendee_email)
            .bind(data.attendee_phone)
            .bind(data.attendee_gender)
            .bind(data.attendee_details)
            .bind(data.isbackup)
            .bind(data.registration_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM event_attendees WHERE id = $1", ATTENDEE_COLUMNS);
        sqlx::query_as::<_, EventAttendee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All attendees of an event in registration order
    pub async fn list_by_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM event_attendees WHERE event_id = $1 \
             ORDER BY registration_date ASC, reference_seq ASC",
            ATTENDEE_COLUMNS
        );
        sqlx::query_as::<_, EventAttendee>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Sets `haspaid` on exactly the given attendees in one statement
    ///
    /// Returns the number of rows updated.
    pub async fn mark_as_paid(pool: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE event_attendees SET haspaid = TRUE WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Export rows for the given attendees, in registration order
    pub async fn export_rows(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<AttendeeExportRow>, sqlx::Error> {
        sqlx::query_as::<_, AttendeeExportRow>(
            r#"
            SELECT e.title AS event_title, a.attendee_name, a.attendee_email,
                   a.attendee_phone, a.attendee_details
            FROM event_attendees a
            JOIN events e ON e.id = a.event_id
            WHERE a.id = ANY($1)
            ORDER BY a.registration_date ASC, a.reference_seq ASC
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
