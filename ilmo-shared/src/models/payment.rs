/// Payment details model
///
/// Events that cost money point at one payment record; attendees pay to
/// `account_number` using their own reference number.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE payments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipient VARCHAR(255) NOT NULL,
///     account_number VARCHAR(64) NOT NULL,
///     amount_cents BIGINT NOT NULL CHECK (amount_cents >= 0),
///     due_date DATE,
///     instructions TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,

    /// Name of the account holder
    pub recipient: String,

    /// IBAN the fee is paid to
    pub account_number: String,

    /// Fee in euro cents
    pub amount_cents: i64,

    pub due_date: Option<NaiveDate>,

    /// Free-form payment instructions shown on the registration page
    pub instructions: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayment {
    pub recipient: String,
    pub account_number: String,
    pub amount_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub instructions: Option<String>,
}

impl Payment {
    /// Fee formatted as euros, e.g. `12.50`
    pub fn amount_display(&self) -> String {
        format!("{}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }

    pub async fn create(pool: &PgPool, data: CreatePayment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (recipient, account_number, amount_cents, due_date, instructions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, recipient, account_number, amount_cents, due_date, instructions, created_at
            "#,
        )
        .bind(data.recipient)
        .bind(data.account_number)
        .bind(data.amount_cents)
        .bind(data.due_date)
        .bind(data.instructions)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, recipient, account_number, amount_cents, due_date, instructions, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_display() {
        let payment = Payment {
            id: Uuid::new_v4(),
            recipient: "Kilta ry".to_string(),
            account_number: "FI21 1234 5600 0007 85".to_string(),
            amount_cents: 1250,
            due_date: None,
            instructions: None,
            created_at: Utc::now(),
        };
        assert_eq!(payment.amount_display(), "12.50");

        let free = Payment { amount_cents: 5, ..payment };
        assert_eq!(free.amount_display(), "0.05");
    }
}
