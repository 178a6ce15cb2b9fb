/// Attendee registration and event detail aggregation
///
/// [`save_event_attendee`] turns a cleaned form submission into a stored
/// attendee. The pure half, [`CreateEventAttendee::from_submission`], is kept
/// apart from the insert so it can be exercised without a database.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use ilmo_shared::gender::{Gender, GenderClassifier};
/// use ilmo_shared::models::attendee::CreateEventAttendee;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// let classifier = GenderClassifier::new(["Matti"], ["Jane"]);
/// let data = json!({"name": "Jane Doe", "email": "j@example.com", "phone": "123", "extra": "x"});
///
/// let attendee = CreateEventAttendee::from_submission(
///     Uuid::new_v4(),
///     false,
///     data.as_object().unwrap().clone(),
///     &classifier,
///     Utc::now(),
/// )
/// .unwrap();
///
/// assert_eq!(attendee.attendee_gender, Gender::Female);
/// assert_eq!(attendee.attendee_details, r#"{"extra":"x"}"#);
/// ```

use crate::gender::GenderClassifier;
use crate::models::attendee::{CreateEventAttendee, EventAttendee};
use crate::models::event::Event;
use crate::models::payment::Payment;
use crate::models::place::Place;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Placeholder stored when name, email or phone was not asked
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("No event with alias '{0}'")]
    EventNotFound(String),

    #[error("Place {0} referenced by event does not exist")]
    MissingPlace(Uuid),

    #[error("Payment {0} referenced by event does not exist")]
    MissingPayment(Uuid),

    #[error("Failed to encode attendee details: {0}")]
    Details(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Rewrites booleans to "Yes"/"No", leaving other values untouched
pub fn normalize_booleans(data: Map<String, Value>) -> Map<String, Value> {
    data.into_iter()
        .map(|(key, value)| match value {
            Value::Bool(true) => (key, Value::String("Yes".to_string())),
            Value::Bool(false) => (key, Value::String("No".to_string())),
            other => (key, other),
        })
        .collect()
}

fn text_or_placeholder(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => NOT_AVAILABLE.to_string(),
        Some(other) => other.to_string(),
    }
}

impl CreateEventAttendee {
    /// Builds the insert for a cleaned submission
    ///
    /// `name`, `email` and `phone` are moved out of `data` (defaulting to
    /// "N/A"); everything left is encoded, in submission order, as the details
    /// JSON. `isbackup` records `event_is_full` as it was at this moment.
    pub fn from_submission(
        event_id: Uuid,
        event_is_full: bool,
        data: Map<String, Value>,
        classifier: &GenderClassifier,
        registration_date: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let (mut name, mut email, mut phone) = (None, None, None);
        let mut extra = Map::new();

        for (key, value) in normalize_booleans(data) {
            match key.as_str() {
                "name" => name = Some(value),
                "email" => email = Some(value),
                "phone" => phone = Some(value),
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        let name = text_or_placeholder(name);
        let email = text_or_placeholder(email);
        let phone = text_or_placeholder(phone);

        let gender = classifier.classify(&name);
        let details = serde_json::to_string(&extra)?;

        Ok(Self {
            event_id,
            attendee_name: name,
            attendee_email: email,
            attendee_phone: phone,
            attendee_gender: gender,
            attendee_details: details,
            isbackup: event_is_full,
            registration_date,
        })
    }
}

/// Stores a registration for `event`
///
/// Fullness is read immediately before the insert; the two statements are not
/// wrapped in a transaction.
pub async fn save_event_attendee(
    pool: &PgPool,
    event: &Event,
    data: Map<String, Value>,
    classifier: &GenderClassifier,
) -> Result<EventAttendee, RegistrationError> {
    let is_full = event.is_full(pool).await?;
    let new_attendee =
        CreateEventAttendee::from_submission(event.id, is_full, data, classifier, Utc::now())?;

    let attendee = EventAttendee::create(pool, new_attendee).await?;

    info!(
        event = %event.url_alias,
        attendee_id = %attendee.id,
        isbackup = attendee.isbackup,
        "Attendee registered"
    );
    Ok(attendee)
}

/// Public view of one attendee on the event page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeSummary {
    pub attendee_name: String,
    pub is_backup: bool,
    pub reference_number: String,
}

impl From<&EventAttendee> for AttendeeSummary {
    fn from(attendee: &EventAttendee) -> Self {
        Self {
            attendee_name: attendee.attendee_name.clone(),
            is_backup: attendee.isbackup,
            reference_number: attendee.reference_number(),
        }
    }
}

/// Everything the registration page shows about an event
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    pub event: Event,
    pub place: Place,
    pub payment: Option<Payment>,
    pub attendees: Vec<AttendeeSummary>,
}

/// Loads an event by alias together with its place, payment and attendees
///
/// # Errors
///
/// `EventNotFound` if no event has the alias.
pub async fn get_event_details_by_url_alias(
    pool: &PgPool,
    url_alias: &str,
) -> Result<EventDetails, RegistrationError> {
    let event = Event::find_by_url_alias(pool, url_alias)
        .await?
        .ok_or_else(|| RegistrationError::EventNotFound(url_alias.to_string()))?;

    let place = Place::find_by_id(pool, event.place_id)
        .await?
        .ok_or(RegistrationError::MissingPlace(event.place_id))?;

    let payment = match event.payment_id {
        Some(payment_id) => Some(
            Payment::find_by_id(pool, payment_id)
                .await?
                .ok_or(RegistrationError::MissingPayment(payment_id))?,
        ),
        None => None,
    };

    let attendees = EventAttendee::list_by_event(pool, event.id)
        .await?
        .iter()
        .map(AttendeeSummary::from)
        .collect::<Vec<_>>();

    debug!(event = %event.url_alias, attendees = attendees.len(), "Loaded event details");

    Ok(EventDetails {
        event,
        place,
        payment,
        attendees,
    })
}
