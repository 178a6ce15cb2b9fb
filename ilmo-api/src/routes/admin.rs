/// Admin endpoints
///
/// Every route here sits behind the admin bearer token (see
/// [`crate::app::admin_auth_layer`]).
///
/// # Endpoints
///
/// - `POST /admin/places` - create a place
/// - `POST /admin/payments` - create payment details
/// - `POST /admin/events` - create an event with its field specification
/// - `PUT /admin/events/:alias/fields` - replace an event's field specification
/// - `GET /admin/events/:alias/attendees` - list an event's attendees
/// - `POST /admin/attendees/mark-paid` - mark attendees as paid
/// - `POST /admin/attendees/export` - download attendees as CSV

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use ilmo_shared::{
    export::{export_eventattendees_csv, EXPORT_FILENAME},
    forms::{generate_form, validate_field_spec, FieldDescriptor},
    gender::Gender,
    models::{
        attendee::EventAttendee,
        event::{CreateEvent, Event},
        payment::{CreatePayment, Payment},
        place::{CreatePlace, Place},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: String,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, max = 255, message = "Recipient must be 1-255 characters"))]
    pub recipient: String,

    /// IBAN
    #[validate(length(min = 5, max = 64, message = "Account number must be 5-64 characters"))]
    pub account_number: String,

    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount_cents: i64,

    pub due_date: Option<NaiveDate>,

    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Path segment of the public registration page
    #[validate(length(min = 1, max = 100, message = "URL alias must be 1-100 characters"))]
    pub url_alias: String,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub starts_at: DateTime<Utc>,

    /// Omitted for unlimited events
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,

    pub place_id: Uuid,

    pub payment_id: Option<Uuid>,

    /// Field specification, checked like an upload
    #[serde(default = "empty_spec")]
    pub form_fields: Value,
}

fn empty_spec() -> Value {
    Value::Array(Vec::new())
}

/// Attendee ids selected for a bulk action
#[derive(Debug, Deserialize)]
pub struct AttendeeSelection {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MarkPaidResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct FieldSpecResponse {
    pub url_alias: String,
    pub fields: usize,
}

#[derive(Debug, Serialize)]
pub struct AttendeeResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    pub details: Map<String, Value>,
    pub isbackup: bool,
    pub haspaid: bool,
    pub registration_date: DateTime<Utc>,
    pub reference_number: String,
}

impl From<EventAttendee> for AttendeeResponse {
    fn from(attendee: EventAttendee) -> Self {
        Self {
            id: attendee.id,
            details: attendee.details(),
            reference_number: attendee.reference_number(),
            name: attendee.attendee_name,
            email: attendee.attendee_email,
            phone: attendee.attendee_phone,
            gender: attendee.attendee_gender,
            isbackup: attendee.isbackup,
            haspaid: attendee.haspaid,
            registration_date: attendee.registration_date,
        }
    }
}

/// Url aliases are used as a single path segment
fn check_url_alias(url_alias: &str) -> ApiResult<()> {
    let valid = url_alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid || url_alias == "admin" || url_alias == "health" || url_alias == "thanks" {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "url_alias".to_string(),
            message: "URL alias may only contain letters, digits, '-' and '_', and must not be a reserved path"
                .to_string(),
        }]));
    }
    Ok(())
}

/// Checks a field specification and makes sure every field can be built
fn accept_field_spec(payload: &[u8]) -> ApiResult<Vec<FieldDescriptor>> {
    let descriptors = validate_field_spec(payload)?;
    generate_form(&descriptors)?;
    Ok(descriptors)
}

pub async fn create_place(
    State(state): State<AppState>,
    Json(req): Json<CreatePlaceRequest>,
) -> ApiResult<(StatusCode, Json<Place>)> {
    req.validate()?;

    let place = Place::create(
        &state.db,
        CreatePlace {
            name: req.name,
            address: req.address,
            description: req.description,
        },
    )
    .await?;

    info!(place_id = %place.id, "Place created");
    Ok((StatusCode::CREATED, Json(place)))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    req.validate()?;

    let payment = Payment::create(
        &state.db,
        CreatePayment {
            recipient: req.recipient,
            account_number: req.account_number,
            amount_cents: req.amount_cents,
            due_date: req.due_date,
            instructions: req.instructions,
        },
    )
    .await?;

    info!(payment_id = %payment.id, "Payment created");
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    req.validate()?;
    check_url_alias(&req.url_alias)?;

    let payload = serde_json::to_vec(&req.form_fields)
        .map_err(|e| ApiError::BadRequest(format!("Invalid field specification: {}", e)))?;
    let form_fields = accept_field_spec(&payload)?;

    let event = Event::create(
        &state.db,
        CreateEvent {
            url_alias: req.url_alias,
            title: req.title,
            description: req.description,
            starts_at: req.starts_at,
            capacity: req.capacity,
            place_id: req.place_id,
            payment_id: req.payment_id,
            form_fields,
        },
    )
    .await?;

    info!(event = %event.url_alias, event_id = %event.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Replaces the field specification
///
/// The body is the raw JSON array. Nothing is stored unless every descriptor
/// passes.
pub async fn upload_field_spec(
    State(state): State<AppState>,
    Path(url_alias): Path<String>,
    body: Bytes,
) -> ApiResult<Json<FieldSpecResponse>> {
    let descriptors = accept_field_spec(&body)?;
    let fields = descriptors.len();

    if !Event::set_form_fields(&state.db, &url_alias, descriptors).await? {
        return Err(ApiError::NotFound(format!("No event with alias '{}'", url_alias)));
    }

    info!(event = %url_alias, fields, "Field specification updated");
    Ok(Json(FieldSpecResponse { url_alias, fields }))
}

pub async fn list_attendees(
    State(state): State<AppState>,
    Path(url_alias): Path<String>,
) -> ApiResult<Json<Vec<AttendeeResponse>>> {
    let event = Event::find_by_url_alias(&state.db, &url_alias)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No event with alias '{}'", url_alias)))?;

    let attendees = EventAttendee::list_by_event(&state.db, event.id).await?;
    Ok(Json(attendees.into_iter().map(AttendeeResponse::from).collect()))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Json(selection): Json<AttendeeSelection>,
) -> ApiResult<Json<MarkPaidResponse>> {
    let updated = EventAttendee::mark_as_paid(&state.db, &selection.ids).await?;

    info!(selected = selection.ids.len(), updated, "Attendees marked as paid");
    Ok(Json(MarkPaidResponse { updated }))
}

pub async fn export_attendees(
    State(state): State<AppState>,
    Json(selection): Json<AttendeeSelection>,
) -> ApiResult<Response> {
    let rows = EventAttendee::export_rows(&state.db, &selection.ids).await?;
    let csv = export_eventattendees_csv(&rows)?;

    info!(rows = rows.len(), bytes = csv.len(), "Attendees exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", EXPORT_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}
