/// HTML pages
///
/// Templates live in `ilmo-api/templates/`. Handlers hand them flat view
/// structs so the markup only deals with strings, booleans and lists.

use crate::error::ApiResult;
use askama::Template;
use axum::response::Html;
use chrono::{DateTime, Utc};
use ilmo_shared::forms::{DynamicForm, FieldError, FieldKind};
use ilmo_shared::models::event::Event;
use ilmo_shared::registration::{AttendeeSummary, EventDetails};
use std::collections::HashMap;

/// Renders a template into an HTML response
pub fn render<T: Template>(template: &T) -> ApiResult<Html<String>> {
    Ok(Html(template.render()?))
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format("%d.%m.%Y %H:%M").to_string()
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub events: Vec<EventListItem>,
}

pub struct EventListItem {
    pub url_alias: String,
    pub title: String,
    pub starts_at: String,
}

impl From<&Event> for EventListItem {
    fn from(event: &Event) -> Self {
        Self {
            url_alias: event.url_alias.clone(),
            title: event.title.clone(),
            starts_at: format_datetime(&event.starts_at),
        }
    }
}

#[derive(Template)]
#[template(path = "thanks.html")]
pub struct ThanksTemplate;

#[derive(Template)]
#[template(path = "registration.html")]
pub struct RegistrationTemplate {
    pub url_alias: String,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub place_name: String,
    pub place_address: String,
    pub payment: Option<PaymentView>,
    pub attendees: Vec<AttendeeSummary>,

    /// New registrations will be stored as backups
    pub is_full: bool,

    pub fields: Vec<FieldView>,
    pub has_errors: bool,
}

pub struct PaymentView {
    pub recipient: String,
    pub account_number: String,
    pub amount: String,
    pub due_date: String,
    pub instructions: String,
}

/// One rendered input
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub required: bool,

    /// `text`, `email`, `textarea`, `number`, `select`, `radio` or `checkbox`
    pub widget: &'static str,

    pub value: String,
    pub checked: bool,
    pub max_length: Option<usize>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub choices: Vec<ChoiceView>,
    pub errors: Vec<String>,
}

pub struct ChoiceView {
    pub value: String,
    pub selected: bool,
}

fn widget(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text { .. } => "text",
        FieldKind::Email => "email",
        FieldKind::Textarea { .. } => "textarea",
        FieldKind::Integer { .. } => "number",
        FieldKind::Select { .. } => "select",
        FieldKind::RadioSelect { .. } => "radio",
        FieldKind::Checkbox => "checkbox",
    }
}

fn is_checked(raw: Option<&String>) -> bool {
    !matches!(raw.map(String::as_str), None | Some("") | Some("false") | Some("0") | Some("off"))
}

/// Builds field views, refilled with `submitted` values and their errors
pub fn field_views(
    form: &DynamicForm,
    submitted: &HashMap<String, String>,
    errors: &[FieldError],
) -> Vec<FieldView> {
    form.fields()
        .iter()
        .map(|field| {
            let value = submitted.get(&field.name).cloned().unwrap_or_default();
            let (max_length, min_value, max_value) = match &field.kind {
                FieldKind::Text { max_length } | FieldKind::Textarea { max_length } => {
                    (Some(*max_length), None, None)
                }
                FieldKind::Integer {
                    min_value,
                    max_value,
                } => (None, Some(*min_value), Some(*max_value)),
                _ => (None, None, None),
            };

            FieldView {
                name: field.name.clone(),
                label: field.label.clone(),
                required: field.required,
                widget: widget(&field.kind),
                checked: is_checked(submitted.get(&field.name)),
                max_length,
                min_value,
                max_value,
                choices: field
                    .kind
                    .choices()
                    .iter()
                    .map(|choice| ChoiceView {
                        value: choice.clone(),
                        selected: *choice == value,
                    })
                    .collect(),
                errors: errors
                    .iter()
                    .filter(|e| e.field == field.name)
                    .map(|e| e.message.clone())
                    .collect(),
                value,
            }
        })
        .collect()
}

impl RegistrationTemplate {
    pub fn new(details: EventDetails, fields: Vec<FieldView>) -> Self {
        let is_full = details.event.is_full_with(details.attendees.len() as i64);
        let has_errors = fields.iter().any(|f| !f.errors.is_empty());

        Self {
            url_alias: details.event.url_alias,
            title: details.event.title,
            description: details.event.description,
            starts_at: format_datetime(&details.event.starts_at),
            place_name: details.place.name,
            place_address: details.place.address,
            payment: details.payment.map(|payment| PaymentView {
                amount: payment.amount_display(),
                due_date: payment
                    .due_date
                    .map(|d| d.format("%d.%m.%Y").to_string())
                    .unwrap_or_default(),
                instructions: payment.instructions.unwrap_or_default(),
                recipient: payment.recipient,
                account_number: payment.account_number,
            }),
            attendees: details.attendees,
            is_full,
            fields,
            has_errors,
        }
    }
}
