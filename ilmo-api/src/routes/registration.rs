/// Public registration pages
///
/// # Endpoints
///
/// - `GET /:alias/` - registration form with event, payment and attendee info
/// - `POST /:alias/` - submit the form (`application/x-www-form-urlencoded`)
/// - `GET /thanks` - confirmation page
///
/// A valid submission redirects (303) to `/thanks`. An invalid one re-renders
/// the form with the submitted values and per-field errors, status 422.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    templates::{field_views, render, RegistrationTemplate, ThanksTemplate},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use ilmo_shared::forms::DynamicForm;
use ilmo_shared::models::event::Event;
use ilmo_shared::registration::{get_event_details_by_url_alias, save_event_attendee};
use std::collections::HashMap;
use tracing::debug;

/// Generates the form from the event's stored specification
///
/// Specifications are checked on upload, so a failure here means the stored
/// data is broken.
fn stored_form(event: &Event) -> ApiResult<DynamicForm> {
    event.form().map_err(|e| {
        ApiError::InternalError(format!(
            "Stored field specification of '{}' is invalid: {}",
            event.url_alias, e
        ))
    })
}

pub async fn show_form(
    State(state): State<AppState>,
    Path(url_alias): Path<String>,
) -> ApiResult<Html<String>> {
    let details = get_event_details_by_url_alias(&state.db, &url_alias).await?;
    let form = stored_form(&details.event)?;

    let fields = field_views(&form, &HashMap::new(), &[]);
    render(&RegistrationTemplate::new(details, fields))
}

pub async fn submit_form(
    State(state): State<AppState>,
    Path(url_alias): Path<String>,
    Form(submitted): Form<HashMap<String, String>>,
) -> ApiResult<Response> {
    let details = get_event_details_by_url_alias(&state.db, &url_alias).await?;
    let form = stored_form(&details.event)?;

    match form.clean(&submitted) {
        Ok(cleaned) => {
            save_event_attendee(&state.db, &details.event, cleaned, &state.classifier).await?;
            Ok(Redirect::to("/thanks").into_response())
        }
        Err(errors) => {
            debug!(event = %url_alias, errors = errors.len(), "Registration rejected");

            let fields = field_views(&form, &submitted, &errors);
            let page = render(&RegistrationTemplate::new(details, fields))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn thanks() -> ApiResult<Html<String>> {
    render(&ThanksTemplate)
}
