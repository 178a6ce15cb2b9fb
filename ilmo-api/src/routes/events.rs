/// Public event list
///
/// ```text
/// GET /
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    templates::{render, EventListItem, EventsTemplate},
};
use axum::{extract::State, response::Html};
use chrono::Utc;
use ilmo_shared::models::event::Event;

/// Lists events that have not started yet, soonest first
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let events = Event::list_upcoming(&state.db, Utc::now()).await?;
    tracing::debug!(count = events.len(), "Listing upcoming events");

    render(&EventsTemplate {
        events: events.iter().map(EventListItem::from).collect(),
    })
}
