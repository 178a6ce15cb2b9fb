/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use ilmo_api::{app::AppState, config::Config};
/// use ilmo_shared::gender::GenderClassifier;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let classifier = GenderClassifier::load(&config.resource_path)?;
/// let state = AppState::new(pool, config, classifier);
/// let app = ilmo_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use ilmo_shared::gender::GenderClassifier;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Name lists loaded at startup
    pub classifier: Arc<GenderClassifier>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, classifier: GenderClassifier) -> Self {
        Self {
            db,
            config: Arc::new(config),
            classifier: Arc::new(classifier),
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.config.admin.token
    }
}

/// Builds the router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /                              # upcoming events
/// ├── GET  /health
/// ├── GET  /thanks
/// ├── GET|POST /:alias/                   # registration form
/// └── /admin/                             # bearer token required
///     ├── POST /places
///     ├── POST /payments
///     ├── POST /events
///     ├── PUT  /events/:alias/fields
///     ├── GET  /events/:alias/attendees
///     ├── POST /attendees/mark-paid
///     └── POST /attendees/export
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::events::list_events))
        .route("/health", get(routes::health::health_check))
        .route("/thanks", get(routes::registration::thanks))
        .route(
            "/:alias/",
            get(routes::registration::show_form).post(routes::registration::submit_form),
        );

    let admin_routes = Router::new()
        .route("/places", post(routes::admin::create_place))
        .route("/payments", post(routes::admin::create_payment))
        .route("/events", post(routes::admin::create_event))
        .route("/events/:alias/fields", put(routes::admin::upload_field_spec))
        .route("/events/:alias/attendees", get(routes::admin::list_attendees))
        .route("/attendees/mark-paid", post(routes::admin::mark_paid))
        .route("/attendees/export", post(routes::admin::export_attendees))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Admin authentication middleware
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>`.
pub async fn admin_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    if !token_matches(token, state.admin_token()) {
        tracing::warn!(path = %req.uri().path(), "Rejected admin request with invalid token");
        return Err(ApiError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(next.run(req).await)
}

/// Compares without short-circuiting on the first differing byte
fn token_matches(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
