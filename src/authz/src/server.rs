//! HTTP transport for the authorizer
//!
//! ## Endpoints
//!
//! - `POST /v1/authorize` - Authorizer event in, policy out (always 200,
//!   including for bodies that are not an event)
//! - `GET /health` - Health check

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::engine::{Authorizer, AuthorizerEvent};
use crate::error::AuthzError;
use crate::log_event::LogEvent;
use crate::policy::AuthorizerResult;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    authorizer: Arc<Authorizer>,
    start_time: Instant,
}

impl AppState {
    pub fn new(authorizer: Authorizer) -> Self {
        Self {
            authorizer: Arc::new(authorizer),
            start_time: Instant::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// POST /v1/authorize
async fn authorize(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizerEvent>, JsonRejection>,
) -> Json<AuthorizerResult> {
    let result = match payload {
        Ok(Json(event)) => state.authorizer.authorize(&event).await,
        Err(rejection) => {
            let mut log = LogEvent::default();
            log.fail(&AuthzError::MalformedEvent(rejection.body_text()));
            log.emit();
            AuthorizerResult::unauthorised()
        }
    };
    let decision = if result.is_allowed() { "ALLOW" } else { "DENY" };

    info!(
        decision,
        principal = %result.principal_id,
        "authorizer decision"
    );

    Json(result)
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    })
}

/// Create the HTTP router with all endpoints
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/v1/authorize", post(authorize))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
