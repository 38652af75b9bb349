use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    controllers::{parse_event_id, respond},
    error::ApiError,
    models::NewEvent,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/", any(missing_event_id))
        .route("/events/{id}", get(get_event))
}

// /events/ with no id
async fn missing_event_id() -> ApiError {
    ApiError::bad_request("Event ID required")
}

// POST /events
async fn create_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| {
        debug!("create_event: unreadable body: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;

    if let Err(errors) = body.validate() {
        debug!("create_event: {}", errors);
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let event = state
        .store
        .create_event(&body)
        .await
        .map_err(|e| ApiError::storage("Failed to create event", e))?;

    info!(event_id = event.id, capacity = event.capacity, "Event created");
    Ok(respond(StatusCode::CREATED, "Event created successfully", event))
}

// GET /events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| ApiError::storage("Failed to fetch events", e))?;

    Ok(respond(StatusCode::OK, "Events fetched successfully", events))
}

// GET /events/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&raw_id).ok_or_else(|| ApiError::not_found("Event not found"))?;

    let event = state
        .store
        .get_event(event_id)
        .await
        .map_err(|e| ApiError::storage("Failed to fetch event", e))?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(respond(StatusCode::OK, "Event fetched successfully", event))
}
