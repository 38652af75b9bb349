use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{
    controllers::{parse_event_id, respond},
    error::ApiError,
    models::NewBooking,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/check", get(check_availability))
}

/* ---------- BOOKINGS ---------- */

// POST /bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(intent) = payload.map_err(|e| {
        debug!("create_booking: unreadable body: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;

    let booking = state.bookings.book(intent).await?;

    Ok(respond(StatusCode::CREATED, "Booking confirmed successfully", booking))
}

#[derive(Debug, Deserialize)]
struct BookingsQuery {
    email: Option<String>,
}

// GET /bookings?email=
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let email = params.email.as_deref().filter(|e| !e.is_empty());

    let bookings = state
        .store
        .list_bookings(email)
        .await
        .map_err(|e| ApiError::storage("Failed to fetch bookings", e))?;

    Ok(respond(StatusCode::OK, "Bookings fetched successfully", bookings))
}

/* ---------- AVAILABILITY ---------- */

#[derive(Debug, Deserialize)]
struct CheckQuery {
    event_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Availability {
    event_id: i64,
    available: i64,
}

// GET /bookings/check?event_id=
// Advisory: does not take the admission lock, so the count may already be stale.
async fn check_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = params
        .event_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("event_id parameter required"))?;

    let event_id = parse_event_id(&raw).ok_or_else(|| ApiError::not_found("Event not found"))?;

    let available = state
        .store
        .available_seats(event_id)
        .await
        .map_err(|e| ApiError::storage("Failed to check availability", e))?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(respond(
        StatusCode::OK,
        "Availability checked",
        Availability { event_id, available },
    ))
}
