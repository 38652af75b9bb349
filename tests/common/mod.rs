#![allow(dead_code)]

use std::sync::Arc;

use event_ticketing::{
    config::{Config, LockScope},
    models::{Event, NewBooking, NewEvent},
    AppState,
};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use tempfile::TempDir;

async fn state_at(url: String, pool_size: u32, scope: LockScope) -> Arc<AppState> {
    let scope = scope.to_string();
    let pool_size = pool_size.to_string();
    let config = Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some(url.clone()),
        "DB_POOL_SIZE" => Some(pool_size.clone()),
        "BOOKING_LOCK_SCOPE" => Some(scope.clone()),
        "STATIC_DIR" => Some("./public-test-missing".to_string()),
        _ => None,
    })
    .expect("test configuration");

    AppState::new(config).await.expect("test app state")
}

/// Fresh app state backed by its own in-memory database.
pub async fn test_state(scope: LockScope) -> Arc<AppState> {
    state_at("sqlite::memory:".to_string(), 1, scope).await
}

/// App state on a WAL database file with a multi-connection pool.
/// The file lives as long as the returned directory.
pub async fn file_state(scope: LockScope, pool_size: u32) -> (Arc<AppState>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("tickets.db").display());
    (state_at(url, pool_size, scope).await, dir)
}

pub fn new_event(name: &str, date: &str, capacity: i64) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        description: format!("{name} description"),
        date: date.to_string(),
        location: "Hall A".to_string(),
        capacity,
        price: 49.5,
        organizer_id: 1,
    }
}

pub async fn seed_event(state: &AppState, capacity: i64) -> Event {
    state
        .store
        .create_event(&new_event("Load Test Live", "2026-12-31", capacity))
        .await
        .expect("seed event")
}

/// A booking intent from a generated requester.
pub fn intent(event_id: i64, quantity: i64) -> NewBooking {
    NewBooking {
        event_id,
        user_email: SafeEmail().fake(),
        user_name: Name().fake(),
        quantity,
    }
}

pub async fn confirmed_total(state: &AppState, event_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quantity), 0) FROM bookings WHERE event_id = ?1 AND status = 'confirmed'",
    )
    .bind(event_id)
    .fetch_one(&state.db.pool)
    .await
    .expect("sum of confirmed bookings")
}

pub async fn available(state: &AppState, event_id: i64) -> i64 {
    state
        .store
        .available_seats(event_id)
        .await
        .expect("availability read")
        .expect("event exists")
}
