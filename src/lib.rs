pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    error::InitError,
    services::{BookingController, InventoryStore},
};

// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub store: InventoryStore,
    pub bookings: BookingController,
    pub config: config::Config,
}

impl AppState {
    /// Connects to the database, applies migrations and wires the services.
    pub async fn new(config: config::Config) -> Result<Arc<Self>, InitError> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.run_migrations().await?;

        Ok(Self::with_database(db, config))
    }

    fn with_database(db: database::Database, config: config::Config) -> Arc<Self> {
        let store = InventoryStore::new(db.clone());
        let bookings = BookingController::new(store.clone(), config.booking.lock_scope);
        info!("Booking admission lock scope: {}", bookings.lock_scope());

        Arc::new(Self {
            db,
            store,
            bookings,
            config,
        })
    }
}

/// The full HTTP surface: API routes, health check, static files.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.app.static_dir);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .method_not_allowed_fallback(controllers::method_not_allowed)
        .fallback_service(static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
