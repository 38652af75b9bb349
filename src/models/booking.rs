use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub event_id: i64,
    pub user_email: String,
    pub user_name: String,
    pub quantity: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// A booking intent, as submitted to `POST /bookings`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewBooking {
    #[validate(range(min = 1))]
    pub event_id: i64,
    #[validate(length(min = 1))]
    pub user_email: String,
    #[validate(length(min = 1))]
    pub user_name: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
}
