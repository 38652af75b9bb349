use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub capacity: i64,
    pub available: i64,
    pub price: f64,
    pub organizer_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /events`. Missing fields fall back to their zero values
/// and are then caught by validation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewEvent {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: String,
    #[validate(length(min = 1))]
    pub date: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(range(min = 1))]
    pub capacity: i64,
    pub price: f64,
    pub organizer_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation() {
        let body: NewEvent = serde_json::from_str(r#"{"name": "Rust Meetup"}"#).unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("date"));
        assert!(fields.contains_key("location"));
        assert!(fields.contains_key("capacity"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn complete_event_passes_validation() {
        let body = NewEvent {
            name: "Rust Meetup".into(),
            description: String::new(),
            date: "2026-11-01".into(),
            location: "Almaty".into(),
            capacity: 50,
            price: 10.0,
            organizer_id: 1,
        };
        assert!(body.validate().is_ok());
    }
}
