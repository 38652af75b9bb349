//! Inventory store: durable events and bookings.
//!
//! Pool-level methods are advisory reads and event creation. The
//! transactional primitives (`read_available`, `decrement_available`,
//! `insert_booking`) take an open connection so the admission controller
//! can compose them into one all-or-nothing unit.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqliteExecutor, Transaction};

use crate::{
    database::Database,
    models::{Booking, BookingStatus, Event, NewBooking, NewEvent},
};

const EVENT_COLUMNS: &str =
    "id, name, description, date, location, capacity, available, price, organizer_id, created_at";

const BOOKING_COLUMNS: &str = "id, event_id, user_email, user_name, quantity, status, created_at";

/// Outcome of a conditional seat decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    Applied { remaining: i64 },
    Insufficient { available: i64 },
    EventMissing,
}

#[derive(Clone)]
pub struct InventoryStore {
    db: Database,
}

impl InventoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.db.pool.begin().await
    }

    /// Inserts a new event with every seat available.
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, description, date, location, capacity, available, price, organizer_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7, ?8)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.price)
        .bind(event.organizer_id)
        .bind(Utc::now())
        .fetch_one(&self.db.pool)
        .await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY date, id"
        ))
        .fetch_all(&self.db.pool)
        .await
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))
            .bind(event_id)
            .fetch_optional(&self.db.pool)
            .await
    }

    pub async fn list_bookings(&self, email: Option<&str>) -> Result<Vec<Booking>, sqlx::Error> {
        match email {
            Some(email) => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_email = ?1 ORDER BY id"
                ))
                .bind(email)
                .fetch_all(&self.db.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id"
                ))
                .fetch_all(&self.db.pool)
                .await
            }
        }
    }

    /// Advisory availability read, outside any admission unit.
    pub async fn available_seats(&self, event_id: i64) -> Result<Option<i64>, sqlx::Error> {
        Self::read_available(&self.db.pool, event_id).await
    }

    /// Current available count, or `None` when the event does not exist.
    pub async fn read_available<'e, E>(executor: E, event_id: i64) -> Result<Option<i64>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT available FROM events WHERE id = ?1")
            .bind(event_id)
            .fetch_optional(executor)
            .await
    }

    /// Takes `quantity` seats if at least that many are left.
    ///
    /// The check and the write are one conditional `UPDATE`, so the unit
    /// takes the write lock on its first statement. When nothing was
    /// updated the current count is read back to tell a missing event from
    /// a short one.
    pub async fn decrement_available(
        conn: &mut SqliteConnection,
        event_id: i64,
        quantity: i64,
    ) -> Result<Decrement, sqlx::Error> {
        let remaining = sqlx::query_scalar::<_, i64>(
            "UPDATE events
             SET available = available - ?2
             WHERE id = ?1 AND available >= ?2
             RETURNING available",
        )
        .bind(event_id)
        .bind(quantity)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(Decrement::Applied { remaining });
        }

        Ok(match Self::read_available(&mut *conn, event_id).await? {
            Some(available) => Decrement::Insufficient { available },
            None => Decrement::EventMissing,
        })
    }

    pub async fn insert_booking(
        conn: &mut SqliteConnection,
        booking: &NewBooking,
        status: BookingStatus,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (event_id, user_email, user_name, quantity, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking.event_id)
        .bind(&booking.user_email)
        .bind(&booking.user_name)
        .bind(booking.quantity)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> InventoryStore {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        db.run_migrations().await.unwrap();
        InventoryStore::new(db)
    }

    fn concert(capacity: i64) -> NewEvent {
        NewEvent {
            name: "Concert".into(),
            description: "Open air".into(),
            date: "2026-12-01".into(),
            location: "Main square".into(),
            capacity,
            price: 25.0,
            organizer_id: 7,
        }
    }

    #[tokio::test]
    async fn new_event_starts_fully_available() {
        let store = store().await;
        let event = store.create_event(&concert(5)).await.unwrap();

        assert_eq!(event.capacity, 5);
        assert_eq!(event.available, 5);
        assert_eq!(store.available_seats(event.id).await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn decrement_reports_each_outcome() {
        let store = store().await;
        let event = store.create_event(&concert(3)).await.unwrap();
        let mut tx = store.begin().await.unwrap();

        let taken = InventoryStore::decrement_available(&mut tx, event.id, 2).await.unwrap();
        assert_eq!(taken, Decrement::Applied { remaining: 1 });

        let short = InventoryStore::decrement_available(&mut tx, event.id, 2).await.unwrap();
        assert_eq!(short, Decrement::Insufficient { available: 1 });

        let missing = InventoryStore::decrement_available(&mut tx, 404, 1).await.unwrap();
        assert_eq!(missing, Decrement::EventMissing);

        tx.rollback().await.unwrap();
        assert_eq!(store.available_seats(event.id).await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn bookings_can_be_filtered_by_email() {
        let store = store().await;
        let event = store.create_event(&concert(10)).await.unwrap();
        let mut tx = store.begin().await.unwrap();

        for (email, quantity) in [("ann@example.com", 1), ("bob@example.com", 2), ("ann@example.com", 3)] {
            let booking = NewBooking {
                event_id: event.id,
                user_email: email.into(),
                user_name: "Someone".into(),
                quantity,
            };
            InventoryStore::insert_booking(&mut tx, &booking, BookingStatus::Confirmed)
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let ann = store.list_bookings(Some("ann@example.com")).await.unwrap();
        assert_eq!(ann.iter().map(|b| b.quantity).collect::<Vec<_>>(), vec![1, 3]);
        assert!(ann.iter().all(|b| b.status == BookingStatus::Confirmed));
        assert_eq!(store.list_bookings(None).await.unwrap().len(), 3);
    }
}
