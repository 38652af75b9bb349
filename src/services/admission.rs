//! Booking admission control.
//!
//! Every booking commit runs the decrement and the booking insert as one
//! transaction while holding an exclusive admission lock. The lock is either
//! a single process-wide mutex or one mutex per event id, depending on
//! [`LockScope`]. Either way two commits against the same event never
//! overlap, which keeps `sum(confirmed quantities) <= capacity`.

use sqlx::SqliteConnection;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::{
    config::LockScope,
    error::BookingError,
    models::{Booking, BookingStatus, NewBooking},
    services::inventory::{Decrement, InventoryStore},
};

/// Idle per-event locks are dropped once the registry grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Registry of admission locks.
pub enum AdmissionLocks {
    Global(Arc<Mutex<()>>),
    PerEvent(StdMutex<HashMap<i64, Arc<Mutex<()>>>>),
}

impl AdmissionLocks {
    pub fn new(scope: LockScope) -> Self {
        match scope {
            LockScope::Global => AdmissionLocks::Global(Arc::new(Mutex::new(()))),
            LockScope::PerEvent => AdmissionLocks::PerEvent(StdMutex::new(HashMap::new())),
        }
    }

    pub fn scope(&self) -> LockScope {
        match self {
            AdmissionLocks::Global(_) => LockScope::Global,
            AdmissionLocks::PerEvent(_) => LockScope::PerEvent,
        }
    }

    /// Waits for exclusive admission rights covering `event_id`.
    /// Rights are released when the returned guard is dropped.
    pub async fn acquire(&self, event_id: i64) -> OwnedMutexGuard<()> {
        self.lock_for(event_id).lock_owned().await
    }

    fn lock_for(&self, event_id: i64) -> Arc<Mutex<()>> {
        match self {
            AdmissionLocks::Global(lock) => lock.clone(),
            AdmissionLocks::PerEvent(locks) => {
                let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
                if locks.len() >= PRUNE_THRESHOLD {
                    // Only the registry references an idle lock; holders and
                    // waiters keep their own clone.
                    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                }
                locks.entry(event_id).or_default().clone()
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        match self {
            AdmissionLocks::Global(_) => 1,
            AdmissionLocks::PerEvent(locks) => {
                locks.lock().unwrap_or_else(PoisonError::into_inner).len()
            }
        }
    }
}

struct Inner {
    store: InventoryStore,
    locks: AdmissionLocks,
}

/// The gate every booking goes through.
#[derive(Clone)]
pub struct BookingController {
    inner: Arc<Inner>,
}

impl BookingController {
    pub fn new(store: InventoryStore, scope: LockScope) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                locks: AdmissionLocks::new(scope),
            }),
        }
    }

    pub fn lock_scope(&self) -> LockScope {
        self.inner.locks.scope()
    }

    /// Validates the intent, then admits it under the admission lock.
    ///
    /// The admission itself runs on its own task, so a caller that goes away
    /// mid-flight does not interrupt a commit that already started.
    pub async fn book(&self, intent: NewBooking) -> Result<Booking, BookingError> {
        if let Err(errors) = intent.validate() {
            debug!("Rejected booking intent: {}", errors);
            return Err(BookingError::InvalidInput("Missing required fields".to_string()));
        }

        let controller = self.clone();
        tokio::spawn(async move { controller.admit(intent).await }).await?
    }

    #[instrument(
        name = "admit_booking",
        skip(self, intent),
        fields(event_id = intent.event_id, quantity = intent.quantity)
    )]
    async fn admit(&self, intent: NewBooking) -> Result<Booking, BookingError> {
        let _guard = self.inner.locks.acquire(intent.event_id).await;

        let mut tx = self.inner.store.begin().await.map_err(|e| {
            error!("Failed to start booking transaction: {:?}", e);
            BookingError::StorageFailure(e)
        })?;

        match Self::commit_unit(&mut tx, &intent).await {
            Ok(booking) => {
                tx.commit().await.map_err(|e| {
                    error!("Failed to commit booking: {:?}", e);
                    BookingError::StorageFailure(e)
                })?;
                info!(booking_id = booking.id, "Booking confirmed");
                Ok(booking)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    error!("Failed to roll back booking transaction: {:?}", rollback);
                }
                match &e {
                    BookingError::StorageFailure(cause) => error!("Booking aborted: {:?}", cause),
                    rejection => warn!("Booking rejected: {}", rejection),
                }
                Err(e)
            }
        }
    }

    /// Read-check-decrement-insert. Caller owns commit and rollback.
    async fn commit_unit(
        conn: &mut SqliteConnection,
        intent: &NewBooking,
    ) -> Result<Booking, BookingError> {
        match InventoryStore::decrement_available(conn, intent.event_id, intent.quantity).await? {
            Decrement::Applied { remaining } => debug!(remaining, "Seats reserved"),
            Decrement::Insufficient { available } => {
                return Err(BookingError::InsufficientCapacity { available })
            }
            Decrement::EventMissing => return Err(BookingError::NotFound),
        }

        let booking =
            InventoryStore::insert_booking(conn, intent, BookingStatus::Confirmed).await?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn global_scope_shares_one_lock() {
        let locks = AdmissionLocks::new(LockScope::Global);
        let _held = locks.acquire(1).await;

        let other_event = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(other_event.is_err(), "event 2 must wait behind event 1");
    }

    #[tokio::test]
    async fn per_event_scope_isolates_events() {
        let locks = AdmissionLocks::new(LockScope::PerEvent);
        let _held = locks.acquire(1).await;

        let other_event = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(other_event.is_ok(), "event 2 has its own lock");

        let same_event = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(same_event.is_err(), "event 1 is still held");
    }

    #[tokio::test]
    async fn idle_locks_are_pruned() {
        let locks = AdmissionLocks::new(LockScope::PerEvent);
        let held = locks.acquire(0).await;
        for event_id in 1..PRUNE_THRESHOLD as i64 {
            drop(locks.acquire(event_id).await);
        }
        assert_eq!(locks.tracked(), PRUNE_THRESHOLD);

        let _next = locks.acquire(5_000).await;
        // Event 0 is still held, 5000 was just added.
        assert_eq!(locks.tracked(), 2);
        drop(held);
    }
}
