// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locker administration service.
//!
//! The write path of the dashboard: create/delete lockers, adjust hourly
//! pricing (single and bulk), and flip lock state. Every operation is
//! independently atomic at the single-document level; across documents and
//! across writers the store is last-write-wins.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::firestore::BulkPriceOutcome;
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{DoorStatus, LockState, Locker, LockerDoc, SizeClass, WireInstant};
use crate::services::LiveCollection;

/// Validated input for locker creation.
#[derive(Debug, Clone)]
pub struct NewLocker {
    pub id: String,
    pub label: String,
    pub location: String,
    pub status: DoorStatus,
    pub size: SizeClass,
    pub price_per_hour: f64,
}

/// Locker administration operations.
pub struct LockerAdmin {
    db: FirestoreDb,
    /// Guards bulk price apply against re-entrant invocation from this
    /// dashboard instance (other clients are not coordinated).
    bulk_in_flight: AtomicBool,
}

impl LockerAdmin {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            bulk_in_flight: AtomicBool::new(false),
        }
    }

    /// Create a locker keyed by its identifier.
    ///
    /// Whatever the form supplied, the new document is written locked with
    /// no reservation. An identifier that is empty after trimming is
    /// rejected before any write.
    pub async fn create(&self, input: NewLocker) -> Result<Locker, AppError> {
        let id = input.id.trim();
        if id.is_empty() {
            return Err(AppError::Validation(
                "Locker identifier must not be empty".to_string(),
            ));
        }

        let doc = LockerDoc {
            id: id.to_string(),
            label: input.label,
            location: input.location,
            status: input.status,
            lock_state: LockState::Locked,
            price_per_hour: input.price_per_hour,
            size: input.size,
            reservation_until: None,
            last_updated: Some(WireInstant::now()),
        };

        self.db.upsert_locker(&doc).await?;
        tracing::info!(locker_id = %doc.id, "Locker created");

        Ok(Locker::from_doc(doc))
    }

    /// Delete a locker. Irreversible.
    ///
    /// `confirmed` carries the caller's explicit confirmation; without it
    /// nothing is written.
    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<(), AppError> {
        if !confirmed {
            return Err(AppError::Validation(
                "Deletion requires confirmation (confirm=true)".to_string(),
            ));
        }

        self.db.delete_locker(id).await?;
        tracing::info!(locker_id = %id, "Locker deleted");
        Ok(())
    }

    /// Update the hourly price of one locker.
    ///
    /// No lower bound is enforced here; the store schema only asks for a
    /// decimal.
    pub async fn update_price(&self, id: &str, price_per_hour: f64) -> Result<(), AppError> {
        self.db.update_locker_price(id, price_per_hour).await?;
        tracing::debug!(locker_id = %id, price_per_hour, "Price updated");
        Ok(())
    }

    /// Flip the lock state based on the last-known in-memory value.
    ///
    /// Read-modify-write over the cached snapshot, not a server-side
    /// compare-and-swap: a concurrent toggle or a firmware write to the
    /// same field can be lost (last write wins). On failure the in-memory
    /// view is left as-is; it corrects itself on the next push.
    pub async fn toggle_lock(
        &self,
        lockers: &LiveCollection<Locker>,
        id: &str,
    ) -> Result<LockState, AppError> {
        let snapshot = lockers.current();
        let current = snapshot
            .docs
            .iter()
            .find(|locker| locker.id == id)
            .map(|locker| locker.lock_state)
            .ok_or_else(|| AppError::NotFound(format!("Locker {} not found", id)))?;

        let next = current.toggled();
        self.db.set_lock_state(id, next).await?;
        tracing::info!(locker_id = %id, lock_state = next.as_bit(), "Lock state toggled");
        Ok(next)
    }

    /// Apply one hourly price to every locker in the current snapshot.
    ///
    /// Best-effort: partial failure is reported per locker, not rolled
    /// back. A second invocation while one is in flight is rejected.
    pub async fn bulk_apply_price(
        &self,
        lockers: &LiveCollection<Locker>,
        price_per_hour: f64,
    ) -> Result<BulkPriceOutcome, AppError> {
        if self
            .bulk_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::Busy(
                "Bulk price apply already in progress".to_string(),
            ));
        }

        let ids: Vec<String> = lockers
            .current()
            .docs
            .iter()
            .map(|locker| locker.id.clone())
            .collect();

        let result = self.db.bulk_update_price(&ids, price_per_hour).await;
        self.bulk_in_flight.store(false, Ordering::SeqCst);
        result
    }
}
