// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Lockers (inventory, pricing, lock-state control)
//! - Reservations (read-only analytics source)
//!
//! Every write is independently atomic at the single-document level; there
//! is no cross-document transaction. Three writers (dashboard, mobile
//! client, firmware) share these collections with last-write-wins
//! semantics.

use futures_util::{stream, StreamExt};
use gcloud_sdk::google::firestore::v1::Document as FirestoreDocument;
use serde::{Deserialize, Serialize};

use crate::db::collections;
use crate::error::AppError;
use crate::models::{LockState, LockerDoc, WireInstant};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Document key for a locker id.
///
/// Admin-supplied ids are percent-encoded so they cannot break the
/// document path.
pub fn locker_doc_key(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Per-locker failure from a bulk write.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    pub locker_id: String,
    pub error: String,
}

/// Outcome of a best-effort bulk price apply.
///
/// Partial failure is possible and is not rolled back.
#[derive(Debug, Clone, Default)]
pub struct BulkPriceOutcome {
    pub updated: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

/// Fields written by a price update, masked to leave the rest of the
/// document alone.
#[derive(Serialize, Deserialize)]
struct PriceFields {
    #[serde(rename = "pricePerHour")]
    price_per_hour: f64,
    #[serde(rename = "lastUpdated")]
    last_updated: WireInstant,
}

/// Fields written by a lock-state flip.
#[derive(Serialize, Deserialize)]
struct LockFields {
    #[serde(rename = "lockState")]
    lock_state: LockState,
    #[serde(rename = "lastUpdated")]
    last_updated: WireInstant,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    pub(crate) fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Collection Reads ────────────────────────────────────────

    /// Fetch every raw document in a collection (subscriber seed).
    pub async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<FirestoreDocument>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Locker Operations ───────────────────────────────────────

    /// Get a locker by its identifier.
    pub async fn get_locker(&self, id: &str) -> Result<Option<LockerDoc>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::LOCKERS)
            .obj()
            .one(&locker_doc_key(id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a locker document, keyed by its identifier.
    pub async fn upsert_locker(&self, doc: &LockerDoc) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LOCKERS)
            .document_id(locker_doc_key(&doc.id))
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a locker document. Irreversible.
    pub async fn delete_locker(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::LOCKERS)
            .document_id(locker_doc_key(id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update the hourly price of one locker plus its update timestamp,
    /// leaving every other field untouched.
    pub async fn update_locker_price(&self, id: &str, price_per_hour: f64) -> Result<(), AppError> {
        let fields = PriceFields {
            price_per_hour,
            last_updated: WireInstant::now(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["pricePerHour", "lastUpdated"])
            .in_col(collections::LOCKERS)
            .document_id(locker_doc_key(id))
            .object(&fields)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write a new lock state plus its update timestamp.
    ///
    /// Plain field write, not a compare-and-swap: a concurrent writer
    /// (another admin, the firmware) can overwrite it and the last write
    /// wins.
    pub async fn set_lock_state(&self, id: &str, state: LockState) -> Result<(), AppError> {
        let fields = LockFields {
            lock_state: state,
            last_updated: WireInstant::now(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["lockState", "lastUpdated"])
            .in_col(collections::LOCKERS)
            .document_id(locker_doc_key(id))
            .object(&fields)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply one hourly price to many lockers with bounded concurrency.
    ///
    /// Best-effort: the updates fire concurrently and are awaited
    /// together; each failure is reported per locker and nothing is rolled
    /// back.
    pub async fn bulk_update_price(
        &self,
        ids: &[String],
        price_per_hour: f64,
    ) -> Result<BulkPriceOutcome, AppError> {
        // Fail fast when offline instead of reporting every locker failed.
        self.get_client()?;

        let results = stream::iter(ids.to_vec())
            .map(|id| async move {
                let result = self.update_locker_price(&id, price_per_hour).await;
                (id, result)
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<(String, Result<(), AppError>)>>()
            .await;

        let mut outcome = BulkPriceOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.updated.push(id),
                Err(e) => outcome.failed.push(BulkFailure {
                    locker_id: id,
                    error: e.to_string(),
                }),
            }
        }

        if !outcome.failed.is_empty() {
            tracing::warn!(
                updated = outcome.updated.len(),
                failed = outcome.failed.len(),
                "Bulk price apply completed with partial failure"
            );
        }

        Ok(outcome)
    }
}
