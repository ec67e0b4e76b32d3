// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live collection subscriber.
//!
//! Maintains an in-memory mirror of one Firestore collection and
//! republishes the entire current snapshot (not a diff) to consumers on
//! every change notification. Consumers hold a `watch` receiver, so the
//! newest snapshot always wins; the mirror is transient state, rebuilt on
//! restart, never authoritative.

use std::collections::BTreeMap;
use std::sync::Arc;

use firestore::{
    FirestoreListenEvent, FirestoreListener, FirestoreListenerTarget,
    FirestoreTempFilesListenStateStorage,
};
use gcloud_sdk::google::firestore::v1::Document as FirestoreDocument;
use tokio::sync::{watch, Mutex};

use crate::db::{collections, FirestoreDb};
use crate::error::AppError;
use crate::models::{Locker, LockerDoc, Reservation, ReservationDoc};

type Listener = FirestoreListener<firestore::FirestoreDb, FirestoreTempFilesListenStateStorage>;
type BoxedErr = Box<dyn std::error::Error + Send + Sync>;

/// A typed record mirroring documents of one collection.
pub trait LiveDocument: Clone + Send + Sync + 'static {
    /// Collection this record type is stored in.
    const COLLECTION: &'static str;

    /// Map a raw store document into its document key and typed record.
    ///
    /// Must be pure and idempotent; a document that fails to map is
    /// logged and skipped without disturbing the rest of the snapshot.
    fn from_document(doc: &FirestoreDocument) -> Result<(String, Self), AppError>;
}

/// Full snapshot of a live collection, ordered by document key.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub docs: Vec<T>,
    /// True until the initial load completes (or fails).
    pub loading: bool,
}

impl<T> Snapshot<T> {
    fn loading() -> Self {
        Self {
            docs: Vec::new(),
            loading: true,
        }
    }
}

/// Standing subscription to one collection.
///
/// The owner must call [`shutdown`](Self::shutdown) when no longer
/// interested; a leaked listener wastes a stream but cannot corrupt data.
pub struct LiveCollection<T> {
    rx: watch::Receiver<Snapshot<T>>,
    listener: Mutex<Option<Listener>>,
}

impl<T: LiveDocument> LiveCollection<T> {
    /// Subscribe to `T::COLLECTION`.
    ///
    /// Seeds the snapshot with a one-shot query, then attaches a change
    /// listener that republishes the full current set on every insert,
    /// update, or delete. On subscription error the error is logged, the
    /// loading flag drops to false, and no retry is attempted; the last
    /// published snapshot stays readable (possibly stale).
    pub async fn subscribe(db: &FirestoreDb, target: u32) -> Self {
        let (tx, rx) = watch::channel(Snapshot::loading());
        let tx = Arc::new(tx);
        let mirror: Arc<Mutex<BTreeMap<String, T>>> = Arc::new(Mutex::new(BTreeMap::new()));

        match db.list_documents(T::COLLECTION).await {
            Ok(raw_docs) => {
                let mut map = mirror.lock().await;
                for raw in &raw_docs {
                    match T::from_document(raw) {
                        Ok((key, record)) => {
                            map.insert(key, record);
                        }
                        Err(e) => tracing::warn!(
                            collection = T::COLLECTION,
                            error = %e,
                            "Skipping unmappable document"
                        ),
                    }
                }
                publish(&tx, &map);
                tracing::info!(
                    collection = T::COLLECTION,
                    count = map.len(),
                    "Initial snapshot loaded"
                );
            }
            Err(e) => {
                tracing::error!(
                    collection = T::COLLECTION,
                    error = %e,
                    "Initial load failed; snapshot stays empty"
                );
                let _ = tx.send(Snapshot {
                    docs: Vec::new(),
                    loading: false,
                });
                return Self {
                    rx,
                    listener: Mutex::new(None),
                };
            }
        }

        let listener = match Self::attach_listener(db, target, mirror, tx).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                tracing::error!(
                    collection = T::COLLECTION,
                    error = %e,
                    "Change listener failed to start; snapshot will go stale"
                );
                None
            }
        };

        Self {
            rx,
            listener: Mutex::new(listener),
        }
    }

    async fn attach_listener(
        db: &FirestoreDb,
        target: u32,
        mirror: Arc<Mutex<BTreeMap<String, T>>>,
        tx: Arc<watch::Sender<Snapshot<T>>>,
    ) -> Result<Listener, AppError> {
        let client = db.get_client()?.clone();

        let mut listener = client
            .create_listener(FirestoreTempFilesListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(T::COLLECTION)
            .listen()
            .add_target(FirestoreListenerTarget::new(target), &mut listener)
            .map_err(|e| AppError::Database(e.to_string()))?;

        listener
            .start(move |event| {
                let mirror = mirror.clone();
                let tx = tx.clone();
                async move {
                    match event {
                        FirestoreListenEvent::DocumentChange(ref change) => {
                            if let Some(doc) = &change.document {
                                match T::from_document(doc) {
                                    Ok((key, record)) => {
                                        let mut map = mirror.lock().await;
                                        map.insert(key, record);
                                        publish(&tx, &map);
                                    }
                                    Err(e) => tracing::warn!(
                                        collection = T::COLLECTION,
                                        error = %e,
                                        "Skipping unmappable document change"
                                    ),
                                }
                            }
                        }
                        FirestoreListenEvent::DocumentDelete(ref deleted) => {
                            let key = document_key(&deleted.document);
                            let mut map = mirror.lock().await;
                            if map.remove(&key).is_some() {
                                publish(&tx, &map);
                            }
                        }
                        _ => {}
                    }
                    Ok::<(), BoxedErr>(())
                }
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(listener)
    }

    /// Offline handle with a fixed snapshot (tests and mock wiring).
    ///
    /// The snapshot never changes; `current` keeps returning it after the
    /// internal sender is gone.
    pub fn detached(docs: Vec<T>) -> Self {
        let (_tx, rx) = watch::channel(Snapshot {
            docs,
            loading: false,
        });
        Self {
            rx,
            listener: Mutex::new(None),
        }
    }
}

impl<T: Clone> LiveCollection<T> {
    /// Latest published snapshot.
    pub fn current(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// Receiver for consumers that want change notifications.
    pub fn watch(&self) -> watch::Receiver<Snapshot<T>> {
        self.rx.clone()
    }

    /// Release the underlying store listener.
    pub async fn shutdown(&self) {
        if let Some(mut listener) = self.listener.lock().await.take() {
            if let Err(e) = listener.shutdown().await {
                tracing::warn!(error = %e, "Listener shutdown failed");
            }
        }
    }
}

fn publish<T: Clone>(tx: &watch::Sender<Snapshot<T>>, mirror: &BTreeMap<String, T>) {
    // Receivers may all be gone (e.g. during shutdown); not an error.
    let _ = tx.send(Snapshot {
        docs: mirror.values().cloned().collect(),
        loading: false,
    });
}

/// Last path segment of a fully qualified document name.
pub(crate) fn document_key(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

impl LiveDocument for Locker {
    const COLLECTION: &'static str = collections::LOCKERS;

    fn from_document(doc: &FirestoreDocument) -> Result<(String, Self), AppError> {
        let parsed: LockerDoc = firestore::FirestoreDb::deserialize_doc_to(doc)
            .map_err(|e| AppError::Parse(e.to_string()))?;
        Ok((document_key(&doc.name), Locker::from_doc(parsed)))
    }
}

impl LiveDocument for Reservation {
    const COLLECTION: &'static str = collections::RESERVATIONS;

    fn from_document(doc: &FirestoreDocument) -> Result<(String, Self), AppError> {
        let parsed: ReservationDoc = firestore::FirestoreDb::deserialize_doc_to(doc)
            .map_err(|e| AppError::Parse(e.to_string()))?;
        let key = document_key(&doc.name);
        Ok((key.clone(), Reservation::from_doc(key, parsed)))
    }
}
