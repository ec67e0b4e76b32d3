// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use locker_admin::config::Config;
use locker_admin::db::FirestoreDb;
use locker_admin::models::{Locker, Reservation};
use locker_admin::routes::create_router;
use locker_admin::services::{LiveCollection, LockerAdmin};
use locker_admin::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies and fixed snapshots.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(
    lockers: Vec<Locker>,
    reservations: Vec<Reservation>,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let admin = LockerAdmin::new(test_db_offline());

    let state = Arc::new(AppState {
        config,
        lockers: LiveCollection::detached(lockers),
        reservations: LiveCollection::detached(reservations),
        admin,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with empty snapshots.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(vec![], vec![])
}
