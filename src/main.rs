// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locker-Admin API Server
//!
//! Administrative backend for a smart-locker rental fleet: live inventory,
//! lock/door control, pricing, and reservation usage analytics over a
//! shared Firestore store.

use locker_admin::{
    config::Config,
    db::FirestoreDb,
    models::{Locker, Reservation},
    services::{LiveCollection, LockerAdmin},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Listener target ids, one per subscribed collection.
const LOCKERS_TARGET: u32 = 1;
const RESERVATIONS_TARGET: u32 = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Locker-Admin API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Live mirrors of the two dashboard collections. Subscription errors
    // degrade to a stale snapshot instead of failing startup.
    let lockers = LiveCollection::<Locker>::subscribe(&db, LOCKERS_TARGET).await;
    let reservations = LiveCollection::<Reservation>::subscribe(&db, RESERVATIONS_TARGET).await;

    let admin = LockerAdmin::new(db);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        lockers,
        reservations,
        admin,
    });

    // Build router
    let app = locker_admin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locker_admin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
