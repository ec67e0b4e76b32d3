// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard API routes.

use crate::db::firestore::BulkPriceOutcome;
use crate::error::{AppError, Result};
use crate::models::{DoorStatus, LockState, Locker, SizeClass, UsageStats};
use crate::services::NewLocker;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Dashboard API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/lockers", get(list_lockers).post(create_locker))
        .route("/api/lockers/{id}", delete(delete_locker))
        .route("/api/lockers/{id}/price", put(update_price))
        .route("/api/lockers/{id}/lock/toggle", post(toggle_lock))
        .route("/api/lockers/price/bulk", post(bulk_price))
        .route("/api/stats/usage", get(usage_stats))
}

// ─── Lockers ─────────────────────────────────────────────────

/// One locker as rendered by the dashboard.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LockerSummary {
    pub id: String,
    pub label: String,
    pub location: String,
    pub status: String,
    pub status_color: String,
    /// 0 = locked, 1 = unlocked
    pub lock_state: i64,
    pub price_per_hour: f64,
    pub size: String,
    pub reserved: bool,
    pub reservation_until: Option<String>,
    pub last_updated: Option<String>,
}

impl LockerSummary {
    fn from_locker(locker: &Locker) -> Self {
        Self {
            id: locker.id.clone(),
            label: locker.label.clone(),
            location: locker.location.clone(),
            status: locker.door_status.as_str().to_string(),
            status_color: locker.door_status.color().to_string(),
            lock_state: locker.lock_state.as_bit(),
            price_per_hour: locker.price_per_hour,
            size: locker.size.as_str().to_string(),
            reserved: locker.is_reserved(),
            reservation_until: locker.reservation_until.map(format_utc_rfc3339),
            last_updated: locker.last_updated.map(format_utc_rfc3339),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LockersResponse {
    pub lockers: Vec<LockerSummary>,
    /// True while the initial snapshot is still loading.
    pub loading: bool,
    pub total: u32,
    /// Lockers with a reservation expiry present.
    pub reserved: u32,
    pub unlocked: u32,
}

/// Current locker inventory from the live snapshot.
async fn list_lockers(State(state): State<Arc<AppState>>) -> Result<Json<LockersResponse>> {
    let snapshot = state.lockers.current();

    let reserved = snapshot.docs.iter().filter(|l| l.is_reserved()).count() as u32;
    let unlocked = snapshot
        .docs
        .iter()
        .filter(|l| l.lock_state == LockState::Unlocked)
        .count() as u32;

    Ok(Json(LockersResponse {
        total: snapshot.docs.len() as u32,
        reserved,
        unlocked,
        lockers: snapshot.docs.iter().map(LockerSummary::from_locker).collect(),
        loading: snapshot.loading,
    }))
}

// ─── Locker Creation ─────────────────────────────────────────

fn validate_locker_id(id: &str) -> std::result::Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::new("empty_locker_id"));
    }
    Ok(())
}

#[derive(Deserialize, Validate)]
pub struct CreateLockerRequest {
    #[validate(custom(function = validate_locker_id))]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub location: String,
    /// Free-form door status; defaults to "available".
    #[serde(default)]
    pub status: Option<String>,
    pub size: SizeClass,
    pub price_per_hour: f64,
}

/// Create a locker.
///
/// Lock state is forced to locked and the reservation expiry to null,
/// whatever the form sent.
async fn create_locker(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLockerRequest>,
) -> Result<Json<LockerSummary>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let status = payload
        .status
        .map_or(DoorStatus::Available, DoorStatus::from);

    let locker = state
        .admin
        .create(NewLocker {
            id: payload.id,
            label: payload.label,
            location: payload.location,
            status,
            size: payload.size,
            price_per_hour: payload.price_per_hour,
        })
        .await?;

    Ok(Json(LockerSummary::from_locker(&locker)))
}

// ─── Locker Deletion ─────────────────────────────────────────

#[derive(Deserialize)]
struct DeleteLockerQuery {
    /// Explicit confirmation; deletion is irreversible.
    #[serde(default)]
    confirm: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteLockerResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a locker after explicit confirmation.
async fn delete_locker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteLockerQuery>,
) -> Result<Json<DeleteLockerResponse>> {
    state.admin.delete(&id, params.confirm).await?;

    Ok(Json(DeleteLockerResponse {
        success: true,
        message: format!("Locker {} deleted", id),
    }))
}

// ─── Pricing ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePriceRequest {
    pub price_per_hour: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdatePriceResponse {
    pub success: bool,
}

/// Update the hourly price of one locker.
async fn update_price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePriceRequest>,
) -> Result<Json<UpdatePriceResponse>> {
    state.admin.update_price(&id, payload.price_per_hour).await?;
    Ok(Json(UpdatePriceResponse { success: true }))
}

#[derive(Deserialize)]
pub struct BulkPriceRequest {
    pub price_per_hour: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BulkFailureSummary {
    pub locker_id: String,
    pub error: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BulkPriceResponse {
    pub requested: u32,
    pub updated: u32,
    /// Lockers that failed to update; the rest were written (best-effort,
    /// no rollback).
    pub failed: Vec<BulkFailureSummary>,
}

impl BulkPriceResponse {
    fn from_outcome(requested: u32, outcome: BulkPriceOutcome) -> Self {
        Self {
            requested,
            updated: outcome.updated.len() as u32,
            failed: outcome
                .failed
                .into_iter()
                .map(|f| BulkFailureSummary {
                    locker_id: f.locker_id,
                    error: f.error,
                })
                .collect(),
        }
    }
}

/// Apply one hourly price to every locker in the current snapshot.
async fn bulk_price(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkPriceRequest>,
) -> Result<Json<BulkPriceResponse>> {
    let requested = state.lockers.current().docs.len() as u32;
    let outcome = state
        .admin
        .bulk_apply_price(&state.lockers, payload.price_per_hour)
        .await?;

    Ok(Json(BulkPriceResponse::from_outcome(requested, outcome)))
}

// ─── Lock Control ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleLockResponse {
    /// 0 = locked, 1 = unlocked
    pub lock_state: i64,
}

/// Flip the lock state of one locker.
async fn toggle_lock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleLockResponse>> {
    let next = state.admin.toggle_lock(&state.lockers, &id).await?;
    Ok(Json(ToggleLockResponse {
        lock_state: next.as_bit(),
    }))
}

// ─── Usage Stats ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsageStatsResponse {
    pub stats: UsageStats,
    /// True while the initial reservation snapshot is still loading.
    pub loading: bool,
}

/// Usage analytics over the current reservation snapshot.
///
/// Recomputed in full per request; the snapshot is already in memory so
/// this costs no store reads.
async fn usage_stats(State(state): State<Arc<AppState>>) -> Result<Json<UsageStatsResponse>> {
    let snapshot = state.reservations.current();
    let stats = UsageStats::compute(&snapshot.docs);

    Ok(Json(UsageStatsResponse {
        stats,
        loading: snapshot.loading,
    }))
}
