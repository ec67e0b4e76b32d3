// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Reservation model, read-only from the dashboard's perspective.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::instant::{normalize, WireInstant};

/// Reservation document as stored in the `reservations` collection.
///
/// Foreign references are not validated. Grouping keys default to empty so
/// one incomplete record never poisons the rest of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDoc {
    #[serde(rename = "lockerId", default)]
    pub locker_id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<WireInstant>,
    #[serde(rename = "startAt", default)]
    pub start_at: Option<WireInstant>,
    /// Observed as an ISO string today; typed timestamps anticipated.
    #[serde(rename = "endAt", default)]
    pub end_at: Option<WireInstant>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Normalized reservation record.
#[derive(Debug, Clone)]
pub struct Reservation {
    /// System-generated document key.
    pub id: String,
    pub locker_id: String,
    pub user_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl Reservation {
    pub fn from_doc(id: String, doc: ReservationDoc) -> Self {
        Self {
            id,
            locker_id: doc.locker_id,
            user_id: doc.user_id,
            created_at: normalize(&doc.created_at),
            start_at: normalize(&doc.start_at),
            end_at: normalize(&doc.end_at),
            status: doc.status,
        }
    }

    /// Duration sample in minutes.
    ///
    /// `None` unless both instants are present and the end is strictly
    /// after the start.
    pub fn duration_minutes(&self) -> Option<f64> {
        let start = self.start_at?;
        let end = self.end_at?;
        let minutes = (end - start).num_seconds() as f64 / 60.0;
        (minutes > 0.0).then_some(minutes)
    }
}
