// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Polymorphic instant type for in-migration timestamp fields.
//!
//! The store schema is mid-migration: some writers produce typed Firestore
//! timestamps while others still write bare ISO-8601 strings. Both shapes
//! are accepted here and normalized once; everything past this boundary
//! sees `DateTime<Utc>` only.

use chrono::{DateTime, Utc};
use firestore::FirestoreTimestamp;
use serde::{Deserialize, Serialize};

use crate::time_utils::parse_rfc3339_utc;

/// An instant-valued field as observed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireInstant {
    /// Typed Firestore timestamp (the anticipated representation).
    Typed(FirestoreTimestamp),
    /// Bare ISO-8601 string (the representation observed today).
    Iso(String),
}

impl WireInstant {
    /// Normalize to a UTC instant. An unparseable string yields `None`.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            WireInstant::Typed(ts) => Some(ts.0),
            WireInstant::Iso(raw) => parse_rfc3339_utc(raw),
        }
    }

    /// Wrap the current time as a typed timestamp for writes.
    pub fn now() -> Self {
        WireInstant::Typed(FirestoreTimestamp(Utc::now()))
    }
}

/// Normalize an optional wire instant field.
pub fn normalize(value: &Option<WireInstant>) -> Option<DateTime<Utc>> {
    value.as_ref().and_then(WireInstant::instant)
}
