// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Locker model: wire document shape and normalized domain record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::instant::{normalize, WireInstant};
use crate::models::status::DoorStatus;

/// Binary solenoid control bit: 0 = locked, 1 = unlocked.
///
/// The wire value is always exactly 0 or 1; anything else fails to map and
/// the offending document is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    pub fn as_bit(self) -> i64 {
        match self {
            LockState::Locked => 0,
            LockState::Unlocked => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LockState::Locked => LockState::Unlocked,
            LockState::Unlocked => LockState::Locked,
        }
    }
}

impl Serialize for LockState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_bit())
    }
}

impl<'de> Deserialize<'de> for LockState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i64::deserialize(deserializer)? {
            0 => Ok(LockState::Locked),
            1 => Ok(LockState::Unlocked),
            other => Err(serde::de::Error::custom(format!(
                "lock state must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Physical size class of a locker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "S", alias = "small")]
    Small,
    #[serde(rename = "M", alias = "medium")]
    Medium,
    #[serde(rename = "L", alias = "large")]
    Large,
}

impl SizeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Small => "S",
            SizeClass::Medium => "M",
            SizeClass::Large => "L",
        }
    }
}

/// Locker document as stored in the `lockers` collection.
///
/// Field names mirror the wire schema shared with the mobile client and
/// the device firmware; serde renames are the single place where wire
/// names are translated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockerDoc {
    /// Stable identifier, also used to derive the document key.
    pub id: String,
    pub label: String,
    pub location: String,
    /// Wire name `status`; exposed downstream as the door status.
    pub status: DoorStatus,
    #[serde(rename = "lockState")]
    pub lock_state: LockState,
    #[serde(rename = "pricePerHour")]
    pub price_per_hour: f64,
    pub size: SizeClass,
    /// Presence means "currently reserved".
    #[serde(rename = "reservationUntil", default)]
    pub reservation_until: Option<WireInstant>,
    /// Stamped on every write, by whichever writer.
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<WireInstant>,
}

/// Normalized locker record used by the dashboard and the write path.
#[derive(Debug, Clone)]
pub struct Locker {
    pub id: String,
    pub label: String,
    pub location: String,
    pub door_status: DoorStatus,
    pub lock_state: LockState,
    pub price_per_hour: f64,
    pub size: SizeClass,
    pub reservation_until: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Locker {
    pub fn from_doc(doc: LockerDoc) -> Self {
        Self {
            reservation_until: normalize(&doc.reservation_until),
            last_updated: normalize(&doc.last_updated),
            id: doc.id,
            label: doc.label,
            location: doc.location,
            door_status: doc.status,
            lock_state: doc.lock_state,
            price_per_hour: doc.price_per_hour,
            size: doc.size,
        }
    }

    /// Presence of a reservation expiry means "currently reserved".
    pub fn is_reserved(&self) -> bool {
        self.reservation_until.is_some()
    }
}
