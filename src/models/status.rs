// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Door / app status taxonomy for lockers.

use serde::{Deserialize, Serialize};

/// Door or app-assigned status of a locker.
///
/// The store keeps this as free text written by three independent writers
/// (dashboard, mobile client, device firmware), so values outside the
/// known taxonomy must round-trip unchanged rather than be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DoorStatus {
    Available,
    Reserved,
    Occupied,
    Open,
    Closed,
    Offline,
    Malfunction,
    Maintenance,
    Cleaning,
    /// Any value outside the known taxonomy, preserved verbatim.
    Unrecognized(String),
}

impl DoorStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DoorStatus::Available => "available",
            DoorStatus::Reserved => "reserved",
            DoorStatus::Occupied => "occupied",
            DoorStatus::Open => "open",
            DoorStatus::Closed => "closed",
            DoorStatus::Offline => "offline",
            DoorStatus::Malfunction => "malfunction",
            DoorStatus::Maintenance => "maintenance",
            DoorStatus::Cleaning => "cleaning",
            DoorStatus::Unrecognized(raw) => raw,
        }
    }

    /// Display color used by the dashboard for this status.
    pub fn color(&self) -> &'static str {
        match self {
            DoorStatus::Available => "#2e7d32",
            DoorStatus::Reserved => "#f9a825",
            DoorStatus::Occupied => "#ef6c00",
            DoorStatus::Open => "#0288d1",
            DoorStatus::Closed => "#455a64",
            DoorStatus::Offline => "#9e9e9e",
            DoorStatus::Malfunction => "#c62828",
            DoorStatus::Maintenance => "#6a1b9a",
            DoorStatus::Cleaning => "#00838f",
            DoorStatus::Unrecognized(_) => "#757575",
        }
    }
}

impl From<String> for DoorStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "available" => DoorStatus::Available,
            "reserved" => DoorStatus::Reserved,
            "occupied" => DoorStatus::Occupied,
            "open" => DoorStatus::Open,
            "closed" => DoorStatus::Closed,
            "offline" => DoorStatus::Offline,
            "malfunction" => DoorStatus::Malfunction,
            "maintenance" => DoorStatus::Maintenance,
            "cleaning" => DoorStatus::Cleaning,
            _ => DoorStatus::Unrecognized(raw),
        }
    }
}

impl From<DoorStatus> for String {
    fn from(status: DoorStatus) -> Self {
        status.as_str().to_string()
    }
}
