// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Locker-Admin: administrative backend for a smart-locker rental fleet.
//!
//! This crate provides the dashboard API over a shared Firestore document
//! store: live locker inventory, lock/door control, pricing, and
//! reservation usage analytics. Physical lock and door state is owned by
//! the device firmware writing into the same store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use models::{Locker, Reservation};
use services::{LiveCollection, LockerAdmin};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Live mirror of the `lockers` collection.
    pub lockers: LiveCollection<Locker>,
    /// Live mirror of the `reservations` collection.
    pub reservations: LiveCollection<Reservation>,
    pub admin: LockerAdmin,
}
