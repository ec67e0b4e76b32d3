// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod instant;
pub mod locker;
pub mod reservation;
pub mod status;
pub mod usage;

pub use instant::WireInstant;
pub use locker::{LockState, Locker, LockerDoc, SizeClass};
pub use reservation::{Reservation, ReservationDoc};
pub use status::DoorStatus;
pub use usage::UsageStats;
