// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod live;
pub mod lockers;

pub use live::{LiveCollection, LiveDocument, Snapshot};
pub use lockers::{LockerAdmin, NewLocker};
