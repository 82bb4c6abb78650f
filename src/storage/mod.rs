// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage
//!
//! Per-wallet language preferences live in a single redb file under
//! `DATA_DIR`. Sessions are not persisted; see [`crate::session`].

pub mod preferences;

pub use preferences::{PreferenceDatabase, PreferenceDbError, PreferenceDbResult};
