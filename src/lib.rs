// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RWA-HUB - Language Preference Service
//!
//! This crate resolves, validates and persists the UI language of RWA-HUB
//! visitors across the server-side session, the `language` cookie and a
//! per-wallet preference record.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `context` - Request-scoped session and cookie context
//! - `language` - Language change and resolution
//! - `session` - In-memory session store and expiry reaper
//! - `storage` - Per-wallet preference database (redb)

pub mod api;
pub mod config;
pub mod context;
pub mod cookies;
pub mod error;
pub mod language;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
