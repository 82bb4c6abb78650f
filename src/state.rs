// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::Config;
use crate::session::SessionStore;
use crate::storage::PreferenceDatabase;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub preferences: Arc<PreferenceDatabase>,
}

impl AppState {
    pub fn new(config: Config, preferences: PreferenceDatabase) -> Self {
        let sessions = SessionStore::new(config.session_capacity, config.session_ttl);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            preferences: Arc::new(preferences),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Fresh state backed by a throwaway database.
    pub fn create_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let preferences =
            PreferenceDatabase::open(&config.preferences_db_path()).expect("open database");
        (AppState::new(config, preferences), dir)
    }
}
