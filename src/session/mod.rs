// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Server-Side Sessions
//!
//! Sessions are key-value bindings kept in process memory and addressed by an
//! opaque random id carried in the `session` cookie.
//!
//! ## Lifetime
//!
//! - An entry expires once it has been idle for longer than the store TTL.
//!   Expired entries are dropped lazily on access and in bulk by the
//!   [`SessionReaper`].
//! - The store is an LRU bounded by capacity; when full, the least recently
//!   used session is evicted.

mod reaper;

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use uuid::Uuid;

pub use reaper::SessionReaper;

/// Session key holding the UI language.
pub const LANGUAGE_KEY: &str = "language";

/// Bindings stored in one session.
pub type SessionData = HashMap<String, String>;

/// The session store mutex was poisoned by a panicking holder.
#[derive(Debug, thiserror::Error)]
#[error("session store unavailable")]
pub struct SessionStoreError;

struct SessionEntry {
    data: SessionData,
    last_access: Instant,
}

/// In-process LRU session store with idle expiry.
pub struct SessionStore {
    sessions: Mutex<LruCache<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a new store with the given capacity and idle TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Generate a fresh session id.
    pub fn new_session_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Load a session's bindings and refresh its access time.
    ///
    /// Returns `None` if the session is unknown or has expired.
    pub fn load(&self, session_id: &str) -> Result<Option<SessionData>, SessionStoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionStoreError)?;
        let Some(entry) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if entry.last_access.elapsed() >= self.ttl {
            sessions.pop(session_id);
            return Ok(None);
        }
        entry.last_access = Instant::now();
        Ok(Some(entry.data.clone()))
    }

    /// Replace a session's bindings, creating the session if needed.
    pub fn store(&self, session_id: &str, data: SessionData) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionStoreError)?;
        sessions.put(
            session_id.to_string(),
            SessionEntry {
                data,
                last_access: Instant::now(),
            },
        );
        Ok(())
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionStoreError)?;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| entry.last_access.elapsed() >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            sessions.pop(id);
        }
        Ok(expired.len())
    }

    /// Number of sessions currently held, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(language: &str) -> SessionData {
        SessionData::from([(LANGUAGE_KEY.to_string(), language.to_string())])
    }

    #[test]
    fn store_and_load() {
        let store = SessionStore::new(10, Duration::from_secs(300));
        assert!(store.load("abc").unwrap().is_none());

        store.store("abc", bindings("zh_Hant")).unwrap();

        let data = store.load("abc").unwrap().unwrap();
        assert_eq!(data.get(LANGUAGE_KEY).map(String::as_str), Some("zh_Hant"));
    }

    #[test]
    fn store_overwrites_bindings() {
        let store = SessionStore::new(10, Duration::from_secs(300));
        store.store("abc", bindings("en")).unwrap();
        store.store("abc", bindings("zh_Hant")).unwrap();

        assert_eq!(store.len(), 1);
        let data = store.load("abc").unwrap().unwrap();
        assert_eq!(data[LANGUAGE_KEY], "zh_Hant");
    }

    #[test]
    fn expired_sessions_are_not_returned() {
        let store = SessionStore::new(10, Duration::from_millis(1));
        store.store("abc", bindings("en")).unwrap();

        std::thread::sleep(Duration::from_millis(5));

        assert!(store.load("abc").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_removes_only_expired() {
        let store = SessionStore::new(10, Duration::from_millis(50));
        store.store("old", bindings("en")).unwrap();
        std::thread::sleep(Duration::from_millis(80));
        store.store("fresh", bindings("zh_Hant")).unwrap();

        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.load("fresh").unwrap().is_some());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let store = SessionStore::new(2, Duration::from_secs(300));
        store.store("a", bindings("en")).unwrap();
        store.store("b", bindings("en")).unwrap();
        // Touch "a" so "b" becomes the eviction candidate
        store.load("a").unwrap();
        store.store("c", bindings("en")).unwrap();

        assert!(store.load("a").unwrap().is_some());
        assert!(store.load("b").unwrap().is_none());
        assert!(store.load("c").unwrap().is_some());
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionStore::new_session_id();
        let b = SessionStore::new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
