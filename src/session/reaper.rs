// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Expired Session Reaper
//!
//! Background task that periodically drops sessions whose idle time exceeds
//! the store TTL, so abandoned sessions do not sit in memory until LRU
//! eviction reaches them.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SessionStore;

/// Background sweeper for expired sessions.
pub struct SessionReaper {
    sessions: Arc<SessionStore>,
    interval: Duration,
}

impl SessionReaper {
    pub fn new(sessions: Arc<SessionStore>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(reaper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Session reaper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session reaper shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    /// Execute one sweep.
    fn sweep(&self) {
        match self.sessions.purge_expired() {
            Ok(0) => {}
            Ok(removed) => debug!(
                removed,
                remaining = self.sessions.len(),
                "Session reaper: purged expired sessions"
            ),
            Err(e) => warn!(error = %e, "Session reaper: sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionData, LANGUAGE_KEY};

    #[tokio::test]
    async fn reaper_purges_and_stops_on_cancel() {
        let sessions = Arc::new(SessionStore::new(10, Duration::from_millis(1)));
        sessions
            .store(
                "stale",
                SessionData::from([(LANGUAGE_KEY.to_string(), "en".to_string())]),
            )
            .unwrap();

        let shutdown = CancellationToken::new();
        let reaper = SessionReaper::new(Arc::clone(&sessions), Duration::from_millis(10));
        let handle = tokio::spawn(reaper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sessions.is_empty());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper stops after cancellation")
            .unwrap();
    }
}
