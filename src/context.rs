// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped context.
//!
//! [`RequestContext`] gathers everything a handler may read about the caller
//! (session bindings, cookies, the claimed wallet) and accumulates everything
//! it wants to change (session bindings, outbound cookies). Nothing touches
//! the session store or the response until [`RequestContext::commit`].
//!
//! ```rust,ignore
//! async fn handler(State(state): State<AppState>, mut ctx: RequestContext) -> impl IntoResponse {
//!     ctx.set_session_value("language", "en");
//!     let headers = ctx.commit(&state.sessions, state.config.cookie_secure)?;
//!     (headers, "ok")
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{
        header::{HeaderName, SET_COOKIE},
        request::Parts,
    },
    response::AppendHeaders,
};
use tracing::error;

use crate::cookies::{IncomingCookies, SameSite, SetCookie, SESSION_COOKIE, WALLET_COOKIE};
use crate::error::ApiError;
use crate::session::{SessionData, SessionStore, SessionStoreError};
use crate::state::AppState;

/// Header a client uses to claim a wallet address.
pub const WALLET_HEADER: &str = "x-wallet-address";

/// `Set-Cookie` headers produced by a committed context.
pub type CookieHeaders = AppendHeaders<Vec<(HeaderName, String)>>;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Id of a live session presented by the client, if any.
    session_id: Option<String>,
    session: SessionData,
    session_dirty: bool,
    cookies: IncomingCookies,
    claimed_wallet: Option<String>,
    outbound: Vec<SetCookie>,
}

impl RequestContext {
    /// Build a context from request parts, loading the caller's session.
    ///
    /// An unknown or expired session id is ignored; a fresh id is issued on
    /// commit if the handler writes to the session.
    pub fn from_parts(parts: &Parts, sessions: &SessionStore) -> Result<Self, SessionStoreError> {
        let cookies = IncomingCookies::from_headers(&parts.headers);

        let (session_id, session) = match cookies.get(SESSION_COOKIE) {
            Some(id) => match sessions.load(id)? {
                Some(data) => (Some(id.to_string()), data),
                None => (None, SessionData::new()),
            },
            None => (None, SessionData::new()),
        };

        let claimed_wallet = parts
            .headers
            .get(WALLET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                cookies
                    .get(WALLET_COOKIE)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            });

        Ok(Self {
            session_id,
            session,
            session_dirty: false,
            cookies,
            claimed_wallet,
            outbound: Vec::new(),
        })
    }

    /// Context with the given cookies and wallet claim and an empty session.
    pub fn with_request(cookies: IncomingCookies, claimed_wallet: Option<String>) -> Self {
        Self {
            cookies,
            claimed_wallet,
            ..Self::default()
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn session_value(&self, key: &str) -> Option<&str> {
        self.session.get(key).map(String::as_str)
    }

    pub fn set_session_value(&mut self, key: &str, value: impl Into<String>) {
        self.session.insert(key.to_string(), value.into());
        self.session_dirty = true;
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name)
    }

    /// Raw wallet claim from the `X-Wallet-Address` header or the wallet cookie.
    pub fn claimed_wallet(&self) -> Option<&str> {
        self.claimed_wallet.as_deref()
    }

    /// Queue a cookie for the response. A later cookie with the same name
    /// replaces an earlier one.
    pub fn set_cookie(&mut self, cookie: SetCookie) {
        self.outbound.retain(|c| c.name != cookie.name);
        self.outbound.push(cookie);
    }

    pub fn outbound_cookies(&self) -> &[SetCookie] {
        &self.outbound
    }

    /// Persist session changes and render the outbound cookies.
    pub fn commit(
        mut self,
        sessions: &SessionStore,
        secure_session_cookie: bool,
    ) -> Result<CookieHeaders, SessionStoreError> {
        if self.session_dirty {
            let session_id = match self.session_id.take() {
                Some(id) => id,
                None => {
                    let id = SessionStore::new_session_id();
                    self.set_cookie(
                        SetCookie::new(SESSION_COOKIE, id.clone())
                            .http_only()
                            .same_site(SameSite::Lax)
                            .secure(secure_session_cookie),
                    );
                    id
                }
            };
            sessions.store(&session_id, self.session)?;
        }

        Ok(AppendHeaders(
            self.outbound
                .iter()
                .map(|cookie| (SET_COOKIE, cookie.to_string()))
                .collect(),
        ))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        RequestContext::from_parts(parts, &state.sessions).map_err(|e| {
            error!(error = %e, "Failed to load request session");
            ApiError::internal(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LANGUAGE_KEY;
    use axum::http::Request;
    use std::time::Duration;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn store() -> SessionStore {
        SessionStore::new(10, Duration::from_secs(300))
    }

    #[test]
    fn loads_known_session() {
        let sessions = store();
        sessions
            .store(
                "sess1",
                SessionData::from([(LANGUAGE_KEY.to_string(), "zh_Hant".to_string())]),
            )
            .unwrap();

        let parts = parts_with(&[("cookie", "session=sess1; language=en")]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();

        assert_eq!(ctx.session_id(), Some("sess1"));
        assert_eq!(ctx.session_value(LANGUAGE_KEY), Some("zh_Hant"));
        assert_eq!(ctx.cookie("language"), Some("en"));
    }

    #[test]
    fn unknown_session_is_dropped() {
        let sessions = store();
        let parts = parts_with(&[("cookie", "session=forged")]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();

        assert_eq!(ctx.session_id(), None);
        assert_eq!(ctx.session_value(LANGUAGE_KEY), None);
    }

    #[test]
    fn wallet_header_wins_over_cookie() {
        let sessions = store();
        let parts = parts_with(&[
            ("x-wallet-address", "HeaderWallet1"),
            ("cookie", "wallet_address=CookieWallet1"),
        ]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();
        assert_eq!(ctx.claimed_wallet(), Some("HeaderWallet1"));

        let parts = parts_with(&[("cookie", "wallet_address=CookieWallet1")]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();
        assert_eq!(ctx.claimed_wallet(), Some("CookieWallet1"));
    }

    #[test]
    fn empty_wallet_cookie_is_not_a_claim() {
        let sessions = store();
        let parts = parts_with(&[("cookie", "wallet_address=; language=en")]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();
        assert_eq!(ctx.claimed_wallet(), None);

        let parts = parts_with(&[("x-wallet-address", ""), ("cookie", "wallet_address=")]);
        let ctx = RequestContext::from_parts(&parts, &sessions).unwrap();
        assert_eq!(ctx.claimed_wallet(), None);
    }

    #[test]
    fn commit_without_changes_touches_nothing() {
        let sessions = store();
        let ctx = RequestContext::default();
        let AppendHeaders(headers) = ctx.commit(&sessions, false).unwrap();

        assert!(headers.is_empty());
        assert!(sessions.is_empty());
    }

    #[test]
    fn commit_issues_session_cookie_for_new_session() {
        let sessions = store();
        let mut ctx = RequestContext::default();
        ctx.set_session_value(LANGUAGE_KEY, "zh_Hant");

        let AppendHeaders(headers) = ctx.commit(&sessions, true).unwrap();
        assert_eq!(headers.len(), 1);
        let (name, value) = &headers[0];
        assert_eq!(*name, SET_COOKIE);
        assert!(value.starts_with("session="));
        assert!(value.ends_with("; Path=/; HttpOnly; SameSite=Lax; Secure"));

        let id = value
            .trim_start_matches("session=")
            .split(';')
            .next()
            .unwrap();
        let data = sessions.load(id).unwrap().unwrap();
        assert_eq!(data[LANGUAGE_KEY], "zh_Hant");
    }

    #[test]
    fn commit_reuses_live_session() {
        let sessions = store();
        sessions.store("sess1", SessionData::new()).unwrap();

        let parts = parts_with(&[("cookie", "session=sess1")]);
        let mut ctx = RequestContext::from_parts(&parts, &sessions).unwrap();
        ctx.set_session_value(LANGUAGE_KEY, "en");

        let AppendHeaders(headers) = ctx.commit(&sessions, false).unwrap();
        assert!(headers.is_empty());
        assert_eq!(sessions.load("sess1").unwrap().unwrap()[LANGUAGE_KEY], "en");
    }

    #[test]
    fn set_cookie_replaces_same_name() {
        let mut ctx = RequestContext::default();
        ctx.set_cookie(SetCookie::new("language", "en"));
        ctx.set_cookie(SetCookie::new("language", "zh_Hant"));

        assert_eq!(ctx.outbound_cookies().len(), 1);
        assert_eq!(ctx.outbound_cookies()[0].value, "zh_Hant");
    }
}
