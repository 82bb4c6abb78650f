// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Cookie` request header parsing and `Set-Cookie` rendering.
//!
//! Only the attributes this service emits are modelled: `Max-Age`, `Path`,
//! `HttpOnly`, `SameSite` and `Secure`.

use std::collections::HashMap;
use std::fmt;

use axum::http::{header::COOKIE, HeaderMap};

/// Name of the cookie carrying the UI language.
pub const LANGUAGE_COOKIE: &str = "language";

/// Name of the cookie carrying the server-side session id.
pub const SESSION_COOKIE: &str = "session";

/// Name of the cookie a client may use to claim a wallet.
pub const WALLET_COOKIE: &str = "wallet_address";

/// Lifetime of the language cookie: one year.
pub const LANGUAGE_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

/// Cookies sent by the client, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingCookies {
    values: HashMap<String, String>,
}

impl IncomingCookies {
    /// Parse every `Cookie` header in the map.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                values
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
}

/// One `Set-Cookie` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub max_age: Option<u64>,
    pub path: String,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    pub secure: bool,
}

impl SetCookie {
    /// A site-wide cookie with no other attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: "/".to_string(),
            http_only: false,
            same_site: None,
            secure: false,
        }
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        write!(f, "; Path={}", self.path)?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        match self.same_site {
            Some(SameSite::Lax) => f.write_str("; SameSite=Lax")?,
            None => {}
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_multiple_pairs_and_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("language=zh_Hant; session=abc"));
        headers.append(COOKIE, HeaderValue::from_static("wallet_address=\"7xKX\""));

        let cookies = IncomingCookies::from_headers(&headers);
        assert_eq!(cookies.get("language"), Some("zh_Hant"));
        assert_eq!(cookies.get("session"), Some("abc"));
        assert_eq!(cookies.get("wallet_address"), Some("7xKX"));
        assert_eq!(cookies.get("missing"), None);
    }

    #[test]
    fn first_occurrence_wins_and_junk_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("junk; =x; language=en; language=zh_Hant"),
        );

        let cookies = IncomingCookies::from_headers(&headers);
        assert_eq!(cookies.get("language"), Some("en"));
    }

    #[test]
    fn language_cookie_renders_like_the_web_app_expects() {
        let cookie = SetCookie::new(LANGUAGE_COOKIE, "zh_Hant").max_age(LANGUAGE_COOKIE_MAX_AGE);
        assert_eq!(
            cookie.to_string(),
            "language=zh_Hant; Max-Age=31536000; Path=/"
        );
    }

    #[test]
    fn session_cookie_renders_all_attributes() {
        let cookie = SetCookie::new(SESSION_COOKIE, "id")
            .http_only()
            .same_site(SameSite::Lax)
            .secure(true);
        assert_eq!(
            cookie.to_string(),
            "session=id; Path=/; HttpOnly; SameSite=Lax; Secure"
        );
    }
}
