// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Language Preference Service
//!
//! Validates language change requests and propagates the choice to the three
//! storage layers, and resolves the active language for a request.
//!
//! ## Resolution Order
//!
//! 1. language bound in the server-side session
//! 2. `language` cookie sent by the client
//! 3. persisted preference of the claimed wallet
//! 4. [`Language::default`] (`en`)
//!
//! Unsupported values at any layer are skipped.

use axum::http::StatusCode;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::context::RequestContext;
use crate::cookies::{SetCookie, LANGUAGE_COOKIE, LANGUAGE_COOKIE_MAX_AGE};
use crate::error::ApiError;
use crate::models::{
    ChangeLanguageResponse, Language, LanguageSource, UserPreference, WalletAddress,
};
use crate::session::LANGUAGE_KEY;
use crate::storage::{PreferenceDatabase, PreferenceDbError};

/// Confirmation returned after a successful change.
pub const LANGUAGE_UPDATED_MESSAGE: &str = "语言设置已更新";

/// Language change failure.
///
/// Every variant except [`LanguageError::Internal`] is a validation failure
/// and is raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("缺少语言参数")]
    MissingLanguage,

    #[error("不支持的语言: {0}")]
    UnsupportedLanguage(String),

    #[error("无效的钱包地址: {0}")]
    InvalidWallet(String),

    #[error("设置语言失败: {0}")]
    Internal(String),
}

impl LanguageError {
    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LanguageError::MissingLanguage => "missing_language",
            LanguageError::UnsupportedLanguage(_) => "unsupported_language",
            LanguageError::InvalidWallet(_) => "invalid_wallet",
            LanguageError::Internal(_) => "internal_error",
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, LanguageError::Internal(_))
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        ApiError::new(err.status_code(), err.to_string())
    }
}

/// Persistence seam for per-wallet preferences.
pub trait PreferenceStore {
    fn upsert(
        &self,
        wallet_address: &WalletAddress,
        language: Language,
    ) -> Result<UserPreference, PreferenceDbError>;

    fn get(&self, wallet_address: &WalletAddress)
        -> Result<Option<UserPreference>, PreferenceDbError>;
}

impl PreferenceStore for PreferenceDatabase {
    fn upsert(
        &self,
        wallet_address: &WalletAddress,
        language: Language,
    ) -> Result<UserPreference, PreferenceDbError> {
        PreferenceDatabase::upsert(self, wallet_address, language)
    }

    fn get(
        &self,
        wallet_address: &WalletAddress,
    ) -> Result<Option<UserPreference>, PreferenceDbError> {
        PreferenceDatabase::get(self, wallet_address)
    }
}

/// Validate the raw `language` field of a change request.
///
/// Absent, `null` and empty values (including `""`, `false` and `0`) count
/// as missing. Anything else outside the supported set is unsupported.
pub fn parse_requested_language(requested: Option<&Value>) -> Result<Language, LanguageError> {
    let value = match requested {
        None => return Err(LanguageError::MissingLanguage),
        Some(value) if is_empty_value(value) => return Err(LanguageError::MissingLanguage),
        Some(value) => value,
    };

    match value {
        Value::String(code) => {
            Language::from_code(code).ok_or_else(|| LanguageError::UnsupportedLanguage(code.clone()))
        }
        other => Err(LanguageError::UnsupportedLanguage(other.to_string())),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Change the caller's UI language.
///
/// Validates the request, upserts the claimed wallet's preference, binds the
/// language in the session and queues the `language` cookie. A wallet claim
/// that is not a valid address is skipped. On any error the context is left
/// untouched.
pub fn change_language<S>(
    ctx: &mut RequestContext,
    requested: Option<&Value>,
    preferences: &S,
) -> Result<ChangeLanguageResponse, LanguageError>
where
    S: PreferenceStore + ?Sized,
{
    let language = parse_requested_language(requested).inspect_err(|e| {
        debug!(error_code = e.error_code(), "Rejected language change");
    })?;

    let wallet = ctx
        .claimed_wallet()
        .and_then(|raw| match raw.parse::<WalletAddress>() {
            Ok(wallet) => Some(wallet),
            Err(e) => {
                warn!(wallet = %e.0, "Ignoring malformed wallet claim");
                None
            }
        });

    if let Some(wallet) = &wallet {
        preferences.upsert(wallet, language).map_err(|e| {
            error!(
                wallet = %wallet,
                language = language.code(),
                error = %e,
                "Failed to persist language preference"
            );
            LanguageError::Internal(e.to_string())
        })?;
    }

    ctx.set_session_value(LANGUAGE_KEY, language.code());
    ctx.set_cookie(SetCookie::new(LANGUAGE_COOKIE, language.code()).max_age(LANGUAGE_COOKIE_MAX_AGE));

    info!(
        language = language.code(),
        wallet = wallet.as_ref().map(WalletAddress::as_str),
        "Language changed"
    );

    Ok(ChangeLanguageResponse {
        success: true,
        language,
        message: LANGUAGE_UPDATED_MESSAGE.to_string(),
    })
}

/// Resolve the active language for a request and report which layer supplied it.
pub fn resolve_language<S>(ctx: &RequestContext, preferences: &S) -> (Language, LanguageSource)
where
    S: PreferenceStore + ?Sized,
{
    if let Some(language) = ctx.session_value(LANGUAGE_KEY).and_then(Language::from_code) {
        return (language, LanguageSource::Session);
    }

    if let Some(language) = ctx.cookie(LANGUAGE_COOKIE).and_then(Language::from_code) {
        return (language, LanguageSource::Cookie);
    }

    if let Some(wallet) = ctx
        .claimed_wallet()
        .and_then(|raw| raw.parse::<WalletAddress>().ok())
    {
        match preferences.get(&wallet) {
            Ok(Some(preference)) => return (preference.language, LanguageSource::Wallet),
            Ok(None) => {}
            Err(e) => warn!(
                wallet = %wallet,
                error = %e,
                "Failed to read language preference, falling back to default"
            ),
        }
    }

    (Language::default(), LanguageSource::Default)
}
