// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the domain types and the request/response structures
//! used by the REST API. Response types derive `Serialize` and `ToSchema`
//! for JSON handling and OpenAPI documentation.
//!
//! ## Language Type
//!
//! [`Language`] is the closed set of UI languages the platform ships
//! templates for. Anything outside it is rejected at the API boundary.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps a chain account identifier. Both
//! base58 Solana addresses (up to 44 characters) and 0x-prefixed hex
//! addresses fit the accepted shape: 1 to 44 ASCII alphanumeric characters. Addresses are case-sensitive
//! and stored exactly as given.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Language
// =============================================================================

/// A supported UI language.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash,
)]
pub enum Language {
    /// English, the platform default.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Traditional Chinese.
    #[serde(rename = "zh_Hant")]
    TraditionalChinese,
}

impl Language {
    /// Every supported language, default first.
    pub const ALL: [Language; 2] = [Language::English, Language::TraditionalChinese];

    /// Look up a language by its exact code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Language> {
        Self::ALL.into_iter().find(|language| language.code() == code)
    }

    /// Wire code, as used in cookies, session bindings and JSON.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::TraditionalChinese => "zh_Hant",
        }
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::TraditionalChinese => "Traditional Chinese",
        }
    }

    /// Name of the language in the language itself.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::TraditionalChinese => "繁體中文",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Maximum accepted length of a wallet address.
pub const WALLET_ADDRESS_MAX_LEN: usize = 44;

/// Chain account identifier, the natural key of persisted preferences.
///
/// # Example
///
/// ```rust,ignore
/// let addr: WalletAddress = "0x52908400098527886E0F7030069857D2E4169EE7".parse()?;
/// ```
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[schema(value_type = String)]
pub struct WalletAddress(String);

/// Rejected wallet address, carrying the raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wallet address: {0:?}")]
pub struct InvalidWalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = InvalidWalletAddress;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let valid = !value.is_empty()
            && value.len() <= WALLET_ADDRESS_MAX_LEN
            && value.bytes().all(|b| b.is_ascii_alphanumeric());
        if valid {
            Ok(WalletAddress(value.to_string()))
        } else {
            Err(InvalidWalletAddress(value.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// User Preference Models
// =============================================================================

/// Persisted language preference, one per wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserPreference {
    /// Wallet the preference belongs to.
    pub wallet_address: WalletAddress,
    /// Preferred UI language.
    pub language: Language,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Response for GET /api/user_preferences/{wallet_address}
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPreferenceResponse {
    pub success: bool,
    pub preference: UserPreference,
}

// =============================================================================
// Language Models
// =============================================================================

/// Request to change the UI language.
///
/// The field is kept as raw JSON so that missing, empty and non-string
/// values can be told apart and reported with their own messages.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChangeLanguageRequest {
    /// Requested language code (`en` or `zh_Hant`).
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "zh_Hant")]
    pub language: Option<serde_json::Value>,
}

/// Successful language change.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ChangeLanguageResponse {
    pub success: bool,
    /// The confirmed language.
    pub language: Language,
    /// Human-readable confirmation.
    pub message: String,
}

/// Storage layer that supplied a resolved language.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LanguageSource {
    Session,
    Cookie,
    Wallet,
    Default,
}

/// Response for GET /api/language
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ResolvedLanguageResponse {
    pub success: bool,
    pub language: Language,
    pub source: LanguageSource,
}

/// Entry in the supported language list.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: Language,
    pub name: String,
    pub native_name: String,
}

/// Response for GET /api/languages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub success: bool,
    pub default: Language,
    pub languages: Vec<LanguageInfo>,
}
