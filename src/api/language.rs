// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Language endpoints.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;
use tracing::error;

use crate::{
    context::{CookieHeaders, RequestContext},
    error::{ApiError, ErrorBody},
    language::{self, LanguageError},
    models::{
        ChangeLanguageRequest, ChangeLanguageResponse, Language, LanguageInfo, LanguagesResponse,
        ResolvedLanguageResponse,
    },
    state::AppState,
};

/// Change the UI language.
///
/// Binds the language to the session, sets the `language` cookie for one
/// year and, when the caller claims a wallet via `X-Wallet-Address`, stores
/// it as that wallet's preference.
///
/// The body is read as JSON regardless of `Content-Type`; a body that is not
/// a JSON object is treated as missing the `language` field.
#[utoipa::path(
    post,
    path = "/api/change_language",
    request_body = ChangeLanguageRequest,
    tag = "Language",
    params(
        ("X-Wallet-Address" = Option<String>, Header, description = "Wallet whose preference should be updated")
    ),
    responses(
        (status = 200, description = "Language changed", body = ChangeLanguageResponse,
            headers(("Set-Cookie" = String, description = "language=<code>; Max-Age=31536000; Path=/"))),
        (status = 400, description = "Missing or unsupported language", body = ErrorBody),
        (status = 500, description = "Internal failure", body = ErrorBody)
    )
)]
pub async fn change_language(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<(CookieHeaders, Json<ChangeLanguageResponse>), ApiError> {
    let requested = match serde_json::from_slice::<Value>(&body) {
        Ok(object @ Value::Object(_)) => serde_json::from_value::<ChangeLanguageRequest>(object)
            .ok()
            .and_then(|request| request.language),
        _ => None,
    };

    let preferences = Arc::clone(&state.preferences);
    let (ctx, outcome) = tokio::task::spawn_blocking(move || {
        let mut ctx = ctx;
        let outcome = language::change_language(&mut ctx, requested.as_ref(), preferences.as_ref());
        (ctx, outcome)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Language change task failed");
        LanguageError::Internal(e.to_string())
    })?;

    let response = outcome?;

    let headers = ctx
        .commit(&state.sessions, state.config.cookie_secure)
        .map_err(|e| {
            error!(error = %e, "Failed to save session");
            LanguageError::Internal(e.to_string())
        })?;

    Ok((headers, Json(response)))
}

/// Resolve the active UI language.
///
/// Checks the session, then the `language` cookie, then the claimed wallet's
/// stored preference, then falls back to `en`.
#[utoipa::path(
    get,
    path = "/api/language",
    tag = "Language",
    params(
        ("X-Wallet-Address" = Option<String>, Header, description = "Wallet whose stored preference may apply")
    ),
    responses(
        (status = 200, description = "Resolved language", body = ResolvedLanguageResponse),
        (status = 500, description = "Internal failure", body = ErrorBody)
    )
)]
pub async fn current_language(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ResolvedLanguageResponse>, ApiError> {
    let preferences = Arc::clone(&state.preferences);
    let (language, source) =
        tokio::task::spawn_blocking(move || language::resolve_language(&ctx, preferences.as_ref()))
            .await
            .map_err(|e| {
                error!(error = %e, "Language resolution task failed");
                ApiError::internal(e.to_string())
            })?;

    Ok(Json(ResolvedLanguageResponse {
        success: true,
        language,
        source,
    }))
}

/// List the supported UI languages.
#[utoipa::path(
    get,
    path = "/api/languages",
    tag = "Language",
    responses((status = 200, body = LanguagesResponse))
)]
pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        success: true,
        default: Language::default(),
        languages: Language::ALL
            .into_iter()
            .map(|language| LanguageInfo {
                code: language,
                name: language.name().to_string(),
                native_name: language.native_name().to_string(),
            })
            .collect(),
    })
}
