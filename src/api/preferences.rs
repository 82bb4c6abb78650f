// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User preference endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::error;

use crate::{
    error::{ApiError, ErrorBody},
    language::LanguageError,
    models::{InvalidWalletAddress, UserPreferenceResponse, WalletAddress},
    state::AppState,
};

/// Get the stored preference for a wallet.
#[utoipa::path(
    get,
    path = "/api/user_preferences/{wallet_address}",
    params(
        ("wallet_address" = String, Path, description = "Wallet address the preference is keyed by")
    ),
    tag = "Preferences",
    responses(
        (status = 200, body = UserPreferenceResponse),
        (status = 400, description = "Malformed wallet address", body = ErrorBody),
        (status = 404, description = "No preference stored", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn get_user_preference(
    Path(wallet_address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UserPreferenceResponse>, ApiError> {
    let wallet: WalletAddress = wallet_address
        .parse()
        .map_err(|e: InvalidWalletAddress| ApiError::from(LanguageError::InvalidWallet(e.0)))?;

    let preferences = state.preferences.clone();
    let lookup_wallet = wallet.clone();
    let stored = tokio::task::spawn_blocking(move || preferences.get(&lookup_wallet))
        .await
        .map_err(|e| ApiError::internal(format!("读取用户偏好失败: {e}")))?
        .map_err(|e| {
            error!(wallet = %wallet, error = %e, "Failed to read language preference");
            ApiError::internal(format!("读取用户偏好失败: {e}"))
        })?;

    match stored {
        Some(preference) => Ok(Json(UserPreferenceResponse {
            success: true,
            preference,
        })),
        None => Err(ApiError::not_found(format!("未找到用户偏好: {wallet}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::state::test_support::create_test_state;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn returns_stored_preference() {
        let (state, _dir) = create_test_state();
        let wallet: WalletAddress = "abc123".parse().unwrap();
        state
            .preferences
            .upsert(&wallet, Language::TraditionalChinese)
            .unwrap();

        let Json(response) = get_user_preference(Path("abc123".into()), State(state))
            .await
            .expect("lookup succeeds");

        assert!(response.success);
        assert_eq!(response.preference.wallet_address, wallet);
        assert_eq!(response.preference.language, Language::TraditionalChinese);
    }

    #[tokio::test]
    async fn unknown_wallet_is_not_found() {
        let (state, _dir) = create_test_state();
        let err = get_user_preference(Path("abc123".into()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "未找到用户偏好: abc123");
    }

    #[tokio::test]
    async fn malformed_wallet_is_bad_request() {
        let (state, _dir) = create_test_state();
        let err = get_user_preference(Path("bad-wallet".into()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "无效的钱包地址: bad-wallet");
    }
}
