// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        ChangeLanguageRequest, ChangeLanguageResponse, Language, LanguageInfo, LanguageSource,
        LanguagesResponse, ResolvedLanguageResponse, UserPreference, UserPreferenceResponse,
        WalletAddress,
    },
    state::AppState,
};

pub mod health;
pub mod language;
pub mod preferences;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/change_language", post(language::change_language))
        .route("/language", get(language::current_language))
        .route("/languages", get(language::list_languages))
        .route(
            "/user_preferences/{wallet_address}",
            get(preferences::get_user_preference),
        );

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        language::change_language,
        language::current_language,
        language::list_languages,
        preferences::get_user_preference,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Language,
            LanguageSource,
            LanguageInfo,
            WalletAddress,
            UserPreference,
            ChangeLanguageRequest,
            ChangeLanguageResponse,
            ResolvedLanguageResponse,
            LanguagesResponse,
            UserPreferenceResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Language", description = "UI language negotiation"),
        (name = "Preferences", description = "Per-wallet stored preferences"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
