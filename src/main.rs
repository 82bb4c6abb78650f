// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rwa_hub_server::{
    api::router,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    session::SessionReaper,
    state::AppState,
    storage::PreferenceDatabase,
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal(handle: Handle<SocketAddr>, shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let db_path = config.preferences_db_path();
    let preferences = match PreferenceDatabase::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "Failed to open preference database");
            return ExitCode::FAILURE;
        }
    };
    info!(path = %db_path.display(), "Preference database ready");

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(host = %config.host, port = config.port, error = %e, "Failed to parse bind address");
            return ExitCode::FAILURE;
        }
    };

    let tls = config.tls.clone();
    let sweep_interval = config.session_sweep_interval;
    let state = AppState::new(config, preferences);

    let shutdown = CancellationToken::new();
    let reaper = SessionReaper::new(Arc::clone(&state.sessions), sweep_interval);
    let reaper_task = tokio::spawn(reaper.run(shutdown.clone()));

    let app = router(state);
    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), shutdown.clone()));

    let served = match tls {
        Some(paths) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                error!("Failed to install rustls crypto provider");
                return ExitCode::FAILURE;
            }

            let tls_config = match RustlsConfig::from_pem_file(&paths.cert, &paths.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(
                        cert = %paths.cert.display(),
                        key = %paths.key.display(),
                        error = %e,
                        "Failed to load TLS certificate"
                    );
                    return ExitCode::FAILURE;
                }
            };

            info!("RWA-HUB language service listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("RWA-HUB language service listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    if let Err(e) = reaper_task.await {
        error!(error = %e, "Session reaper task failed");
    }

    match served {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
