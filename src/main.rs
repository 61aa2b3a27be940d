// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use siwe_auth_server::{
    api::router,
    cache::{InMemoryCache, KeyValueCache, RedisCache},
    config::{Settings, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    state::AppState,
};

/// Grace period for in-flight requests on shutdown.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    init_tracing();

    let settings = Settings::from_env().expect("Invalid configuration");
    let addr = settings.bind_addr().expect("Failed to parse bind address");

    let cache: Arc<dyn KeyValueCache> = match &settings.redis_url {
        Some(url) => Arc::new(
            RedisCache::connect(url)
                .await
                .expect("Failed to connect to Redis"),
        ),
        None => Arc::new(InMemoryCache::new(settings.nonce_cache_capacity)),
    };
    tracing::info!(
        backend = cache.backend(),
        nonce_ttl_secs = settings.nonce_ttl.as_secs(),
        "Nonce cache ready"
    );

    let state =
        AppState::from_settings(&settings, cache.clone()).expect("Failed to load JWT keys");
    if !state.tokens.can_verify() {
        tracing::warn!("JWT_PUBLIC_KEY not set, /api/v1/auth/me will be unavailable");
    }
    let app = router(state);

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    tokio::spawn({
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        async move {
            shutdown.cancelled().await;
            tracing::info!(
                grace_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
                "Shutting down, draining connections"
            );
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
        }
    });

    match &settings.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .expect("Failed to load TLS certificate and key");

            tracing::info!(%addr, "SIWE auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            tracing::info!(%addr, "SIWE auth server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    if let Err(e) = cache.close().await {
        tracing::warn!(error = %e, "Failed to close nonce cache");
    }
    drop(cache);
    tracing::info!("Nonce cache closed, server stopped");
}

/// `LOG_FORMAT=json` selects structured output; anything else is human-readable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    shutdown.cancel();
}
