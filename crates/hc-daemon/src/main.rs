//! hc-daemon entry point.
//!
//! Thin on purpose: sets up tracing, loads config, builds the shared state,
//! wires middleware, and starts the HTTP server. Route handlers live in
//! `routes.rs`; shared state lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use hc_config::{report_unused_keys, AppConfig, ConfigConsumer, UnusedKeyPolicy};
use hc_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

const ENV_DAEMON_ADDR: &str = "HC_DAEMON_ADDR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cfg = load_config()?;
    let shared = Arc::new(state::AppState::from_config(&cfg)?);
    info!(
        config_hash = %shared.config_hash,
        holidays = shared.calendar.holidays().len(),
        timezone = shared.timezone.name(),
        "calendar loaded"
    );

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env()
        .or(cfg.daemon_addr)
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));
    info!("hc-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn load_config() -> anyhow::Result<AppConfig> {
    let paths = std::env::var(hc_config::ENV_CONFIG_PATHS)
        .map(|raw| hc_config::split_path_list(&raw))
        .unwrap_or_default();
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let cfg = AppConfig::load(&path_refs)
        .with_context(|| format!("config load failed ({}={:?})", hc_config::ENV_CONFIG_PATHS, paths))?;

    let report = report_unused_keys(
        ConfigConsumer::Daemon,
        &cfg.loaded.config_json,
        UnusedKeyPolicy::Warn,
    )?;
    if !report.is_clean() {
        warn!(unused = ?report.unused_leaf_pointers, "config has keys the daemon ignores");
    }
    Ok(cfg)
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var(ENV_DAEMON_ADDR).ok()?.parse().ok()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
