// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gotogym API Server
//!
//! Serves workouts and exercises behind rate limiting, bearer-token
//! authentication and permission checks.

use gotogym::{config::Config, db::seed, db::Db, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, env = %config.env, "Starting Gotogym API");

    // Open and migrate the database
    let db = Db::connect(&config.database_url, config.db_query_timeout).await?;
    db.migrate().await?;

    if config.seed_demo_data {
        seed::populate_if_empty(&db).await?;
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));
    state.rate_limiter.start();
    tracing::info!(
        enabled = config.limiter.enabled,
        rps = config.limiter.rps,
        burst = config.limiter.burst,
        "Rate limiter configured"
    );

    // Build router
    let app = gotogym::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.rate_limiter.stop().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gotogym=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
