// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spending-Tracker API Server
//!
//! Signs users in with Google, walks them through TrueLayer consent, and
//! serves their cached bank transactions as graph JSON or CSV.

use spending_tracker::{
    config::Config,
    db::UserStore,
    routes::create_router,
    services::{GoogleOidc, TrueLayerClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        sandbox = config.sandbox,
        debug = config.debug,
        "Starting Spending-Tracker API"
    );

    // Open the SQLite store
    let store = UserStore::open(&config.db_path).expect("Failed to open database");
    tracing::info!(path = %config.db_path, "Database ready");

    // Resolve Google OIDC endpoints once for the process lifetime
    let google = GoogleOidc::discover(&config)
        .await
        .expect("Failed to resolve Google OIDC endpoints");

    let truelayer = TrueLayerClient::new(&config).expect("Failed to build TrueLayer client");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        google,
        truelayer,
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize logging with an env-filter default.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spending_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
