// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use spending_tracker::config::Config;
use spending_tracker::db::UserStore;
use spending_tracker::middleware::auth::{create_session_jwt, SESSION_COOKIE};
use spending_tracker::routes::create_router;
use spending_tracker::services::{GoogleOidc, TrueLayerClient};
use spending_tracker::AppState;
use std::sync::Arc;

/// Create a test app with an in-memory store and fixed OIDC endpoints.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::default())
}

/// Same, with a caller-provided config (e.g. debug mode).
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let store = UserStore::open_in_memory().expect("in-memory store");

    // Endpoints are never contacted by these tests; they only need to be
    // well-formed for URL construction.
    let google = GoogleOidc::with_endpoints(
        &config,
        "https://accounts.google.com/o/oauth2/v2/auth",
        "https://oauth2.googleapis.com/token",
        "https://openidconnect.googleapis.com/v1/userinfo",
    );
    let truelayer = TrueLayerClient::new(&config).expect("truelayer client");

    let state = Arc::new(AppState {
        config,
        store,
        google,
        truelayer,
    });

    (create_router(state.clone()), state)
}

/// Cookie header value for an authenticated session.
#[allow(dead_code)]
pub fn session_cookie_for(state: &Arc<AppState>, user_id: &str) -> String {
    let jwt = create_session_jwt(user_id, &state.config.session_signing_key)
        .expect("session jwt");
    format!("{SESSION_COOKIE}={jwt}")
}
