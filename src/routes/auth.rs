// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google login routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, removal_cookie, session_cookie, session_user_id};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/google_callback", get(google_callback))
        .route("/logout", get(logout))
}

/// Start the login flow.
///
/// In debug configuration this seeds the fixed test user with the bundled
/// sample data and logs them in without contacting Google.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    if state.config.debug {
        let user = state.store.seed_sample_user()?;
        tracing::info!(user_id = %user.id, "Debug login with sample user");

        let jwt = create_session_jwt(&user.id, &state.config.session_signing_key)?;
        return Ok((jar.add(session_cookie(jwt)), Redirect::to("/")));
    }

    // Already logged in: nothing to do.
    if session_user_id(&jar, &state.config.session_signing_key).is_some() {
        return Ok((jar, Redirect::to("/")));
    }

    Ok((jar, Redirect::temporary(&state.google.authorization_url())))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

/// Google OAuth callback: exchange the code, establish the session.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("missing code parameter".to_string()))?;

    let identity = state.google.resolve_identity(&code).await?;

    let user = state
        .store
        .get_or_create(&identity.subject, &identity.name, &identity.email)?;

    tracing::info!(user_id = %user.id, "Login completed");

    let jwt = create_session_jwt(&user.id, &state.config.session_signing_key)?;

    Ok((jar.add(session_cookie(jwt)), Redirect::to("/")))
}

/// Clear the session. Idempotent and public.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal_cookie()), Redirect::to("/"))
}
