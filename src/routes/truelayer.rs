// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TrueLayer consent routes.
//!
//! The callback always redirects home; the `truelayer` query parameter on
//! the redirect tells the frontend how the flow ended instead of silently
//! discarding failures.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::auth::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/truelayer_signin", get(signin))
        .route(
            "/truelayer_callback",
            get(callback_query).post(callback_form),
        )
}

/// Redirect the logged-in user to the TrueLayer consent screen.
async fn signin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Redirect {
    tracing::info!(user_id = %user.user_id, "Starting TrueLayer authorization");
    Redirect::temporary(&state.truelayer.authorization_url())
}

/// TrueLayer sends the code as a form post (response_mode=form_post), but a
/// query-parameter GET is accepted too.
#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

async fn callback_query(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    complete_authorization(&state, &user, params.code).await
}

async fn callback_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Form(params): Form<CallbackParams>,
) -> Redirect {
    complete_authorization(&state, &user, params.code).await
}

/// Exchange the code, fetch all transactions, cache them on the user row.
///
/// Every outcome ends in a redirect home; stored transactions are only
/// touched on full success.
async fn complete_authorization(
    state: &Arc<AppState>,
    user: &AuthUser,
    code: Option<String>,
) -> Redirect {
    let Some(code) = code else {
        tracing::warn!(user_id = %user.user_id, "TrueLayer callback without a code");
        return redirect_home("missing_code");
    };

    let access_token = match state.truelayer.exchange_code(&code).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            tracing::warn!(user_id = %user.user_id, "TrueLayer token exchange returned no token");
            return redirect_home("missing_token");
        }
        Err(err) => {
            tracing::error!(user_id = %user.user_id, error = %err, "TrueLayer token exchange failed");
            return redirect_home("error");
        }
    };

    let transactions = match state.truelayer.fetch_all_transactions(&access_token).await {
        Ok(transactions) => transactions,
        Err(err) => {
            tracing::error!(user_id = %user.user_id, error = %err, "TrueLayer fetch failed");
            return redirect_home("error");
        }
    };

    if let Err(err) = state.store.set_transactions(&user.user_id, &transactions) {
        tracing::error!(user_id = %user.user_id, error = %err, "Failed to store transactions");
        return redirect_home("error");
    }

    tracing::info!(
        user_id = %user.user_id,
        count = transactions.len(),
        "TrueLayer transactions cached"
    );

    redirect_home("connected")
}

fn redirect_home(status: &str) -> Redirect {
    Redirect::to(&format!("/?truelayer={status}"))
}
