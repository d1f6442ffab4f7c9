// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transaction API routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{format_for_graph, GraphPoint};
use crate::sample_data;
use crate::services::csv_export;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Guarded routes. The session middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/transactions", get(get_transactions))
}

/// Public routes: sample data for frontend development, no session needed.
pub fn test_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/transactions/test", get(get_test_transactions))
}

/// Graph envelope returned to the frontend. The `transactions` key is
/// omitted entirely when there is no cached data.
#[derive(Serialize)]
pub struct TransactionsResponse {
    pub user_has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<GraphPoint>>,
}

#[derive(Deserialize)]
struct TransactionsQuery {
    /// `csv` selects the file download; anything else means graph JSON.
    format: Option<String>,
}

/// Serve the logged-in user's cached transactions.
async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response> {
    // A session that no longer resolves to a row is served as "no data",
    // same as a user who never connected TrueLayer.
    let transactions = state
        .store
        .get(&user.user_id)?
        .and_then(|row| row.transactions)
        .filter(|transactions| !transactions.is_empty());

    let Some(transactions) = transactions else {
        return Ok(Json(TransactionsResponse {
            user_has_data: false,
            transactions: None,
        })
        .into_response());
    };

    if query.format.as_deref() == Some("csv") {
        return csv_export::csv_response(&transactions);
    }

    Ok(Json(TransactionsResponse {
        user_has_data: true,
        transactions: Some(format_for_graph(&transactions)),
    })
    .into_response())
}

/// Serve the bundled sample data through the same graph formatting.
async fn get_test_transactions() -> Result<Json<TransactionsResponse>> {
    let sample = sample_data::transactions()?;

    Ok(Json(TransactionsResponse {
        user_has_data: true,
        transactions: Some(format_for_graph(&sample)),
    }))
}
