// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A guarded route was hit without a valid session. Becomes a redirect
    /// to /login rather than a hard error.
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Email not available or not verified by the identity provider")]
    UnverifiedIdentity,

    #[error("User already exists: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Non-success response from Google or TrueLayer. Propagated, not retried.
    #[error("{service} error: {detail}")]
    ExternalCall { service: &'static str, detail: String },

    /// A provider response was missing fields we require.
    #[error("{service} returned an unexpected response shape: {detail}")]
    ExternalSchema { service: &'static str, detail: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotAuthenticated => {
                return Redirect::temporary("/login").into_response();
            }
            AppError::UnverifiedIdentity => {
                (StatusCode::BAD_REQUEST, "unverified_identity", None)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::ExternalCall { service, detail } => {
                tracing::warn!(service, detail = %detail, "External call failed");
                (StatusCode::BAD_GATEWAY, "external_error", Some(detail.clone()))
            }
            AppError::ExternalSchema { service, detail } => {
                tracing::warn!(service, detail = %detail, "External response failed validation");
                (StatusCode::BAD_GATEWAY, "external_schema_error", Some(detail.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
