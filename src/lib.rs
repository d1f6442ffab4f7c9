// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Spending-Tracker: graph your bank transactions
//!
//! This crate provides the backend API: Google sign-in, TrueLayer data
//! sharing consent, and a per-user cache of fetched bank transactions
//! served as graph JSON or as CSV.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sample_data;
pub mod services;

use config::Config;
use db::UserStore;
use services::{GoogleOidc, TrueLayerClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: UserStore,
    pub google: GoogleOidc,
    pub truelayer: TrueLayerClient,
}
