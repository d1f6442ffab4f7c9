// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bundled sample transactions.
//!
//! Used by debug-mode /login (which never contacts Google or TrueLayer)
//! and by the unauthenticated /api/transactions/test endpoint, so the
//! frontend can be developed without live provider credentials.

use crate::error::Result;
use crate::models::Transaction;
use anyhow::anyhow;

pub const TEST_USER_ID: &str = "1";
pub const TEST_USER_NAME: &str = "test";
pub const TEST_USER_EMAIL: &str = "test.test@test.com";

const SAMPLE_JSON: &str = include_str!("../data/sample_transactions.json");

/// Parse the bundled sample data.
pub fn transactions() -> Result<Vec<Transaction>> {
    serde_json::from_str(SAMPLE_JSON)
        .map_err(|e| anyhow!("bundled sample data is invalid: {e}").into())
}
