//! User model for storage and API.

use crate::models::Transaction;
use serde::{Deserialize, Serialize};

/// User row as stored in SQLite. In-memory values are transient views
/// constructed per request; the store owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Google subject ID (also the primary key)
    pub id: String,
    /// Display name, fixed at first login
    pub name: String,
    /// Email address, fixed at first login
    pub email: String,
    /// Cached bank transactions (None until the first TrueLayer fetch)
    pub transactions: Option<Vec<Transaction>>,
}

impl User {
    /// True once a TrueLayer fetch has stored a non-empty transaction list.
    pub fn has_data(&self) -> bool {
        self.transactions
            .as_ref()
            .is_some_and(|transactions| !transactions.is_empty())
    }
}
