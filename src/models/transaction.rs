// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank transaction shapes as returned by TrueLayer, plus the graph
//! projection served to the frontend.

use serde::{Deserialize, Serialize};

/// A single bank transaction. Immutable and externally sourced; the whole
/// list is replaced on every fetch, entries are never addressed one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// ISO-8601 timestamp string, passed through untouched
    pub timestamp: String,
    pub description: String,
    pub transaction_category: String,
    /// Transaction amount (used by the CSV export)
    pub amount: f64,
    /// Balance immediately after this transaction (used by the graph)
    #[serde(default)]
    pub running_balance: RunningBalance,
}

/// Nested running-balance record from the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningBalance {
    pub amount: f64,
}

/// One point of the running-balance time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub timestamp: String,
    pub amount: f64,
}

/// Project transactions onto the running-balance series, preserving order.
///
/// The graph plots `running_balance.amount`, not the per-transaction
/// `amount` the CSV export uses.
pub fn format_for_graph(transactions: &[Transaction]) -> Vec<GraphPoint> {
    transactions
        .iter()
        .map(|transaction| GraphPoint {
            timestamp: transaction.timestamp.clone(),
            amount: transaction.running_balance.amount,
        })
        .collect()
}
