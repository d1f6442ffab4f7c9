// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod transaction;
pub mod user;

pub use transaction::{format_for_graph, GraphPoint, RunningBalance, Transaction};
pub use user::User;
