// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - external provider clients and export formatting.

pub mod csv_export;
pub mod google;
pub mod truelayer;

pub use google::{GoogleOidc, VerifiedIdentity};
pub use truelayer::TrueLayerClient;
