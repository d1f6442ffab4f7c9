// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV export of cached transactions.
//!
//! The file is written into memory and then handed to the response as a
//! finite, single-pass stream of fixed-size chunks.

use crate::error::{AppError, Result};
use crate::models::Transaction;
use anyhow::anyhow;
use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::Response;
use futures_util::stream;
use std::convert::Infallible;

const COLUMNS: [&str; 4] = ["timestamp", "description", "transaction_category", "amount"];
const CHUNK_SIZE: usize = 8192;

/// Serialize transactions: one header row, then one row per transaction in
/// stored order. The CSV carries the top-level `amount`, not the running
/// balance the graph uses.
pub fn to_csv_bytes(transactions: &[Transaction]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|e| AppError::Internal(anyhow!("CSV write failed: {e}")))?;

    for transaction in transactions {
        let amount = transaction.amount.to_string();
        writer
            .write_record([
                transaction.timestamp.as_str(),
                transaction.description.as_str(),
                transaction.transaction_category.as_str(),
                amount.as_str(),
            ])
            .map_err(|e| AppError::Internal(anyhow!("CSV write failed: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow!("CSV flush failed: {e}")))
}

/// Split a finished buffer into fixed-size chunks for streaming.
fn into_chunks(bytes: Vec<u8>) -> Vec<Bytes> {
    bytes
        .chunks(CHUNK_SIZE)
        .map(Bytes::copy_from_slice)
        .collect()
}

/// Build the `transactions.csv` attachment response.
pub fn csv_response(transactions: &[Transaction]) -> Result<Response> {
    let chunks = into_chunks(to_csv_bytes(transactions)?);
    let body = Body::from_stream(stream::iter(
        chunks.into_iter().map(Ok::<_, Infallible>),
    ));

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"transactions.csv\"",
        )
        .body(body)
        .map_err(|e| AppError::Internal(anyhow!("failed to build CSV response: {e}")))
}
