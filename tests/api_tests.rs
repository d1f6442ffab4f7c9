// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transaction API tests over the real router with an in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use spending_tracker::models::{RunningBalance, Transaction};
use tower::ServiceExt;

mod common;

fn transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            timestamp: "2024-02-01T09:00:00Z".to_string(),
            description: "PAYROLL".to_string(),
            transaction_category: "CREDIT".to_string(),
            amount: 1800.0,
            running_balance: RunningBalance { amount: 2100.0 },
        },
        Transaction {
            timestamp: "2024-02-02T13:30:00Z".to_string(),
            description: "SUPERMARKET".to_string(),
            transaction_category: "PURCHASE".to_string(),
            amount: -42.5,
            running_balance: RunningBalance { amount: 2057.5 },
        },
        Transaction {
            timestamp: "2024-02-03T08:10:00Z".to_string(),
            description: "COFFEE".to_string(),
            transaction_category: "PURCHASE".to_string(),
            amount: -3.2,
            running_balance: RunningBalance { amount: 2054.3 },
        },
    ]
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_transactions_json_for_user_with_data() {
    let (app, state) = common::create_test_app();

    state.store.create("sub-1", "Ada", "ada@example.com").unwrap();
    state.store.set_transactions("sub-1", &transactions()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .header(header::COOKIE, common::session_cookie_for(&state, "sub-1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user_has_data"], Value::Bool(true));

    let points = body["transactions"].as_array().unwrap();
    assert_eq!(points.len(), 3);
    // Graph points carry the running balance, not the transaction amount.
    assert_eq!(points[0]["amount"], 2100.0);
    assert_eq!(points[1]["amount"], 2057.5);
    assert_eq!(points[0]["timestamp"], "2024-02-01T09:00:00Z");
}

#[tokio::test]
async fn test_transactions_json_for_user_without_data() {
    let (app, state) = common::create_test_app();

    state.store.create("sub-1", "Ada", "ada@example.com").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .header(header::COOKIE, common::session_cookie_for(&state, "sub-1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user_has_data"], Value::Bool(false));
    // The transactions key is omitted entirely when there is no data.
    assert!(body.get("transactions").is_none());
}

#[tokio::test]
async fn test_transactions_for_session_without_row_is_no_data() {
    // A valid session whose user row was never created must not error.
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .header(header::COOKIE, common::session_cookie_for(&state, "ghost"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_has_data"], Value::Bool(false));
}

#[tokio::test]
async fn test_transactions_csv_download() {
    let (app, state) = common::create_test_app();

    state.store.create("sub-1", "Ada", "ada@example.com").unwrap();
    state.store.set_transactions("sub-1", &transactions()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions?format=csv")
                .header(header::COOKIE, common::session_cookie_for(&state, "sub-1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"transactions.csv\""
    );

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "timestamp,description,transaction_category,amount");
    assert_eq!(lines.len(), transactions().len() + 1);
    // CSV rows use the top-level amount.
    assert_eq!(lines[2], "2024-02-02T13:30:00Z,SUPERMARKET,PURCHASE,-42.5");
}

#[tokio::test]
async fn test_test_endpoint_needs_no_session() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions/test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user_has_data"], Value::Bool(true));

    let points = body["transactions"].as_array().unwrap();
    assert!(!points.is_empty());
    // Same formatting as the real path: timestamp + running-balance amount.
    assert!(points[0].get("timestamp").is_some());
    assert!(points[0].get("amount").is_some());
    assert!(points[0].get("description").is_none());
}
