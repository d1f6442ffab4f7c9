// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TrueLayer client for the account-data consent flow and transaction fetch.
//!
//! Handles:
//! - Authorization redirect URL (response_mode=form_post, time-derived nonce)
//! - Code-for-token exchange, where a missing token is a soft failure
//! - Accounts list, then per-account transactions, flattened in account order

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Transaction;
use anyhow::Context;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

const SCOPE: &str = "accounts balance transactions offline_access";

/// TrueLayer API client. Sandbox vs production is fixed by config.
#[derive(Clone)]
pub struct TrueLayerClient {
    http: reqwest::Client,
    auth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    sandbox: bool,
}

impl TrueLayerClient {
    /// Create a new TrueLayer client from config.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("failed building TrueLayer HTTP client")?;

        Ok(Self {
            http,
            auth_url: config.truelayer_auth_url.clone(),
            api_url: config.truelayer_api_url.clone(),
            client_id: config.truelayer_client_id.clone(),
            client_secret: config.truelayer_client_secret.clone(),
            redirect_uri: format!(
                "{}/truelayer_callback",
                config.app_url.trim_end_matches('/')
            ),
            sandbox: config.sandbox,
        })
    }

    /// Build the consent redirect target.
    ///
    /// TrueLayer posts the code back (form_post) instead of appending it as
    /// a query parameter. The nonce is current unix time; it is not checked
    /// on return — the session cookie is what ties the callback to a user.
    pub fn authorization_url(&self) -> String {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut url = format!(
            "{}/?response_type=code&response_mode=form_post&client_id={}&scope={}&nonce={}&redirect_uri={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(SCOPE),
            nonce,
            urlencoding::encode(&self.redirect_uri),
        );

        if self.sandbox {
            url.push_str("&enable_mock=true");
        }

        url
    }

    /// Exchange the callback code for an access token.
    ///
    /// Returns `Ok(None)` when the provider answers 200 without a token —
    /// the flow then ends with no data rather than an error.
    pub async fn exchange_code(&self, code: &str) -> Result<Option<String>> {
        let response = self
            .http
            .post(format!("{}/connect/token", self.auth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalCall {
                service: "truelayer",
                detail: format!("token request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TrueLayer token exchange failed");
            return Err(AppError::ExternalCall {
                service: "truelayer",
                detail: format!("token exchange returned status {status}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| AppError::ExternalSchema {
            service: "truelayer",
            detail: format!("invalid token response: {e}"),
        })?;

        Ok(token.access_token)
    }

    /// Fetch every account's transactions as one flat list.
    ///
    /// Output order is the accounts-list order, then each account's
    /// provider-returned order. No retries, no cross-account sorting.
    pub async fn fetch_all_transactions(&self, access_token: &str) -> Result<Vec<Transaction>> {
        let accounts: ResultsEnvelope<Account> = self
            .get_json(&format!("{}/data/v1/accounts", self.api_url), access_token)
            .await?;

        let mut transactions = Vec::new();
        for account in &accounts.results {
            let page: ResultsEnvelope<Transaction> = self
                .get_json(
                    &format!(
                        "{}/data/v1/accounts/{}/transactions",
                        self.api_url, account.account_id
                    ),
                    access_token,
                )
                .await?;
            transactions.extend(page.results);
        }

        tracing::info!(
            accounts = accounts.results.len(),
            transactions = transactions.len(),
            "Fetched transactions from TrueLayer"
        );

        Ok(transactions)
    }

    /// Generic bearer-auth GET with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalCall {
                service: "truelayer",
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalCall {
                service: "truelayer",
                detail: format!("HTTP {status}: {body}"),
            });
        }

        response.json().await.map_err(|e| AppError::ExternalSchema {
            service: "truelayer",
            detail: format!("JSON parse error: {e}"),
        })
    }
}

/// Token exchange response. `access_token` may legitimately be absent.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Account record from the accounts endpoint; only the ID is needed.
#[derive(Debug, Deserialize)]
struct Account {
    account_id: String,
}

/// Envelope shape shared by the accounts and transactions endpoints.
#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    results: Vec<T>,
}
