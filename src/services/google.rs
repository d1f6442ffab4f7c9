// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OIDC client for the identity login flow.
//!
//! The OpenID discovery document is fetched once at startup; the resolved
//! endpoints are read-only for the process lifetime. The flow itself is the
//! plain confidential-client authorization-code grant: build the redirect,
//! exchange the callback code, read the userinfo claims.

use crate::config::Config;
use crate::error::{AppError, Result};
use anyhow::Context;
use serde::Deserialize;

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const SCOPE: &str = "openid email profile";

/// Google OIDC client with endpoints resolved at startup.
#[derive(Clone)]
pub struct GoogleOidc {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorization_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

/// Identity established by a completed login flow.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub name: String,
    pub email: String,
}

impl GoogleOidc {
    /// Fetch the discovery document and build the client.
    pub async fn discover(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("failed building Google HTTP client")?;

        let response = http.get(DISCOVERY_URL).send().await.map_err(|e| {
            AppError::ExternalCall {
                service: "google",
                detail: format!("OIDC discovery request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalCall {
                service: "google",
                detail: format!("OIDC discovery returned status {}", response.status()),
            });
        }

        let discovery: DiscoveryDocument =
            response.json().await.map_err(|e| AppError::ExternalSchema {
                service: "google",
                detail: format!("invalid discovery document: {e}"),
            })?;

        tracing::info!(
            authorization_endpoint = %discovery.authorization_endpoint,
            "Google OIDC endpoints resolved"
        );

        Ok(Self::from_endpoints(config, http, discovery))
    }

    /// Build a client against known endpoints. Used by tests; `discover` is
    /// the production path.
    pub fn with_endpoints(
        config: &Config,
        authorization_endpoint: &str,
        token_endpoint: &str,
        userinfo_endpoint: &str,
    ) -> Self {
        let http = reqwest::Client::new();
        Self::from_endpoints(
            config,
            http,
            DiscoveryDocument {
                authorization_endpoint: authorization_endpoint.to_string(),
                token_endpoint: token_endpoint.to_string(),
                userinfo_endpoint: userinfo_endpoint.to_string(),
            },
        )
    }

    fn from_endpoints(config: &Config, http: reqwest::Client, doc: DiscoveryDocument) -> Self {
        Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: format!("{}/google_callback", config.app_url.trim_end_matches('/')),
            authorization_endpoint: doc.authorization_endpoint,
            token_endpoint: doc.token_endpoint,
            userinfo_endpoint: doc.userinfo_endpoint,
        }
    }

    /// Build the login redirect target. Pure URL construction, no network.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.authorization_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPE),
        )
    }

    /// Complete the login: exchange the callback code, fetch the userinfo
    /// claims, and require a verified email.
    pub async fn resolve_identity(&self, code: &str) -> Result<VerifiedIdentity> {
        let access_token = self.exchange_code(code).await?;
        let claims = self.fetch_userinfo(&access_token).await?;
        identity_from_claims(claims)
    }

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalCall {
                service: "google",
                detail: format!("token request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::ExternalCall {
                service: "google",
                detail: format!("token exchange returned status {status}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| AppError::ExternalSchema {
            service: "google",
            detail: format!("invalid token response: {e}"),
        })?;

        Ok(token.access_token)
    }

    /// Fetch userinfo claims with the granted access token.
    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfoClaims> {
        let response = self
            .http
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalCall {
                service: "google",
                detail: format!("userinfo request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalCall {
                service: "google",
                detail: format!("userinfo returned status {}", response.status()),
            });
        }

        response.json().await.map_err(|e| AppError::ExternalSchema {
            service: "google",
            detail: format!("invalid userinfo response: {e}"),
        })
    }
}

/// Derive the stored identity from userinfo claims.
///
/// An unverified or missing email rejects the login outright.
fn identity_from_claims(claims: UserInfoClaims) -> Result<VerifiedIdentity> {
    if claims.email_verified != Some(true) {
        return Err(AppError::UnverifiedIdentity);
    }

    let email = claims.email.ok_or(AppError::UnverifiedIdentity)?;
    let name = claims.given_name.ok_or_else(|| AppError::ExternalSchema {
        service: "google",
        detail: "userinfo is missing given_name".to_string(),
    })?;

    Ok(VerifiedIdentity {
        subject: claims.sub,
        name,
        email,
    })
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    authorization_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    given_name: Option<String>,
}
