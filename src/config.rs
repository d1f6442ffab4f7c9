//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and treated as read-only for the
//! process lifetime. TrueLayer sandbox vs production is a deployment-time
//! choice made here, never at request time.

use std::env;
use std::time::Duration;

const SANDBOX_AUTH_URL: &str = "https://auth.truelayer-sandbox.com";
const SANDBOX_API_URL: &str = "https://api.truelayer-sandbox.com";
const PRODUCTION_AUTH_URL: &str = "https://auth.truelayer.com";
const PRODUCTION_API_URL: &str = "https://api.truelayer.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// TrueLayer OAuth client ID (public)
    pub truelayer_client_id: String,
    /// TrueLayer OAuth client secret
    pub truelayer_client_secret: String,
    /// TrueLayer authorization base URL (sandbox or production)
    pub truelayer_auth_url: String,
    /// TrueLayer data API base URL (sandbox or production)
    pub truelayer_api_url: String,
    /// Whether we are pointed at the TrueLayer sandbox
    pub sandbox: bool,
    /// Public base URL of this app, used to build OAuth redirect URIs
    pub app_url: String,
    /// JWT signing key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// SQLite database path
    pub db_path: String,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Debug mode: /login seeds a fixed test user instead of contacting Google
    pub debug: bool,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            google_client_id: "test_google_id".to_string(),
            google_client_secret: "test_google_secret".to_string(),
            truelayer_client_id: "test_truelayer_id".to_string(),
            truelayer_client_secret: "test_truelayer_secret".to_string(),
            truelayer_auth_url: SANDBOX_AUTH_URL.to_string(),
            truelayer_api_url: SANDBOX_API_URL.to_string(),
            sandbox: true,
            app_url: "http://localhost:5000".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            db_path: ":memory:".to_string(),
            http_timeout: Duration::from_secs(10),
            debug: false,
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let sandbox = env_flag("IS_SANDBOX");
        let (truelayer_auth_url, truelayer_api_url) = if sandbox {
            (SANDBOX_AUTH_URL, SANDBOX_API_URL)
        } else {
            (PRODUCTION_AUTH_URL, PRODUCTION_API_URL)
        };

        Ok(Self {
            google_client_id: require("GOOGLE_CLIENT_ID")?,
            google_client_secret: require("GOOGLE_CLIENT_SECRET")?,
            truelayer_client_id: require("TRUELAYER_CLIENT_ID")?,
            truelayer_client_secret: require("TRUELAYER_CLIENT_SECRET")?,
            truelayer_auth_url: truelayer_auth_url.to_string(),
            truelayer_api_url: truelayer_api_url.to_string(),
            sandbox,
            app_url: require("APP_URL")?,
            session_signing_key: require("SESSION_SIGNING_KEY")?.into_bytes(),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "spending_tracker.db".to_string()),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            debug: env_flag("DEBUG"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Interpret an env var as a boolean flag the way the deploy scripts set it.
fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).as_deref(),
        Ok("true") | Ok("True") | Ok("1")
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
