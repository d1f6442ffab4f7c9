// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie authentication middleware.
//!
//! Login stores a signed JWT in an HttpOnly cookie; this middleware turns
//! that cookie back into an [AuthUser] request extension. Anonymous callers
//! of guarded routes are redirected to /login, never given a server error.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "st_session";

/// Session lifetime; the JWT exp claim is what enforces expiry.
const SESSION_LIFETIME_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Google subject ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires an authenticated session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session_user_id(&jar, &state.config.session_signing_key)
        .ok_or(AppError::NotAuthenticated)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Resolve the session cookie to a user ID, if the JWT is present and valid.
pub fn session_user_id(jar: &CookieJar, signing_key: &[u8]) -> Option<String> {
    let token = jar.get(SESSION_COOKIE)?.value();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
}

/// Create a session JWT bound to a user ID.
pub fn create_session_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_LIFETIME_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Build the session cookie for a freshly issued JWT.
pub fn session_cookie(jwt: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, jwt))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie removal for logout. Attributes must match [session_cookie] for
/// browsers to drop the original.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_session_key_32_bytes_min!!!";

    #[test]
    fn test_jwt_round_trip() {
        let jwt = create_session_jwt("sub-123", KEY).unwrap();

        let jar = CookieJar::new().add(session_cookie(jwt));
        assert_eq!(session_user_id(&jar, KEY), Some("sub-123".to_string()));
    }

    #[test]
    fn test_wrong_key_is_anonymous() {
        let jwt = create_session_jwt("sub-123", KEY).unwrap();

        let jar = CookieJar::new().add(session_cookie(jwt));
        assert_eq!(session_user_id(&jar, b"a_different_signing_key_entirely"), None);
    }

    #[test]
    fn test_missing_cookie_is_anonymous() {
        let jar = CookieJar::new();
        assert_eq!(session_user_id(&jar, KEY), None);
    }

    #[test]
    fn test_garbage_token_is_anonymous() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not.a.jwt"));
        assert_eq!(session_user_id(&jar, KEY), None);
    }
}
