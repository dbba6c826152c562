//! Cookie-carried sessions.
//!
//! A session is a signed HS256 token holding the user id. The cookie itself is
//! the backing store: nothing is kept server side, and the token's `exp` claim
//! is the only lifetime policy.

use crate::config::Config;
use crate::database::models::User;
use crate::errors::SessionError;
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE_NAME: &str = "apiserver_session";

/// Data carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: i64,
}

/// Issues and resolves the session attached to a request.
pub trait SessionManager: Send + Sync {
    /// Starts a session for `user`, writing the cookie into `headers`.
    fn issue_session(&self, headers: &mut HeaderMap, user: &User) -> Result<(), SessionError>;

    /// Reads the session carried by the request.
    ///
    /// Returns `SessionError::Unauthenticated` when the cookie is absent,
    /// malformed, forged or expired.
    fn resolve_session(&self, headers: &HeaderMap) -> Result<SessionData, SessionError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    user_id: i64,
    /// Token expiration timestamp
    exp: usize,
    /// Token issued at timestamp
    iat: usize,
}

/// `SessionManager` storing the session in a signed cookie.
pub struct CookieSessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age_seconds: u64,
}

impl CookieSessionManager {
    pub fn new(secret: &[u8], max_age_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            max_age_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_key.as_bytes(), config.session_max_age_seconds)
    }

    fn encode_token(&self, user_id: i64) -> Result<String, SessionError> {
        let now = Utc::now();
        let exp = i64::try_from(self.max_age_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|max_age| now.checked_add_signed(max_age))
            .ok_or_else(|| SessionError::store("session max age out of range"))?;

        let claims = SessionClaims {
            user_id,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::store(format!("session encoding failed: {}", e)))
    }
}

impl SessionManager for CookieSessionManager {
    fn issue_session(&self, headers: &mut HeaderMap, user: &User) -> Result<(), SessionError> {
        let token = self.encode_token(user.id)?;
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE_NAME, token, self.max_age_seconds
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| SessionError::store(format!("invalid session cookie: {}", e)))?;

        headers.append(SET_COOKIE, value);
        Ok(())
    }

    fn resolve_session(&self, headers: &HeaderMap) -> Result<SessionData, SessionError> {
        let token = extract_session_token(headers).ok_or(SessionError::Unauthenticated)?;

        decode::<SessionClaims>(&token, &self.decoding_key, &self.validation)
            .map(|data| SessionData {
                user_id: data.claims.user_id,
            })
            .map_err(|e| {
                tracing::debug!("Rejected session token: {}", e);
                SessionError::Unauthenticated
            })
    }
}

/// Finds the session cookie among the request's `Cookie` headers.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CookieSessionManager {
        CookieSessionManager::new(b"test-session-key", 3600)
    }

    fn user(id: i64) -> User {
        User {
            id,
            ..User::with_telegram(id)
        }
    }

    /// Turns the `Set-Cookie` written by `issue_session` into a request header.
    fn cookie_request(response: &HeaderMap) -> HeaderMap {
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[test]
    fn test_issue_then_resolve() {
        let manager = manager();
        let mut response = HeaderMap::new();
        manager.issue_session(&mut response, &user(7)).unwrap();

        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("apiserver_session="));
        assert!(set_cookie.contains("HttpOnly"));

        let session = manager.resolve_session(&cookie_request(&response)).unwrap();
        assert_eq!(session, SessionData { user_id: 7 });
    }

    #[test]
    fn test_resolve_among_other_cookies() {
        let manager = manager();
        let mut response = HeaderMap::new();
        manager.issue_session(&mut response, &user(3)).unwrap();
        let pair = cookie_request(&response)
            .get(COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}; lang=en", pair)).unwrap(),
        );
        assert_eq!(manager.resolve_session(&headers).unwrap().user_id, 3);
    }

    #[test]
    fn test_missing_or_malformed_cookie_is_unauthenticated() {
        let manager = manager();
        assert!(matches!(
            manager.resolve_session(&HeaderMap::new()),
            Err(SessionError::Unauthenticated)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("apiserver_session=garbage"));
        assert!(matches!(
            manager.resolve_session(&headers),
            Err(SessionError::Unauthenticated)
        ));

        headers.insert(COOKIE, HeaderValue::from_static("apiserver_session="));
        assert!(matches!(
            manager.resolve_session(&headers),
            Err(SessionError::Unauthenticated)
        ));
    }

    #[test]
    fn test_token_signed_with_other_key_is_rejected() {
        let mut response = HeaderMap::new();
        CookieSessionManager::new(b"another-key", 3600)
            .issue_session(&mut response, &user(1))
            .unwrap();

        assert!(matches!(
            manager().resolve_session(&cookie_request(&response)),
            Err(SessionError::Unauthenticated)
        ));
    }

    #[test]
    fn test_oversized_max_age_fails_without_panicking() {
        let manager = CookieSessionManager::new(b"test-session-key", u64::MAX);
        let mut response = HeaderMap::new();
        let err = manager.issue_session(&mut response, &user(7)).unwrap_err();

        assert!(matches!(err, SessionError::Store { .. }));
        assert!(response.get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = manager();
        let issued = Utc::now() - Duration::hours(2);
        let claims = SessionClaims {
            user_id: 1,
            exp: (issued + Duration::hours(1)).timestamp() as usize,
            iat: issued.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &manager.encoding_key).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE_NAME, token)).unwrap(),
        );
        assert!(matches!(
            manager.resolve_session(&headers),
            Err(SessionError::Unauthenticated)
        ));
    }
}
