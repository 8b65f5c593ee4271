//! Session tokens and the in-memory session store.
//!
//! A session is an opaque random token mapped to an account email with an
//! expiry. Tokens travel in an `HttpOnly` cookie; nothing about the account
//! is derivable from the token itself.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use carpool_core::{Error, Result};

const TOKEN_BYTES: usize = 32;

/// A live session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session token.
    pub token: String,
    /// Email of the signed-in account.
    pub email: String,
    /// Instant after which the session is no longer honored.
    pub expires_at: DateTime<Utc>,
}

/// In-memory session store keyed by token.
///
/// Expired entries are purged lazily on lookup.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    cookie_name: String,
}

impl SessionStore {
    /// Creates a store issuing sessions with the given lifetime.
    #[must_use]
    pub fn new(ttl_hours: u64, cookie_name: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::hours(i64::try_from(ttl_hours).unwrap_or(i64::MAX)),
            cookie_name: cookie_name.into(),
        }
    }

    /// Returns the configured cookie name.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Creates a new session for the given email and returns it.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn create(&self, email: &str) -> Result<Session> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let session = Session {
            token: token.clone(),
            email: email.to_string(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        sessions.insert(token, session.clone());
        Ok(session)
    }

    /// Resolves a token to the signed-in email.
    ///
    /// Expired sessions are removed and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn authenticate(&self, token: &str) -> Result<Option<String>> {
        let mut sessions = self.sessions.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(Some(session.email.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Destroys a session. Unknown tokens are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn destroy(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        sessions.remove(token);
        Ok(())
    }

    /// Builds the `Set-Cookie` value that installs a session cookie.
    #[must_use]
    pub fn set_cookie_header(&self, session: &Session) -> String {
        let max_age = self.ttl.num_seconds();
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            self.cookie_name, session.token
        )
    }

    /// Builds the `Set-Cookie` value that clears the session cookie.
    #[must_use]
    pub fn clear_cookie_header(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        )
    }

    /// Extracts the session token from request headers, if present.
    #[must_use]
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(COOKIE)?.to_str().ok()?;
        for pair in cookies.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name == self.cookie_name {
                return parts.next().map(|v| v.trim().to_string());
            }
        }
        None
    }
}
