//! Instagram login session.

use crate::provider::InstagramProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ras_identity_core::{IdentityError, IdentityResult, Params, Session, Token};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Seconds from the Unix epoch back to 0001-01-01T00:00:00Z
const ZERO_TIME_SECONDS: i64 = -62_135_596_800;

fn zero_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ZERO_TIME_SECONDS, 0).unwrap_or_default()
}

/// State of one Instagram login attempt.
///
/// Persisted by the host between the redirect and the callback, so only the
/// public fields are serialized. Instagram hands out no refresh tokens, so
/// `refresh_token` stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredSession", into = "StoredSession")]
pub struct InstagramSession {
    pub auth_url: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    token: Option<Token>,
}

/// Persisted form of [`InstagramSession`]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct StoredSession {
    #[serde(rename = "AuthURL")]
    auth_url: String,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Default for StoredSession {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: zero_time(),
        }
    }
}

impl From<StoredSession> for InstagramSession {
    fn from(stored: StoredSession) -> Self {
        let mut session = Self {
            auth_url: stored.auth_url,
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            expires_at: stored.expires_at,
            token: None,
        };
        // The token type is not persisted; everything else is rebuilt
        if session.is_authorized() {
            session.token = Some(Token {
                access_token: session.access_token.clone(),
                token_type: String::new(),
                refresh_token: session.refresh_token.clone(),
                expiry: session.expiry(),
            });
        }
        session
    }
}

impl From<InstagramSession> for StoredSession {
    fn from(session: InstagramSession) -> Self {
        Self {
            auth_url: session.auth_url,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
        }
    }
}

/// Sessions compare by their persisted fields only.
impl PartialEq for InstagramSession {
    fn eq(&self, other: &Self) -> bool {
        self.auth_url == other.auth_url
            && self.access_token == other.access_token
            && self.refresh_token == other.refresh_token
            && self.expires_at == other.expires_at
    }
}

impl Default for InstagramSession {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: zero_time(),
            token: None,
        }
    }
}

impl InstagramSession {
    pub fn new(auth_url: String) -> Self {
        Self {
            auth_url,
            ..Default::default()
        }
    }

    /// Restore a session from the output of [`Session::marshal`]
    pub fn from_json(data: &str) -> IdentityResult<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Token obtained by the last successful [`Session::authorize`]
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn is_authorized(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Access token expiry, if the platform reported one
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        (self.expires_at != zero_time()).then_some(self.expires_at)
    }
}

#[async_trait]
impl Session for InstagramSession {
    type Provider = InstagramProvider;

    fn get_auth_url(&self) -> IdentityResult<String> {
        if self.auth_url.is_empty() {
            return Err(IdentityError::NotInitialized);
        }
        Ok(self.auth_url.clone())
    }

    async fn authorize(
        &mut self,
        provider: &InstagramProvider,
        params: &dyn Params,
    ) -> IdentityResult<String> {
        if self.is_authorized() {
            debug!("Session already authorized, skipping code exchange");
            return Ok(self.access_token.clone());
        }

        let code = params
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or(IdentityError::MissingAuthorizationCode)?;

        let token = provider.exchange_code(code).await?;

        if !token.is_valid() {
            return Err(IdentityError::InvalidToken(
                "token endpoint returned an empty or expired access token".to_string(),
            ));
        }

        self.access_token = token.access_token.clone();
        if let Some(expiry) = token.expiry {
            self.expires_at = expiry;
        }
        self.token = Some(token);

        Ok(self.access_token.clone())
    }

    fn marshal(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for InstagramSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marshal())
    }
}
