//! Instagram endpoint and credential configuration.

use ras_identity_core::{IdentityError, IdentityResult};
use serde::{Deserialize, Serialize};
use url::Url;

pub const AUTHORIZATION_ENDPOINT: &str = "https://api.instagram.com/oauth/authorize";
pub const TOKEN_ENDPOINT: &str = "https://api.instagram.com/oauth/access_token";
pub const PROFILE_ENDPOINT: &str = "https://graph.instagram.com/me";

/// Remote endpoints the adapter talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramEndpoints {
    pub authorization: String,
    pub token: String,
    pub profile: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            authorization: AUTHORIZATION_ENDPOINT.to_string(),
            token: TOKEN_ENDPOINT.to_string(),
            profile: PROFILE_ENDPOINT.to_string(),
        }
    }
}

impl InstagramEndpoints {
    /// Same paths as the real platform, rooted at `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            authorization: format!("{}/oauth/authorize", base_url),
            token: format!("{}/oauth/access_token", base_url),
            profile: format!("{}/me", base_url),
        }
    }

    /// Every endpoint must parse as an absolute URL
    pub fn validate(&self) -> IdentityResult<()> {
        for (name, endpoint) in [
            ("authorization", &self.authorization),
            ("token", &self.token),
            ("profile", &self.profile),
        ] {
            Url::parse(endpoint).map_err(|e| {
                IdentityError::Config(format!("invalid {} endpoint {}: {}", name, endpoint, e))
            })?;
        }
        Ok(())
    }
}

/// Credentials and options for an [`crate::InstagramProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub client_key: String,
    pub client_secret: String,
    pub callback_url: String,
    /// Requested scopes; empty means the provider default
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub endpoints: InstagramEndpoints,
}

impl InstagramConfig {
    /// Read `INSTAGRAM_KEY`, `INSTAGRAM_SECRET`, `INSTAGRAM_CALLBACK_URL` and the
    /// optional comma separated `INSTAGRAM_SCOPES`.
    pub fn from_env() -> IdentityResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> IdentityResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| IdentityError::Config(format!("{} is not set", key)))
        };

        let scopes = lookup("INSTAGRAM_SCOPES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|scope| !scope.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            client_key: required("INSTAGRAM_KEY")?,
            client_secret: required("INSTAGRAM_SECRET")?,
            callback_url: required("INSTAGRAM_CALLBACK_URL")?,
            scopes,
            endpoints: InstagramEndpoints::default(),
        })
    }
}
