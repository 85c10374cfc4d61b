//! Instagram identity provider.

use crate::config::{InstagramConfig, InstagramEndpoints};
use crate::session::InstagramSession;
use crate::types::{ProfileResponse, TokenResponse};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use ras_identity_core::{IdentityError, IdentityResult, Provider, Token, User};
use reqwest::{Client, StatusCode};
use std::fmt;
use tracing::{debug, error, info};
use url::form_urlencoded::Serializer;

pub const DEFAULT_PROVIDER_NAME: &str = "instagram";

/// Scope requested when the caller does not ask for any
pub const DEFAULT_SCOPE: &str = "basic";

const PROFILE_FIELDS: &str = "id,username";

/// Instagram implementation of [`Provider`]
#[derive(Clone)]
pub struct InstagramProvider {
    client_key: String,
    secret: String,
    callback_url: String,
    scopes: Vec<String>,
    endpoints: InstagramEndpoints,
    http_client: Client,
    provider_name: String,
}

impl fmt::Debug for InstagramProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstagramProvider")
            .field("client_key", &self.client_key)
            .field("callback_url", &self.callback_url)
            .field("scopes", &self.scopes)
            .field("endpoints", &self.endpoints)
            .field("provider_name", &self.provider_name)
            .finish_non_exhaustive()
    }
}

impl InstagramProvider {
    /// Create a provider talking to the real Instagram endpoints.
    ///
    /// An empty `scopes` slice falls back to [`DEFAULT_SCOPE`].
    pub fn new(
        client_key: impl Into<String>,
        secret: impl Into<String>,
        callback_url: impl Into<String>,
        scopes: &[&str],
    ) -> Self {
        Self::build(
            client_key.into(),
            secret.into(),
            callback_url.into(),
            scopes.iter().map(|s| s.to_string()).collect(),
            InstagramEndpoints::default(),
        )
    }

    /// Create a provider from loaded configuration, rejecting endpoints that
    /// are not absolute URLs.
    pub fn from_config(config: InstagramConfig) -> IdentityResult<Self> {
        config.endpoints.validate()?;
        Ok(Self::build(
            config.client_key,
            config.client_secret,
            config.callback_url,
            config.scopes,
            config.endpoints,
        ))
    }

    fn build(
        client_key: String,
        secret: String,
        callback_url: String,
        scopes: Vec<String>,
        endpoints: InstagramEndpoints,
    ) -> Self {
        let scopes = if scopes.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            scopes
        };

        Self {
            client_key,
            secret,
            callback_url,
            scopes,
            endpoints,
            http_client: Client::new(),
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
        }
    }

    /// Point the provider at different endpoints (mock servers, proxies).
    pub fn with_endpoints(mut self, endpoints: InstagramEndpoints) -> IdentityResult<Self> {
        endpoints.validate()?;
        self.endpoints = endpoints;
        Ok(self)
    }

    /// Use a caller supplied HTTP client, e.g. one with timeouts configured.
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn endpoints(&self) -> &InstagramEndpoints {
        &self.endpoints
    }

    #[cfg(test)]
    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// Build the authorization URL for a flow identified by `state`
    pub fn authorization_url(&self, state: &str) -> String {
        let query = Serializer::new(String::new())
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_key)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .finish();

        let separator = if self.endpoints.authorization.contains('?') {
            '&'
        } else {
            '?'
        };

        debug!(
            "Generated authorization URL for provider {}",
            self.provider_name
        );

        format!("{}{}{}", self.endpoints.authorization, separator, query)
    }

    /// Exchange an authorization code for a token
    pub(crate) async fn exchange_code(&self, code: &str) -> IdentityResult<Token> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_key.as_str()),
            ("client_secret", self.secret.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.endpoints.token)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Token exchange failed with {}: {}", status, error_text);
            return Err(IdentityError::ExchangeFailed(format!(
                "{} responded with {}: {}",
                self.provider_name, status, error_text
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::ExchangeFailed(e.to_string()))?;

        let expiry = token_response
            .expires_in
            .filter(|seconds| *seconds > 0)
            .map(|seconds| {
                Duration::try_seconds(seconds)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        IdentityError::ExchangeFailed(format!(
                            "{} returned an out of range expires_in: {}",
                            self.provider_name, seconds
                        ))
                    })
            })
            .transpose()?;

        info!("Successfully exchanged code for tokens");

        Ok(Token {
            access_token: token_response.access_token,
            token_type: token_response.token_type.unwrap_or_default(),
            refresh_token: token_response.refresh_token.unwrap_or_default(),
            expiry,
        })
    }
}

#[async_trait]
impl Provider for InstagramProvider {
    type Session = InstagramSession;

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn set_name(&mut self, name: String) {
        self.provider_name = name;
    }

    async fn begin_auth(&self, state: &str) -> IdentityResult<InstagramSession> {
        Ok(InstagramSession::new(self.authorization_url(state)))
    }

    fn unmarshal_session(&self, data: &str) -> IdentityResult<InstagramSession> {
        InstagramSession::from_json(data)
    }

    async fn fetch_user(&self, session: &InstagramSession) -> IdentityResult<User> {
        let mut user = User {
            access_token: session.access_token.clone(),
            provider: self.provider_name.clone(),
            expires_at: session.expiry(),
            ..Default::default()
        };

        if user.access_token.is_empty() {
            return Err(IdentityError::MissingCredential {
                provider: self.provider_name.clone(),
            });
        }

        let response = self
            .http_client
            .get(&self.endpoints.profile)
            .query(&[("fields", PROFILE_FIELDS)])
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("User info request failed with {}: {}", status, error_text);
            return Err(IdentityError::Http {
                provider: self.provider_name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let raw_data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&body)?;
        let profile: ProfileResponse =
            serde_json::from_value(serde_json::Value::Object(raw_data.clone()))?;

        user.user_id = profile.id;
        user.name = profile.username.clone();
        user.nick_name = profile.username;
        user.raw_data = raw_data;

        info!(
            "Successfully retrieved user info for {} user {}",
            self.provider_name, user.user_id
        );

        Ok(user)
    }

    async fn refresh_token(&self, _refresh_token: &str) -> IdentityResult<Token> {
        Err(IdentityError::Unsupported(format!(
            "refresh token is not provided by {}",
            self.provider_name
        )))
    }

    fn refresh_token_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ras_identity_core::{ErrorKind, Session};
    use std::collections::HashMap;
    use url::Url;

    fn query_params(auth_url: &str) -> HashMap<String, String> {
        Url::parse(auth_url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_new() {
        let provider =
            InstagramProvider::new("client_id", "secret", "http://localhost/callback", &[]);

        assert_eq!(provider.client_key(), "client_id");
        assert_eq!(provider.secret(), "secret");
        assert_eq!(provider.callback_url(), "http://localhost/callback");
        assert_eq!(provider.name(), DEFAULT_PROVIDER_NAME);
        assert_eq!(provider.scopes(), &[DEFAULT_SCOPE.to_string()]);
        assert_eq!(provider.endpoints(), &InstagramEndpoints::default());
    }

    #[test]
    fn test_set_name() {
        let mut provider =
            InstagramProvider::new("client_id", "secret", "http://localhost/callback", &[]);
        provider.set_name("instagram-business".to_string());
        assert_eq!(provider.name(), "instagram-business");
    }

    #[test]
    fn test_debug_hides_secret() {
        let provider =
            InstagramProvider::new("client_id", "s3cr3t", "http://localhost/callback", &[]);
        let debug = format!("{:?}", provider);
        assert!(debug.contains("client_id"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_begin_auth() {
        let provider = InstagramProvider::new("id1", "sec1", "http://cb", &[]);
        let session = provider.begin_auth("xyz").await.unwrap();
        let auth_url = session.get_auth_url().unwrap();

        assert!(auth_url.starts_with("https://api.instagram.com/oauth/authorize?"));
        assert!(auth_url.contains("client_id=id1"));
        assert!(auth_url.contains("state=xyz"));
        assert!(auth_url.contains("scope=basic"));

        let params = query_params(&auth_url);
        assert_eq!(params.get("response_type"), Some(&"code".to_string()));
        assert_eq!(params.get("redirect_uri"), Some(&"http://cb".to_string()));
        assert_eq!(params.get("scope"), Some(&DEFAULT_SCOPE.to_string()));
    }

    #[tokio::test]
    async fn test_begin_auth_with_scopes() {
        let provider = InstagramProvider::new(
            "id1",
            "sec1",
            "http://cb",
            &["user_profile", "user_media"],
        );
        let session = provider.begin_auth("state").await.unwrap();
        let params = query_params(&session.get_auth_url().unwrap());

        assert_eq!(
            params.get("scope"),
            Some(&"user_profile user_media".to_string())
        );
    }

    #[test]
    fn test_with_endpoints_rejects_invalid_url() {
        let err = InstagramProvider::new("id1", "sec1", "http://cb", &[])
            .with_endpoints(InstagramEndpoints {
                authorization: "not a url".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_from_config_rejects_invalid_url() {
        let err = InstagramProvider::from_config(InstagramConfig {
            client_key: "key".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "http://cb".to_string(),
            scopes: vec![],
            endpoints: InstagramEndpoints {
                profile: "/me".to_string(),
                ..Default::default()
            },
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_begin_auth_with_query_in_endpoint() {
        let provider = InstagramProvider::new("id1", "sec1", "http://cb", &[])
            .with_endpoints(InstagramEndpoints {
                authorization: "https://example.com/authorize?display=page".to_string(),
                ..Default::default()
            })
            .unwrap();
        let session = provider.begin_auth("xyz").await.unwrap();
        let params = query_params(&session.get_auth_url().unwrap());

        assert_eq!(params.get("display"), Some(&"page".to_string()));
        assert_eq!(params.get("client_id"), Some(&"id1".to_string()));
        assert_eq!(params.get("state"), Some(&"xyz".to_string()));
    }

    #[test]
    fn test_from_config() {
        let provider = InstagramProvider::from_config(InstagramConfig {
            client_key: "key".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "http://cb".to_string(),
            scopes: vec!["user_profile".to_string()],
            endpoints: InstagramEndpoints::with_base_url("http://localhost:9999"),
        })
        .unwrap();

        assert_eq!(provider.scopes(), &["user_profile".to_string()]);
        assert_eq!(provider.endpoints().profile, "http://localhost:9999/me");
    }

    #[tokio::test]
    async fn test_refresh_token_unsupported() {
        let provider = InstagramProvider::new("id1", "sec1", "http://cb", &[]);
        assert!(!provider.refresh_token_available());

        let err = provider.refresh_token("anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(
            err.to_string(),
            "Unsupported operation: refresh token is not provided by instagram"
        );
    }

    #[tokio::test]
    async fn test_unmarshal_session() {
        let provider = InstagramProvider::new("id1", "sec1", "http://cb", &[]);
        let session = provider
            .unmarshal_session(r#"{"AuthURL":"u","AccessToken":"tok"}"#)
            .unwrap();
        assert_eq!(session.auth_url, "u");
        assert_eq!(session.access_token, "tok");
    }
}
