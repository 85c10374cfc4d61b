//! Core provider and session traits for social identity adapters.
//!
//! A host application keeps a set of named [`Provider`]s. Each login attempt
//! starts with [`Provider::begin_auth`], which yields a [`Session`] holding the
//! authorization URL. The session is persisted across the redirect with
//! [`Session::marshal`] / [`Provider::unmarshal_session`], completed with
//! [`Session::authorize`], and finally consumed by [`Provider::fetch_user`].

mod error;
mod types;

pub use error::{ErrorKind, IdentityError, IdentityResult};
pub use types::{Params, Token, User};

use async_trait::async_trait;

/// An identity platform the host can authenticate users against.
#[async_trait]
pub trait Provider: Send + Sync + Sized {
    type Session: Session<Provider = Self>;

    /// Name used to look this provider up later.
    fn name(&self) -> &str;

    /// Rename the provider, for hosts running several instances of one type.
    fn set_name(&mut self, name: String);

    /// Start a login flow. `state` is echoed back by the platform on redirect.
    async fn begin_auth(&self, state: &str) -> IdentityResult<Self::Session>;

    /// Restore a session previously produced by [`Session::marshal`].
    fn unmarshal_session(&self, data: &str) -> IdentityResult<Self::Session>;

    /// Fetch the profile of the user behind an authorized session.
    async fn fetch_user(&self, session: &Self::Session) -> IdentityResult<User>;

    async fn refresh_token(&self, refresh_token: &str) -> IdentityResult<Token>;

    fn refresh_token_available(&self) -> bool;
}

/// State of one login attempt.
#[async_trait]
pub trait Session: Send + Sync + Sized {
    type Provider: Provider<Session = Self>;

    /// URL the user agent must be sent to.
    fn get_auth_url(&self) -> IdentityResult<String>;

    /// Exchange the callback's authorization code for an access token.
    async fn authorize(
        &mut self,
        provider: &Self::Provider,
        params: &dyn Params,
    ) -> IdentityResult<String>;

    fn marshal(&self) -> String;
}
