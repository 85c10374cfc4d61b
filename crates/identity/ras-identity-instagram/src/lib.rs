//! Instagram identity provider.
//!
//! Implements the ras-identity-core [`Provider`] and [`Session`] traits for
//! Instagram's OAuth2 authorization code flow: build the authorization URL,
//! exchange the callback code for an access token, and fetch the user's
//! `id` and `username`. Instagram does not issue refresh tokens through this
//! flow, so refreshing is reported as unsupported.

mod config;
mod provider;
mod session;
mod types;


pub use config::{
    AUTHORIZATION_ENDPOINT, InstagramConfig, InstagramEndpoints, PROFILE_ENDPOINT, TOKEN_ENDPOINT,
};
pub use provider::{DEFAULT_PROVIDER_NAME, DEFAULT_SCOPE, InstagramProvider};
pub use session::InstagramSession;
pub use types::{ProfileResponse, TokenResponse};

// Re-export common types for convenience
pub use ras_identity_core::{
    ErrorKind, IdentityError, IdentityResult, Params, Provider, Session, Token, User,
};
