//! Error vocabulary shared by every identity adapter.

use thiserror::Error;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Coarse category of an [`IdentityError`], for hosts that only care about
/// which step of the flow failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    Http,
    Decode,
    ExchangeFailed,
    InvalidToken,
    NotInitialized,
    Unsupported,
    MissingAuthorizationCode,
    Transport,
    Config,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{provider} cannot get user information without an access token")]
    MissingCredential { provider: String },

    #[error("{provider} responded with a {status} trying to fetch user information")]
    Http { provider: String, status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Invalid token received from provider: {0}")]
    InvalidToken(String),

    #[error("An auth URL has not been set")]
    NotInitialized,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Missing authorization code")]
    MissingAuthorizationCode,

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::MissingCredential { .. } => ErrorKind::MissingCredential,
            IdentityError::Http { .. } => ErrorKind::Http,
            IdentityError::Decode(_) => ErrorKind::Decode,
            IdentityError::ExchangeFailed(_) => ErrorKind::ExchangeFailed,
            IdentityError::InvalidToken(_) => ErrorKind::InvalidToken,
            IdentityError::NotInitialized => ErrorKind::NotInitialized,
            IdentityError::Unsupported(_) => ErrorKind::Unsupported,
            IdentityError::MissingAuthorizationCode => ErrorKind::MissingAuthorizationCode,
            IdentityError::Transport(_) => ErrorKind::Transport,
            IdentityError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(err: serde_json::Error) -> Self {
        IdentityError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_carries_status_and_provider() {
        let err = IdentityError::Http {
            provider: "instagram".to_string(),
            status: 403,
        };
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(
            err.to_string(),
            "instagram responded with a 403 trying to fetch user information"
        );
    }

    #[test]
    fn test_serde_error_maps_to_decode() {
        let err: IdentityError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
