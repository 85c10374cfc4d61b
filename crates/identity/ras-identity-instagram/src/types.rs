//! Instagram wire types.

use serde::{Deserialize, Serialize};

/// Token endpoint response. Instagram adds `user_id`, which is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

/// Profile returned by `/me?fields=id,username`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
}
