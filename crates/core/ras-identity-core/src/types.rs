//! Records exchanged between adapters and the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Normalized user profile returned by [`crate::Provider::fetch_user`].
///
/// Adapters fill in whatever their platform exposes and leave the rest empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The decoded profile payload, untouched.
    pub raw_data: serde_json::Map<String, serde_json::Value>,
    pub provider: String,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub description: String,
    pub user_id: String,
    pub avatar_url: String,
    pub location: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub id_token: String,
}

/// OAuth2 token as handed back by a code exchange or refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// A token is usable when it carries a value and has not expired.
    pub fn is_valid(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(expiry) => Utc::now() < expiry,
            None => true,
        }
    }
}

/// Key/value lookup over the callback request, used to pull out `code`.
pub trait Params: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;
}

impl Params for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl Params for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_validity() {
        assert!(!Token::default().is_valid());

        let mut token = Token {
            access_token: "abc".to_string(),
            ..Default::default()
        };
        assert!(token.is_valid());

        token.expiry = Some(Utc::now() + Duration::hours(1));
        assert!(token.is_valid());

        token.expiry = Some(Utc::now() - Duration::minutes(1));
        assert!(!token.is_valid());
    }

    #[test]
    fn test_params_lookup() {
        let mut map = HashMap::new();
        map.insert("code".to_string(), "abc".to_string());
        assert_eq!(Params::get(&map, "code"), Some("abc"));
        assert_eq!(Params::get(&map, "state"), None);

        let tree: BTreeMap<String, String> =
            [("state".to_string(), "xyz".to_string())].into_iter().collect();
        assert_eq!(Params::get(&tree, "state"), Some("xyz"));
    }
}
