//! Fixtures shared by the unit tests.

use chrono::{Duration, Utc};
use reqwest::Url;

use crate::config::{Credentials, CLOUD_PRINT_SCOPE};
use crate::token::Token;

/// Credentials whose token endpoint is `{oauth_base}/token`.
pub fn credentials(oauth_base: &str) -> Credentials {
    Credentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        auth_uri: Url::parse("https://accounts.test/o/oauth2/auth").unwrap(),
        token_uri: Url::parse(&format!("{oauth_base}/token")).unwrap(),
        redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
        scopes: vec![CLOUD_PRINT_SCOPE.to_string()],
    }
}

pub fn valid_token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: Some("refresh".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

pub fn expired_token(access_token: &str) -> Token {
    Token {
        expiry: Some(Utc::now() - Duration::hours(1)),
        ..valid_token(access_token)
    }
}
