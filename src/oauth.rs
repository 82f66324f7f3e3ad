use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::token::Token;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// A lifetime too large to represent is stored as "no expiry".
    fn into_token(self) -> Token {
        Token {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: self.refresh_token,
            expiry: self
                .expires_in
                .filter(|secs| *secs > 0)
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime)),
        }
    }
}

/// Authorization-code flow against the endpoints of one OAuth client.
#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: Client,
    credentials: Credentials,
}

impl OAuthClient {
    pub fn new(http: Client, credentials: Credentials) -> Self {
        Self { http, credentials }
    }

    /// URL the operator visits to grant offline access.
    pub fn authorize_url(&self, state: &str) -> Url {
        let creds = &self.credentials;
        let mut url = creds.auth_uri.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", &creds.client_id)
            .append_pair("redirect_uri", &creds.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &creds.scopes.join(" "))
            .append_pair("state", state);
        url
    }

    pub async fn exchange(&self, code: &str) -> Result<Token> {
        let request = TokenRequest {
            grant_type: "authorization_code",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            code: Some(code),
            redirect_uri: Some(&self.credentials.redirect_uri),
            refresh_token: None,
        };
        self.request_token(&request).await
    }

    /// Trades a refresh token for a new access token. The old refresh token is
    /// kept when the server does not rotate it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        let request = TokenRequest {
            grant_type: "refresh_token",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            code: None,
            redirect_uri: None,
            refresh_token: Some(refresh_token),
        };
        let mut token = self.request_token(&request).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    async fn request_token(&self, request: &TokenRequest<'_>) -> Result<Token> {
        let body = serde_urlencoded::to_string(request)
            .map_err(|e| Error::AuthExchange(format!("failed to encode request: {e}")))?;

        debug!(grant_type = request.grant_type, "requesting token");
        let res = self
            .http
            .post(self.credentials.token_uri.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::AuthExchange(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::AuthExchange(format!("{status}: {body}")));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| Error::AuthExchange(format!("invalid token response: {e}")))?;
        Ok(token.into_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::credentials;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_authorize_url_requests_offline_access() {
        let oauth = OAuthClient::new(Client::new(), credentials("https://oauth.test"));
        let url = oauth.authorize_url("state");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.test"));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("client_id".into(), "client-id".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), crate::config::CLOUD_PRINT_SCOPE.into())));
        assert!(pairs.contains(&("state".into(), "state".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "urn:ietf:wg:oauth:2.0:oob".into()
        )));
    }

    #[tokio::test]
    async fn test_exchange_posts_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2Fabc"))
            .and(body_string_contains("client_secret=client-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "refresh_token": "1//r",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oauth = OAuthClient::new(Client::new(), credentials(&server.uri()));
        let token = oauth.exchange("4/abc").await.unwrap();

        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token.as_deref(), Some("1//r"));
        assert!(token.is_valid());
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "renewed",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let oauth = OAuthClient::new(Client::new(), credentials(&server.uri()));
        let token = oauth.refresh("old-refresh").await.unwrap();

        assert_eq!(token.access_token, "renewed");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
    }

    #[tokio::test]
    async fn test_huge_lifetime_never_expires() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"x","expires_in":10000000000000}"#),
            )
            .mount(&server)
            .await;
        let oauth = OAuthClient::new(Client::new(), credentials(&server.uri()));

        let token = oauth.exchange("4/abc").await.unwrap();
        assert_eq!(token.expiry, None);
        assert!(token.is_valid());

        let response: TokenResponse =
            serde_json::from_str(&format!(r#"{{"access_token":"x","expires_in":{}}}"#, i64::MAX))
                .unwrap();
        assert_eq!(response.into_token().expiry, None);
    }

    #[tokio::test]
    async fn test_rejected_code_is_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let oauth = OAuthClient::new(Client::new(), credentials(&server.uri()));
        let err = oauth.exchange("bad").await.unwrap_err();

        assert!(matches!(err, Error::AuthExchange(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }
}
