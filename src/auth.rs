use reqwest::{Client, IntoUrl, Response};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::oauth::OAuthClient;
use crate::token::{Token, TokenStore};

/// HTTP client that attaches the bearer token to every request and refreshes
/// it first when it has expired.
#[derive(Debug)]
pub struct AuthorizedClient {
    http: Client,
    oauth: OAuthClient,
    token: Token,
    store: Option<TokenStore>,
}

impl AuthorizedClient {
    pub fn new(http: Client, oauth: OAuthClient, token: Token) -> Self {
        Self {
            http,
            oauth,
            token,
            store: None,
        }
    }

    /// Write refreshed tokens back to `store`.
    pub fn persist_to(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> &Token {
        &self.token
    }

    pub async fn get(&mut self, url: impl IntoUrl) -> Result<Response> {
        let access_token = self.access_token().await?;
        let req = self.http.get(url).bearer_auth(access_token);
        Ok(req.send().await?)
    }

    pub async fn post_form<T: Serialize + ?Sized>(
        &mut self,
        url: impl IntoUrl,
        form: &T,
    ) -> Result<Response> {
        let access_token = self.access_token().await?;
        let req = self.http.post(url).bearer_auth(access_token).form(form);
        Ok(req.send().await?)
    }

    async fn access_token(&mut self) -> Result<String> {
        if !self.token.is_valid() {
            let refresh_token = self
                .token
                .refresh_token
                .clone()
                .ok_or(Error::TokenExpired)?;
            self.token = self
                .oauth
                .refresh(&refresh_token)
                .await
                .map_err(|e| Error::TokenRefresh(Box::new(e)))?;
            info!("Refreshed access token.");

            if let Some(store) = &self.store {
                match store.save(&self.token) {
                    Ok(()) => debug!("persisted refreshed token"),
                    Err(err) => warn!(error = %err, "failed to persist refreshed token"),
                }
            }
        }
        Ok(self.token.access_token.clone())
    }
}
