use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthorizedClient;
use crate::delete::JobQueue;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.google.com/cloudprint";

/// A queued print job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            status: None,
        }
    }
}

/// Wrapper the service puts around every response.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    jobs: Vec<Job>,
}

/// Cloud Print API bound to one base URL.
#[derive(Debug)]
pub struct ApiClient {
    http: AuthorizedClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: AuthorizedClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_jobs(&mut self) -> Result<Vec<Job>> {
        let url = format!("{}/jobs", self.base_url);
        debug!(%url, "listing jobs");
        let res = self.http.get(&url).await?;
        Ok(read_envelope(res).await?.jobs)
    }

    pub async fn delete_job(&mut self, id: &str) -> Result<()> {
        let url = format!("{}/deletejob", self.base_url);
        debug!(%url, id, "deleting job");
        let res = self.http.post_form(&url, &[("jobid", id)]).await?;
        read_envelope(res).await?;
        Ok(())
    }
}

async fn read_envelope(res: Response) -> Result<Envelope> {
    if res.status() != StatusCode::OK {
        return Err(Error::Http {
            status: res.status().as_u16(),
        });
    }

    let body = res.bytes().await?;
    let envelope: Envelope = serde_json::from_slice(&body).map_err(Error::Decode)?;
    if !envelope.success {
        return Err(Error::Api {
            message: envelope.message,
        });
    }
    Ok(envelope)
}

#[async_trait(?Send)]
impl JobQueue for ApiClient {
    async fn list_jobs(&mut self) -> Result<Vec<Job>> {
        ApiClient::list_jobs(self).await
    }

    async fn delete_job(&mut self, id: &str) -> Result<()> {
        ApiClient::delete_job(self, id).await
    }
}
