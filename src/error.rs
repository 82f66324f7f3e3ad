use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors produced while reading or writing the token file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("token file {} is corrupt", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on token file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required flag: {0}")]
    MissingFlag(&'static str),

    #[error("invalid credentials file {}: {reason}", .path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("failed to load token from file")]
    TokenLoad(#[source] StoreError),

    #[error("failed to save token to file")]
    TokenPersist(#[source] StoreError),

    #[error("failed to read authorization code")]
    Prompt(#[source] io::Error),

    #[error("token request failed: {0}")]
    AuthExchange(String),

    #[error("failed to refresh access token")]
    TokenRefresh(#[source] Box<Error>),

    #[error("access token expired and no refresh token is available")]
    TokenExpired,

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response")]
    Decode(#[source] serde_json::Error),

    #[error("unsuccessful: {message}")]
    Api { message: String },

    #[error("failed to list jobs")]
    ListJobs(#[source] Box<Error>),

    #[error("failed to delete job {id}")]
    DeleteJob {
        id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("job queue still not empty after {0} passes")]
    PassLimit(u64),
}

#[cfg(test)]
impl Error {
    /// HTTP status of a non-200 API response, looking through controller context.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            Self::ListJobs(inner) | Self::DeleteJob { source: inner, .. } => inner.status(),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
