use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
};
use tracing::debug;

use crate::error::StoreError;

/// Tokens are treated as expired this long before their recorded expiry.
const EXPIRY_DELTA_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// An empty access token is never valid. A missing expiry, or the zero
    /// timestamp other OAuth libraries write for "no expiry", never expires.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(exp) if exp.year() > 1 => exp - Duration::seconds(EXPIRY_DELTA_SECS) > now,
            _ => true,
        }
    }
}

/// Where the provider keeps the token between runs.
pub trait TokenCache {
    fn load(&self) -> Result<Token, StoreError>;
    fn save(&self, token: &Token) -> Result<(), StoreError>;
}

/// The token file on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Token, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.clone())
            } else {
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let token = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "loaded token");
        Ok(token)
    }

    /// Writes the token, creating the file owner-read/write only.
    pub fn save(&self, token: &Token) -> Result<(), StoreError> {
        self.write(token).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "saved token");
        Ok(())
    }

    fn write(&self, token: &Token) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(token)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // mode() only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&json)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

impl TokenCache for TokenStore {
    fn load(&self) -> Result<Token, StoreError> {
        TokenStore::load(self)
    }

    fn save(&self, token: &Token) -> Result<(), StoreError> {
        TokenStore::save(self, token)
    }
}
