use reqwest::Url;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{Error, Result};

pub const CLOUD_PRINT_SCOPE: &str = "https://www.googleapis.com/auth/cloudprint";

/// OAuth client descriptor, as downloaded from the Google Cloud console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: Url,
    pub token_uri: Url,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

#[derive(Deserialize)]
struct CredentialsFile {
    web: Option<ClientSection>,
    installed: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let invalid = |reason: String| Error::Credentials {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read_to_string(path).map_err(|e| invalid(format!("failed to read: {e}")))?;
    parse_credentials(&data, &[CLOUD_PRINT_SCOPE]).map_err(invalid)
}

fn parse_credentials(data: &str, scopes: &[&str]) -> Result<Credentials, String> {
    let file: CredentialsFile =
        serde_json::from_str(data).map_err(|e| format!("failed to parse: {e}"))?;

    let section = file
        .web
        .or(file.installed)
        .ok_or_else(|| "no `web` or `installed` client found".to_string())?;

    let redirect_uri = section
        .redirect_uris
        .into_iter()
        .next()
        .ok_or_else(|| "missing redirect URL".to_string())?;

    let endpoint = |name: &str, raw: &str| {
        Url::parse(raw).map_err(|e| format!("invalid {name} `{raw}`: {e}"))
    };

    Ok(Credentials {
        auth_uri: endpoint("auth_uri", &section.auth_uri)?,
        token_uri: endpoint("token_uri", &section.token_uri)?,
        client_id: section.client_id,
        client_secret: section.client_secret,
        redirect_uri,
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
    })
}
