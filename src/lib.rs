pub mod args;
pub mod auth;
pub mod client;
pub mod config;
pub mod delete;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod token;

#[cfg(test)]
mod testing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use crate::error::{Error, StoreError};

use crate::{
    args::{Cli, Command, DeleteJobsArgs},
    auth::AuthorizedClient,
    client::ApiClient,
    config::load_credentials,
    delete::{DeleteMode, JobDeleter},
    oauth::OAuthClient,
    provider::{obtain, CodePrompt, StdinPrompt},
    token::TokenStore,
};

/// Logs go to stderr so stdout only carries the authorization prompt and errors.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    run_with_prompt(cli, &mut StdinPrompt).await
}

pub async fn run_with_prompt<P: CodePrompt + ?Sized>(cli: Cli, prompt: &mut P) -> Result<()> {
    let credentials_file = cli.credentials_file()?.clone();
    let token_file = cli.token_file()?.clone();

    match cli.command {
        Command::DeleteJobs(DeleteJobsArgs {
            all,
            max_passes,
            ids,
        }) => {
            let mode = DeleteMode::from_args(all, ids);
            mode.ensure_supported()?;

            let credentials = load_credentials(&credentials_file)?;
            let http = reqwest::Client::new();
            let oauth = OAuthClient::new(http.clone(), credentials);
            let store = TokenStore::new(token_file);

            let token = obtain(&oauth, &store, prompt).await?;
            let authorized = AuthorizedClient::new(http, oauth, token).persist_to(store);
            let mut api = ApiClient::new(authorized, cli.api_base_url);

            let deleted = JobDeleter::new(&mut api)
                .max_passes(max_passes)
                .run(&mode)
                .await?;
            info!("Deleted {deleted} jobs.");
        }
    }

    Ok(())
}
