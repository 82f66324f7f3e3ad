use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::client::DEFAULT_BASE_URL;
use crate::delete::DEFAULT_MAX_PASSES;
use crate::error::{Error, Result};

/// Google Cloud Print CLI
#[derive(Parser, Debug)]
#[command(name = "gprint", version, about)]
pub struct Cli {
    /// OAuth client ID configuration file (downloadable from https://console.cloud.google.com/apis/credentials)
    #[arg(long, global = true, env = "GPRINT_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// File to load or store an OAuth token
    #[arg(long, global = true, env = "GPRINT_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        hide = true,
        env = "GPRINT_API_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub api_base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete jobs
    #[command(override_usage = "gprint delete-jobs [--all] [ID...]")]
    DeleteJobs(DeleteJobsArgs),
}

#[derive(Args, Debug)]
pub struct DeleteJobsArgs {
    /// Delete all jobs
    #[arg(long)]
    pub all: bool,

    /// Give up when the queue is still not empty after this many listings
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PASSES,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_passes: u64,

    /// Job ids to delete
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,
}

impl Cli {
    pub fn credentials_file(&self) -> Result<&PathBuf> {
        self.credentials_file
            .as_ref()
            .ok_or(Error::MissingFlag("credentials-file"))
    }

    pub fn token_file(&self) -> Result<&PathBuf> {
        self.token_file
            .as_ref()
            .ok_or(Error::MissingFlag("token-file"))
    }
}
