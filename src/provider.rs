use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::error::{Error, Result, StoreError};
use crate::oauth::OAuthClient;
use crate::token::{Token, TokenCache};

/// Obtains an authorization code from the operator for a given authorization URL.
pub trait CodePrompt {
    fn authorization_code(&mut self, auth_url: &str) -> io::Result<String>;
}

/// Prints the URL to stdout and blocks until a non-empty line arrives on stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn authorization_code(&mut self, auth_url: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(
            stdout,
            "Go to the following URL, then paste the authorization code: {auth_url}\n\nAuth code: "
        )?;
        stdout.flush()?;
        read_code(io::stdin().lock())
    }
}

fn read_code(mut input: impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no authorization code entered",
            ));
        }
        let code = line.trim();
        if !code.is_empty() {
            return Ok(code.to_string());
        }
    }
}

/// Loads the saved token, or walks the operator through authorization when
/// there is none yet. Either way the token is written back before returning.
pub async fn obtain<S, P>(oauth: &OAuthClient, store: &S, prompt: &mut P) -> Result<Token>
where
    S: TokenCache + ?Sized,
    P: CodePrompt + ?Sized,
{
    let token = match store.load() {
        Ok(token) => token,
        Err(StoreError::NotFound(path)) => {
            debug!(path = %path.display(), "no saved token, starting authorization");
            acquire(oauth, prompt).await?
        }
        Err(err) => return Err(Error::TokenLoad(err)),
    };

    store.save(&token).map_err(Error::TokenPersist)?;
    Ok(token)
}

async fn acquire<P: CodePrompt + ?Sized>(oauth: &OAuthClient, prompt: &mut P) -> Result<Token> {
    let url = oauth.authorize_url("state");
    let code = prompt
        .authorization_code(url.as_str())
        .map_err(Error::Prompt)?;
    let token = oauth.exchange(&code).await?;
    info!("Obtained new access token.");
    Ok(token)
}
