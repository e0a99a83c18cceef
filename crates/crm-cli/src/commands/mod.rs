//! Command handlers. Each one turns a parsed subcommand into core calls and
//! prints the outcome.

mod dashboard;
mod records;
mod session;

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::debug;

use crm_core::{ApiError, Config, CrmClient};

use crate::cli::{Cli, Commands};
use crate::output;

/// Printed when the backend rejects the credential (or there is none).
const SIGNED_OUT_NOTICE: &str = "Not signed in or session expired. Run `crm login` to sign in.";

pub struct Context {
    pub config: Config,
    pub api_url: String,
    pub json: bool,
}

impl Context {
    /// `--api-url` wins over everything `Config::api_url` considers.
    pub fn new(config: Config, api_url: Option<String>, json: bool) -> Self {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| config.api_url());
        Self {
            config,
            api_url,
            json,
        }
    }

    pub fn connect(&self) -> Result<CrmClient> {
        self.config.connect(&self.api_url)
    }

    /// Print `value` as JSON, or as the text `render` produces.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            println!("{}", output::json(value)?);
        } else {
            print!("{}", render(value));
        }
        Ok(())
    }

    /// Print `value` as JSON, or a one-line confirmation.
    pub fn done<T: Serialize + ?Sized>(&self, value: &T, message: &str) -> Result<()> {
        self.emit(value, |_| format!("{}\n", message))
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut ctx = Context::new(config, cli.api_url, cli.json);
    debug!(api_url = %ctx.api_url, "Running command");

    match cli.command {
        Commands::Login { username } => session::login(&mut ctx, username).await,
        Commands::Register { username, email } => session::register(&ctx, username, email).await,
        Commands::Logout => session::logout(&ctx),
        Commands::Status => session::status(&ctx),
        Commands::Health => session::health(&ctx).await,
        Commands::Dashboard => dashboard::show(&ctx).await,
        Commands::Contacts { command } => records::contacts(&ctx, command).await,
        Commands::Companies { command } => records::companies(&ctx, command).await,
        Commands::Deals { command } => records::deals(&ctx, command).await,
    }
}

/// One-line notice for a failed call: the server's message when it sent
/// one, otherwise `fallback`.
pub fn notice(error: ApiError, fallback: &str) -> anyhow::Error {
    debug!(error = %error, "Request failed");
    if error.is_unauthenticated() {
        anyhow!(SIGNED_OUT_NOTICE)
    } else {
        anyhow!(error.notice(fallback))
    }
}

/// Ask a yes/no question on stderr; anything but "y"/"yes" is a no.
pub fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
