use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};
use serde_json::json;
use tracing::{debug, warn};

use crm_core::{Credentials, Registration, SessionStatus};

use super::{notice, Context};

/// Non-interactive login for scripts.
const USERNAME_ENV: &str = "CRM_USERNAME";
const PASSWORD_ENV: &str = "CRM_PASSWORD";

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => eprint!("Username [{}]: ", last),
        None => eprint!("Username: "),
    }
    io::stderr().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let entered = username.trim();
    Ok(match (entered.is_empty(), last) {
        (true, Some(last)) => last.to_string(),
        _ => entered.to_string(),
    })
}

fn password() -> Result<String> {
    match env_value(PASSWORD_ENV) {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

pub async fn login(ctx: &mut Context, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| env_value(USERNAME_ENV)) {
        Some(username) => username,
        None => prompt_username(ctx.config.last_username.as_deref())?,
    };
    let credentials = Credentials::new(username.trim(), password()?);
    credentials.validate()?;

    let crm = ctx.connect()?;
    let identity = crm.api().login(&credentials).await.map_err(|failure| {
        debug!(error = ?failure, "Login rejected");
        anyhow!(failure.error().to_string())
    })?;

    ctx.config.last_username = Some(credentials.username.clone());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to remember username");
    }

    let name = identity.username().unwrap_or(&credentials.username);
    ctx.done(&identity.user(), &format!("Login successful! Signed in as {}", name))
}

pub async fn register(ctx: &Context, username: String, email: String) -> Result<()> {
    let password = match env_value(PASSWORD_ENV) {
        Some(password) => password,
        None => {
            let first = rpassword::prompt_password("Password: ")?;
            let again = rpassword::prompt_password("Confirm password: ")?;
            if first != again {
                bail!("Passwords do not match");
            }
            first
        }
    };
    let registration = Registration::new(username.trim(), email.trim(), password);
    registration.validate()?;

    let crm = ctx.connect()?;
    let status = crm.api().register(&registration).await.map_err(|failure| {
        debug!(error = ?failure, "Registration rejected");
        anyhow!(failure.error().to_string())
    })?;

    ctx.done(&status, "Registration successful! Run `crm login` to sign in.")
}

pub fn logout(ctx: &Context) -> Result<()> {
    let crm = ctx.connect()?;
    let was_signed_in = crm.session().is_authenticated();
    crm.api().logout();

    let message = if was_signed_in { "Logged out" } else { "Not signed in" };
    ctx.done(&json!({ "logged_out": was_signed_in }), message)
}

pub fn status(ctx: &Context) -> Result<()> {
    let session = ctx.config.session_store()?;
    let signed_in = matches!(session.status(), SessionStatus::SignedIn(_));
    let storage = session.storage_kind();
    let last_username = ctx.config.last_username.as_deref();

    let report = json!({
        "authenticated": signed_in,
        "storage": storage,
        "api_url": ctx.api_url,
        "last_username": last_username,
    });
    ctx.emit(&report, |_| {
        let mut text = if signed_in {
            format!("Signed in (token kept in {} storage)\n", storage)
        } else {
            "Signed out\n".to_string()
        };
        if let (true, Some(name)) = (signed_in, last_username) {
            text.push_str(&format!("Last login: {}\n", name));
        }
        text.push_str(&format!("Backend:    {}\n", ctx.api_url));
        text
    })
}

pub async fn health(ctx: &Context) -> Result<()> {
    let crm = ctx.connect()?;
    let health = crm
        .health()
        .await
        .map_err(|e| notice(e, "Backend is unreachable"))?;
    if !health.is_healthy() {
        bail!("Backend reports status '{}'", health.status);
    }

    let message = match health.timestamp.as_deref() {
        Some(timestamp) => format!("Backend is healthy ({}, server time {})", ctx.api_url, timestamp),
        None => format!("Backend is healthy ({})", ctx.api_url),
    };
    ctx.done(&health, &message)
}
