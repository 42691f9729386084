use anyhow::Result;
use famcal_client::{ApiError, AuthResponse, Session};
use owo_colors::OwoColorize;

use crate::commands::{Context, submit};
use crate::utils::prompt::{prompt_password, prompt_text};
use crate::utils::tui;

pub async fn login(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => prompt_text("  Email", None)?,
    };
    let password = prompt_password("  Password")?;

    let client = ctx.anonymous_client()?;
    let result = tui::with_spinner("Logging in", client.login(&email, &password)).await;

    // A 401 here means bad credentials, not an expired session
    let auth = match result {
        Err(ApiError::Unauthorized) => anyhow::bail!("Invalid email or password"),
        other => submit(other)?,
    };

    finish(ctx, auth, "Logged in")
}

pub async fn register(ctx: &Context) -> Result<()> {
    let name = prompt_text("  Name", None)?;
    let email = prompt_text("  Email", None)?;
    let password = prompt_password("  Password")?;
    let confirm = prompt_password("  Confirm password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let client = ctx.anonymous_client()?;
    let auth = submit(tui::with_spinner("Creating account", client.register(&name, &email, &password)).await)?;

    finish(ctx, auth, "Welcome")
}

fn finish(ctx: &Context, auth: AuthResponse, greeting: &str) -> Result<()> {
    let name = auth.user.name.clone();
    ctx.save_session(&Session::from(auth))?;

    println!("{}", format!("  {greeting}, {name}").green());
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    if ctx.clear_session()? {
        println!("Logged out");
    } else {
        println!("{}", "Not logged in".dimmed());
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let user = tui::with_spinner("Checking session", client.current_user()).await?;

    println!("{} {}", user.name.bold(), format!("<{}>", user.email).dimmed());
    Ok(())
}
