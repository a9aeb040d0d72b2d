//! Command handlers. Each one collects input, calls the core library and
//! renders the outcome; no session logic lives here.

use anyhow::{anyhow, Result};
use gatehouse_core::auth::FileTokenStore;
use gatehouse_core::utils::{format_age, format_date, token_preview};
use gatehouse_core::{
    AuthContext, AuthError, Config, ForgotPasswordForm, LoginForm, LogoutOutcome, RegisterForm,
    ResetPasswordForm, Resolution, SessionState, TokenBackend,
};
use tracing::{info, warn};

use crate::prompt::{prompt_line, prompt_password};

/// Turn an auth failure into a printable error, listing field problems first.
fn report(err: AuthError) -> anyhow::Error {
    if let AuthError::Validation(ref errors) = err {
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field, message);
        }
        return anyhow!("Please fix the errors above");
    }
    warn!(error = %err, "Request failed");
    anyhow!(err.user_message())
}

fn email_or_prompt(email: Option<String>, default: Option<&str>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => prompt_line("Email", default),
    }
}

pub async fn login(ctx: &mut AuthContext, email: Option<String>) -> Result<()> {
    let email = email_or_prompt(email, ctx.config.last_email.as_deref())?;
    let password = prompt_password("Password")?;

    println!("\nAuthenticating...");
    let form = LoginForm { email, password };
    ctx.service.sign_in(&form).await.map_err(report)?;

    ctx.config.last_email = Some(form.email.trim().to_string());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Login successful!\n");
    let resolution = ctx.resolver.evaluate().await;
    print_resolution(ctx, &resolution);
    Ok(())
}

pub async fn register(ctx: &AuthContext, email: Option<String>) -> Result<()> {
    let email = email_or_prompt(email, None)?;
    let password = prompt_password("Password")?;
    let confirm_password = prompt_password("Confirm password")?;

    let form = RegisterForm {
        email,
        password,
        confirm_password,
    };
    let response = ctx.service.register(&form).await.map_err(report)?;
    info!("Registration completed");
    println!("{}", non_empty(&response.message, "Account created."));
    println!("You can now sign in with `gatehouse login`.");
    Ok(())
}

pub async fn forgot_password(ctx: &AuthContext, email: Option<String>) -> Result<()> {
    let email = email_or_prompt(email, ctx.config.last_email.as_deref())?;
    let response = ctx
        .service
        .forgot_password(&ForgotPasswordForm { email })
        .await
        .map_err(report)?;
    println!(
        "{}",
        non_empty(&response.message, "If the account exists, a reset link has been sent.")
    );
    Ok(())
}

pub async fn reset_password(ctx: &AuthContext, token: String) -> Result<()> {
    let password = prompt_password("New password")?;
    let confirm_password = prompt_password("Confirm new password")?;

    let form = ResetPasswordForm {
        token,
        password,
        confirm_password,
    };
    match ctx.service.reset_password(&form).await {
        Ok(response) => {
            println!("{}", non_empty(&response.message, "Password updated."));
            if let Some(data) = response.data {
                println!("You can now sign in as {}.", data.email);
            }
            Ok(())
        }
        Err(err @ AuthError::Request(_)) => {
            eprintln!("The reset link may have expired. Request a new one with `gatehouse forgot-password`.");
            Err(report(err))
        }
        Err(err) => Err(report(err)),
    }
}

pub async fn status(ctx: &AuthContext, json: bool) -> Result<()> {
    let resolution = ctx.resolver.evaluate().await;
    if json {
        let value = serde_json::json!({
            "state": format!("{:?}", resolution.state),
            "identity": resolution.identity,
            "error": resolution.error.as_ref().map(|e| e.user_message()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_resolution(ctx, &resolution);
    }
    Ok(())
}

pub async fn logout(ctx: &AuthContext) -> Result<()> {
    let outcome = ctx.resolver.logout().await.map_err(report)?;
    match outcome {
        LogoutOutcome::SignedOutFederated => println!("Signed out of GitHub and cleared the stored token."),
        LogoutOutcome::NavigateToLogin => {
            println!("Logged out. Sign in again with `gatehouse login`.")
        }
    }
    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if let Ok(path) = Config::config_path() {
        println!("\nConfig file: {}", path.display());
    }
    if let Some(path) = config.federated_session_path() {
        println!("Federated session file: {}", path.display());
    }
    Ok(())
}

fn non_empty<'a>(message: &'a str, fallback: &'a str) -> &'a str {
    if message.trim().is_empty() {
        fallback
    } else {
        message
    }
}

fn print_resolution(ctx: &AuthContext, resolution: &Resolution) {
    println!("Session: {}", resolution.state);

    if let Some(ref identity) = resolution.identity {
        println!("  Email:        {}", identity.email);
        if let Some(ref name) = identity.name {
            println!("  Name:         {}", name);
        }
        if let Some(ref id) = identity.id {
            println!("  User ID:      {}", id);
        }
        if let Some(ref created_at) = identity.created_at {
            println!("  Member since: {}", format_date(created_at));
        }
        if let Some(ref provider) = identity.provider {
            println!("  Linked via:   {}", provider);
        }
    }

    if let Some(token) = ctx.store.read() {
        let age = match (ctx.config.token_backend, Config::data_dir()) {
            (TokenBackend::File, Some(dir)) => FileTokenStore::new(dir)
                .load()
                .map(|record| format!(" (saved {})", format_age(record.saved_at))),
            _ => None,
        };
        println!("  Token:        {}{}", token_preview(&token), age.unwrap_or_default());
    }

    match resolution.state {
        SessionState::Unauthenticated => println!("\nNot logged in. Run `gatehouse login`."),
        SessionState::Unknown => println!("\nWaiting for the GitHub session to load."),
        SessionState::Syncing => println!("\nLinking your GitHub account..."),
        SessionState::SyncFailed | SessionState::AuthenticationError => {
            if let Some(ref err) = resolution.error {
                println!("\n{}", err.user_message());
            }
            if resolution.state == SessionState::AuthenticationError {
                println!("Run `gatehouse logout` and sign in again.");
            }
        }
        _ => {}
    }
}
