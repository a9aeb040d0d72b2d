//! Gatehouse - terminal front-end for the gatehouse auth backend.
//!
//! Provides login, registration, password reset and a session status view
//! that reconciles the stored token with a GitHub (OAuth) session.

mod cli;
mod commands;
mod prompt;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};
use gatehouse_core::{AuthContext, Config};

/// Environment variable naming a directory for daily log files
const LOG_DIR_ENV: &str = "GATEHOUSE_LOG_DIR";

/// Log file name prefix inside `GATEHOUSE_LOG_DIR`
const LOG_FILE_PREFIX: &str = "gatehouse.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard must stay alive for file logs to be flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }

    info!(command = ?cli.command, "Running command");

    match cli.command {
        Command::Config => commands::show_config(&config),
        Command::Login { email } => commands::login(&mut connect(config)?, email).await,
        Command::Register { email } => commands::register(&connect(config)?, email).await,
        Command::ForgotPassword { email } => {
            commands::forgot_password(&connect(config)?, email).await
        }
        Command::ResetPassword { token } => {
            commands::reset_password(&connect(config)?, token).await
        }
        Command::Status { json } => commands::status(&connect(config)?, json).await,
        Command::Logout => commands::logout(&connect(config)?).await,
    }
}

/// Build the auth context. Only commands that talk to the backend need one.
fn connect(config: Config) -> Result<AuthContext> {
    AuthContext::from_config(config)
}
