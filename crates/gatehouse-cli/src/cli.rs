use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gatehouse", version, about = "Sign in, register and manage your gatehouse session")]
pub struct Cli {
    /// Backend base URL (overrides config and GATEHOUSE_API_URL)
    #[arg(long, global = true, env = "GATEHOUSE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    /// Request a password reset link by email
    ForgotPassword {
        #[arg(long)]
        email: Option<String>,
    },
    /// Set a new password using the token from the reset link
    ResetPassword {
        #[arg(long)]
        token: String,
    },
    /// Show the current session and signed-in user
    Status {
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the stored token and end any GitHub session
    Logout,
    /// Print the effective configuration
    Config,
}
