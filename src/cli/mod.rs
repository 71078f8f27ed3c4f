//! CLI entry point for authgate.

pub mod get;
pub mod session;

use clap::{Parser, Subcommand};

/// Authenticated API client
#[derive(Parser, Debug)]
#[command(name = "authgate", version, about = "authgate: bearer-token API client")]
pub struct Cli {
    /// Session profile to use
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Session(SessionArgs),
    /// Authenticated GET against an API target
    Get(GetArgs),
}

/// Arguments for the `session` subcommand group.
#[derive(Parser, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

/// Session subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Store tokens for later requests
    Login(LoginArgs),
    /// Show the stored session
    Status,
    /// Clear the stored session
    Logout,
}

/// Arguments for `authgate session login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Access token
    #[arg(long)]
    pub access_token: String,

    /// Refresh token
    #[arg(long)]
    pub refresh_token: Option<String>,
}

/// Arguments for `authgate get`.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Path relative to the target's base URL
    pub path: String,

    /// API target (api, account-manager)
    #[arg(long, default_value = "api")]
    pub target: String,

    /// Filter as name=<json value>
    #[arg(long)]
    pub filter: Option<String>,

    /// Ordering as field:asc or field:desc
    #[arg(long)]
    pub order_by: Option<String>,

    #[arg(long)]
    pub limit: Option<u64>,

    #[arg(long)]
    pub offset: Option<u64>,

    /// Extra query parameter as key=<json value or text>, repeatable
    #[arg(long = "param")]
    pub params: Vec<String>,
}
