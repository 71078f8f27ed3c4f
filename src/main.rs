//! authgate CLI binary entry point.

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use authgate::cli::{Cli, Commands, SessionCommands};

const LOG_ENV_VAR: &str = "AUTHGATE_LOG";

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    let profile = cli.profile;

    let result = match cli.command {
        Commands::Session(session_args) => match session_args.command {
            SessionCommands::Login(args) => authgate::cli::session::handle_login(
                &profile,
                &args.access_token,
                args.refresh_token,
            ),
            SessionCommands::Status => authgate::cli::session::handle_status(&profile),
            SessionCommands::Logout => authgate::cli::session::handle_logout(&profile),
        },
        Commands::Get(args) => authgate::cli::get::handle_get(&profile, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
