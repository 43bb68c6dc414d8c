//! Porter CLI - command-line client for the deploy console

mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use commands::Commands;
use porter_http::{ApiClient, ClientConfig, FileTokenStore, Navigator};
use porter_session::{SessionFacade, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "porter")]
#[command(about = "Command-line client for the Porter deploy console")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true, env = "PORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the stored session token
    #[arg(short = 'd', long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Tells the user to log in again instead of navigating a browser
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "Login view requested");
        eprintln!("Session expired or rejected. Run `porter login` to sign in again.");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_level.clone().into(), cli.log_json) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.state_dir.is_some() {
        config.state_dir = cli.state_dir;
    }
    debug!(base_endpoint = %config.base_endpoint, "Loaded configuration");

    let tokens = Arc::new(FileTokenStore::in_state_dir(
        config.state_dir.as_deref(),
        config.token_key.clone(),
    ));
    debug!("Token file: {}", tokens.path().display());

    let client =
        ApiClient::with_session_guard(&config, tokens.clone(), Arc::new(ConsoleNavigator))?;
    let store = SessionStore::new(client.clone(), tokens);
    let session = SessionFacade::new(store);

    cli.command.execute(&client, &session).await
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
