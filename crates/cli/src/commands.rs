//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use porter_http::ApiClient;
use porter_session::SessionFacade;
use serde::Serialize;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PORTER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PORTER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show who the stored token belongs to
    Whoami,

    /// Forget the stored session
    Logout,

    /// Show host resource usage
    Stats,

    /// List configured repositories
    Repos,

    /// Show deployment and web server logs for a repository
    Logs {
        /// Repository name
        repo: String,
    },
}

impl Commands {
    pub async fn execute(self, client: &ApiClient, session: &SessionFacade) -> Result<()> {
        match self {
            Self::Login { username, password } => {
                if username.is_empty() || password.is_empty() {
                    bail!("username and password must not be empty");
                }
                session.login(&username, &password).await?;
                match session.user() {
                    Some(user) => println!("Logged in as {user}"),
                    None => bail!("logged in, but the server did not confirm the identity"),
                }
                Ok(())
            }
            Self::Register { username, password } => {
                if username.is_empty() || password.is_empty() {
                    bail!("username and password must not be empty");
                }
                let response = client.register(&username, &password).await?;
                info!(%username, "Registered account");
                println!("{}", response.message);
                Ok(())
            }
            Self::Whoami => {
                session.init_auth().await;
                match session.user() {
                    Some(user) if session.is_authenticated() => println!("{user}"),
                    _ => println!("Not logged in"),
                }
                Ok(())
            }
            Self::Logout => {
                session.logout();
                println!("Logged out");
                Ok(())
            }
            Self::Stats => print_json(&client.stats().await?),
            Self::Repos => print_json(&client.repositories().await?),
            Self::Logs { repo } => print_json(&client.repository_logs(&repo).await?),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
