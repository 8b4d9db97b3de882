//! Ridgeline CLI - Admin console for the data room.
//!
//! # Usage
//!
//! ```bash
//! # Register the first admin (becomes super_admin on an empty portal)
//! ridgeline auth register -e admin@fund.com -n "First Admin"
//!
//! # Log in and inspect the portal
//! ridgeline auth login -e admin@fund.com
//! ridgeline users list
//! ridgeline requests list --status pending
//!
//! # Manage the data room
//! ridgeline documents upload -t "Q3 Financials" -c <category-id> -f ./q3.pdf
//! ridgeline documents delete <document-id> --yes
//! ridgeline levels create -n "View Only" -d "Read the room" --can-view
//! ```
//!
//! # Environment Variables
//!
//! - `RIDGELINE_API_URL` - Portal base URL (default: <http://127.0.0.1:8080>)
//! - `RIDGELINE_TOKEN_DIR` - Directory for the persisted admin token
//!   (default: `.ridgeline` in the working directory)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use ridgeline_client::{AdminClient, FileTokenStore};

mod commands;

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(author, version, about = "Ridgeline data room admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Admin session: register, login, profile, password
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Manage accounts (super admin)
    Users {
        #[command(subcommand)]
        action: commands::users::UserAction,
    },
    /// Manage the document room
    Documents {
        #[command(subcommand)]
        action: commands::documents::DocumentAction,
    },
    /// Manage permission levels
    Levels {
        #[command(subcommand)]
        action: commands::levels::LevelAction,
    },
    /// Review access requests
    Requests {
        #[command(subcommand)]
        action: commands::requests::RequestAction,
    },
    /// Answer investor questions
    Qa {
        #[command(subcommand)]
        action: commands::qa::QaAction,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Build the admin client from environment configuration.
fn admin_client() -> Result<AdminClient, Box<dyn std::error::Error>> {
    let base_url = std::env::var("RIDGELINE_API_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let token_dir =
        std::env::var("RIDGELINE_TOKEN_DIR").unwrap_or_else(|_| ".ridgeline".to_string());
    let store = Arc::new(FileTokenStore::new(token_dir)?);
    Ok(AdminClient::new(&base_url, store)?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = admin_client()?;
    match cli.command {
        Commands::Auth { action } => commands::auth::run(&client, action).await?,
        Commands::Users { action } => commands::users::run(&client, action).await?,
        Commands::Documents { action } => commands::documents::run(&client, action).await?,
        Commands::Levels { action } => commands::levels::run(&client, action).await?,
        Commands::Requests { action } => commands::requests::run(&client, action).await?,
        Commands::Qa { action } => commands::qa::run(&client, action).await?,
    }
    Ok(())
}
