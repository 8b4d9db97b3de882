//! Admin session commands.
//!
//! # Usage
//!
//! ```bash
//! ridgeline auth register -e admin@fund.com -n "First Admin"
//! ridgeline auth login -e admin@fund.com
//! ridgeline auth whoami
//! ridgeline auth change-password
//! ridgeline auth logout
//! ```
//!
//! Passwords come from `--password` or `RIDGELINE_ADMIN_PASSWORD`; the
//! token persists under `RIDGELINE_TOKEN_DIR` between invocations.

use clap::Subcommand;

use ridgeline_client::{AdminClient, AdminRegistration};

use super::password_from;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Register an admin account (the first one becomes super_admin)
    Register {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (falls back to RIDGELINE_ADMIN_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log in with email and password
    Login {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password (falls back to RIDGELINE_ADMIN_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show the logged-in profile
    Whoami,
    /// Rename the logged-in profile
    Rename {
        /// New display name
        #[arg(short, long)]
        name: String,
    },
    /// Rotate the password
    ChangePassword {
        /// Current password (falls back to RIDGELINE_ADMIN_PASSWORD)
        #[arg(short, long)]
        current: Option<String>,

        /// New password
        #[arg(short, long)]
        new: String,
    },
    /// Drop the stored token
    Logout,
}

pub async fn run(
    client: &AdminClient,
    action: AuthAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Register {
            email,
            name,
            password,
        } => {
            let password = password_from(password)?;
            client
                .register(&AdminRegistration {
                    email: email.clone(),
                    password,
                    full_name: name,
                })
                .await?;
            let me = client.me().await?;
            tracing::info!("Registered {} as {}", me.email, me.role);
        }
        AuthAction::Login { email, password } => {
            let password = password_from(password)?;
            client.login(&email, &password).await?;
            let me = client.me().await?;
            tracing::info!("Logged in as {} ({})", me.email, me.role);
        }
        AuthAction::Whoami => {
            let me = client.me().await?;
            tracing::info!(
                "{} <{}> role={} active={}",
                me.full_name,
                me.email,
                me.role,
                me.is_active
            );
        }
        AuthAction::Rename { name } => {
            client.update_profile(&name).await?;
            let me = client.me().await?;
            tracing::info!("Profile updated: {}", me.full_name);
        }
        AuthAction::ChangePassword { current, new } => {
            let current = password_from(current)?;
            client.change_password(&current, &new).await?;
            tracing::info!("Password changed");
        }
        AuthAction::Logout => {
            client.forget_token()?;
            tracing::info!("Logged out");
        }
    }
    Ok(())
}
