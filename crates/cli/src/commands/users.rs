//! Account management commands (super admin).
//!
//! Deleting an account means deactivating it; nothing is hard-deleted and
//! `activate` undoes it.

use chrono::{DateTime, Utc};
use clap::Subcommand;

use ridgeline_client::{AdminClient, NewUser, UserUpdate};
use ridgeline_core::{PermissionLevelId, UserId, UserRole};

#[derive(Subcommand)]
pub enum UserAction {
    /// List all accounts
    List,
    /// Create an account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`user`, `admin`, `super_admin`)
        #[arg(short, long, default_value = "user")]
        role: UserRole,

        /// Permission level to assign
        #[arg(long)]
        level: Option<PermissionLevelId>,

        /// Access expiry (RFC 3339 timestamp)
        #[arg(long)]
        expires: Option<DateTime<Utc>>,
    },
    /// Show one account
    Show {
        /// Account id
        id: UserId,
    },
    /// Edit an account (absent flags stay unchanged)
    Update {
        /// Account id
        id: UserId,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New role (`user`, `admin`, `super_admin`)
        #[arg(short, long)]
        role: Option<UserRole>,

        /// Assign a permission level
        #[arg(long, conflicts_with = "clear_level")]
        level: Option<PermissionLevelId>,

        /// Clear the permission level assignment
        #[arg(long)]
        clear_level: bool,

        /// New access expiry (RFC 3339 timestamp)
        #[arg(long)]
        expires: Option<DateTime<Utc>>,
    },
    /// Deactivate an account (reversible with `activate`)
    Deactivate {
        /// Account id
        id: UserId,
    },
    /// Reactivate a deactivated account
    Activate {
        /// Account id
        id: UserId,
    },
}

pub async fn run(
    client: &AdminClient,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::List => list(client).await?,
        UserAction::Create {
            email,
            name,
            role,
            level,
            expires,
        } => {
            let user = client
                .create_user(&NewUser {
                    email,
                    full_name: name,
                    role,
                    permission_level_id: level,
                    expires_at: expires,
                })
                .await?;
            tracing::info!("Created {} ({})", user.email, user.id);
            list(client).await?;
        }
        UserAction::Show { id } => {
            let user = client.user(id).await?;
            tracing::info!(
                "{} <{}> role={} active={} level={} expires={}",
                user.full_name,
                user.email,
                user.role,
                user.is_active,
                user.permission_level_id
                    .map_or_else(|| "-".to_string(), |l| l.to_string()),
                user.expires_at
                    .map_or_else(|| "-".to_string(), |e| e.to_rfc3339()),
            );
        }
        UserAction::Update {
            id,
            name,
            role,
            level,
            clear_level,
            expires,
        } => {
            let permission_level_id = if clear_level {
                Some(None)
            } else {
                level.map(Some)
            };
            client
                .update_user(
                    id,
                    &UserUpdate {
                        full_name: name,
                        role,
                        permission_level_id,
                        expires_at: expires.map(Some),
                    },
                )
                .await?;
            tracing::info!("Updated {id}");
            list(client).await?;
        }
        UserAction::Deactivate { id } => {
            client.deactivate_user(id).await?;
            tracing::info!("Deactivated {id}");
            list(client).await?;
        }
        UserAction::Activate { id } => {
            let user = client.activate_user(id).await?;
            tracing::info!("Reactivated {} ({})", user.email, user.id);
            list(client).await?;
        }
    }
    Ok(())
}

/// Fetch and print the account list (the post-mutation refetch).
async fn list(client: &AdminClient) -> Result<(), ridgeline_client::ClientError> {
    let users = client.users().await?;
    tracing::info!("{} account(s)", users.len());
    for user in users {
        tracing::info!(
            "  {} {} <{}> role={} active={}",
            user.id,
            user.full_name,
            user.email,
            user.role,
            user.is_active
        );
    }
    Ok(())
}
