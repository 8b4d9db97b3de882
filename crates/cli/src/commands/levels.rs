//! Permission level commands.
//!
//! Level deletion is destructive (and refused server-side while users still
//! reference the level), so it sits behind `--yes` like document deletion.

use clap::Subcommand;

use ridgeline_client::{AdminClient, PermissionLevelForm};
use ridgeline_core::PermissionLevelId;

use super::CliError;

#[derive(Subcommand)]
pub enum LevelAction {
    /// List all levels
    List,
    /// Create a level
    Create {
        /// Level name
        #[arg(short, long)]
        name: String,

        /// Description
        #[arg(short, long)]
        description: String,

        /// Allow opening documents in the viewer
        #[arg(long)]
        can_view: bool,

        /// Allow downloading document files
        #[arg(long)]
        can_download: bool,

        /// Stamp an access expiry when the level is assigned
        #[arg(long)]
        has_expiry: bool,

        /// Lifetime download cap per user
        #[arg(long)]
        max_downloads: Option<u32>,
    },
    /// Replace a level's fields
    Update {
        /// Level id
        id: PermissionLevelId,

        /// Level name
        #[arg(short, long)]
        name: String,

        /// Description
        #[arg(short, long)]
        description: String,

        /// Allow opening documents in the viewer
        #[arg(long)]
        can_view: bool,

        /// Allow downloading document files
        #[arg(long)]
        can_download: bool,

        /// Stamp an access expiry when the level is assigned
        #[arg(long)]
        has_expiry: bool,

        /// Lifetime download cap per user
        #[arg(long)]
        max_downloads: Option<u32>,
    },
    /// Destroy a level (irreversible)
    Delete {
        /// Level id
        id: PermissionLevelId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(
    client: &AdminClient,
    action: LevelAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LevelAction::List => list(client).await?,
        LevelAction::Create {
            name,
            description,
            can_view,
            can_download,
            has_expiry,
            max_downloads,
        } => {
            let level = client
                .create_permission_level(&PermissionLevelForm {
                    name,
                    description,
                    can_view,
                    can_download,
                    has_expiry,
                    max_downloads,
                })
                .await?;
            tracing::info!("Created level {} ({})", level.name, level.id);
            list(client).await?;
        }
        LevelAction::Update {
            id,
            name,
            description,
            can_view,
            can_download,
            has_expiry,
            max_downloads,
        } => {
            client
                .update_permission_level(
                    id,
                    &PermissionLevelForm {
                        name,
                        description,
                        can_view,
                        can_download,
                        has_expiry,
                        max_downloads,
                    },
                )
                .await?;
            tracing::info!("Updated {id}");
            list(client).await?;
        }
        LevelAction::Delete { id, yes } => {
            if !yes {
                return Err(CliError::Unconfirmed("Deleting a permission level").into());
            }
            client.delete_permission_level(id).await?;
            tracing::info!("Deleted {id}");
            list(client).await?;
        }
    }
    Ok(())
}

/// Fetch and print the level list (the post-mutation refetch).
async fn list(client: &AdminClient) -> Result<(), ridgeline_client::ClientError> {
    let levels = client.permission_levels().await?;
    tracing::info!("{} level(s)", levels.len());
    for level in levels {
        tracing::info!(
            "  {} {} view={} download={} expiry={} cap={}",
            level.id,
            level.name,
            level.can_view,
            level.can_download,
            level.has_expiry,
            level
                .max_downloads
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
        );
    }
    Ok(())
}
