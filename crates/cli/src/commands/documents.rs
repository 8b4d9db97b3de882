//! Document room commands.
//!
//! Deletion is irreversible, so it is gated behind `--yes`; declining makes
//! no network call at all.

use std::path::PathBuf;

use clap::Subcommand;

use ridgeline_client::{AdminClient, CategoryForm, DocumentUpload};
use ridgeline_core::{CategoryId, DocumentId};

use super::CliError;

#[derive(Subcommand)]
pub enum DocumentAction {
    /// List folders
    Categories {
        /// Scope to a parent folder
        #[arg(long)]
        parent: Option<CategoryId>,
    },
    /// Create a folder
    Mkdir {
        /// Folder name
        #[arg(short, long)]
        name: String,

        /// Parent folder
        #[arg(long)]
        parent: Option<CategoryId>,

        /// Sort order within the parent
        #[arg(long, default_value_t = 0)]
        sort: i32,
    },
    /// Upload a document
    Upload {
        /// Document title
        #[arg(short, long)]
        title: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Target folder
        #[arg(short, long)]
        category: CategoryId,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// File to upload
        #[arg(short, long)]
        file: PathBuf,

        /// MIME type of the file
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },
    /// Destroy a document (irreversible)
    Delete {
        /// Document id
        id: DocumentId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Per-document audit trail
    Logs {
        /// Document id
        id: DocumentId,
    },
    /// Recent activity across all documents
    Activity {
        /// Maximum entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub async fn run(
    client: &AdminClient,
    action: DocumentAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DocumentAction::Categories { parent } => {
            let categories = client.categories(parent).await?;
            tracing::info!("{} folder(s)", categories.len());
            for category in categories {
                tracing::info!("  {} {} (sort {})", category.id, category.name, category.sort_order);
            }
        }
        DocumentAction::Mkdir { name, parent, sort } => {
            let category = client
                .create_category(&CategoryForm {
                    name,
                    parent_id: parent,
                    sort_order: sort,
                })
                .await?;
            tracing::info!("Created folder {} ({})", category.name, category.id);
        }
        DocumentAction::Upload {
            title,
            description,
            category,
            tags,
            file,
            content_type,
        } => {
            let bytes = std::fs::read(&file).map_err(|source| CliError::FileRead {
                path: file.display().to_string(),
                source,
            })?;
            let file_name = file
                .file_name()
                .map_or_else(|| "upload.bin".to_string(), |n| n.to_string_lossy().into_owned());

            let document = client
                .upload_document(DocumentUpload {
                    title,
                    description,
                    category_id: category,
                    tags: tags
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_owned)
                        .collect(),
                    file_name,
                    content_type,
                    bytes,
                })
                .await?;
            tracing::info!(
                "Uploaded {} ({}, {} bytes)",
                document.title,
                document.id,
                document.size_bytes
            );
        }
        DocumentAction::Delete { id, yes } => {
            if !yes {
                return Err(CliError::Unconfirmed("Deleting a document").into());
            }
            client.delete_document(id).await?;
            tracing::info!("Deleted {id}");
        }
        DocumentAction::Logs { id } => {
            let entries = client.document_access_logs(id).await?;
            tracing::info!("{} access log entrie(s) for {id}", entries.len());
            for entry in entries {
                tracing::info!(
                    "  {} user={} {:?}",
                    entry.occurred_at.to_rfc3339(),
                    entry.user_id,
                    entry.action
                );
            }
        }
        DocumentAction::Activity { limit } => {
            let entries = client.activity_logs(limit).await?;
            tracing::info!("{} recent event(s)", entries.len());
            for entry in entries {
                tracing::info!(
                    "  {} document={} user={} {:?}",
                    entry.occurred_at.to_rfc3339(),
                    entry.document_id,
                    entry.user_id,
                    entry.action
                );
            }
        }
    }
    Ok(())
}
