//! Access request review commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;

use ridgeline_client::{AccessRequestReview, AdminClient};
use ridgeline_core::{AccessRequestId, AccessRequestStatus};

#[derive(Subcommand)]
pub enum RequestAction {
    /// List the review queue
    List {
        /// Filter by status (`pending`, `approved`, `denied`)
        #[arg(long)]
        status: Option<AccessRequestStatus>,
    },
    /// Show one request
    Show {
        /// Request id
        id: AccessRequestId,
    },
    /// Review a request: set status, notes, expiry
    Review {
        /// Request id
        id: AccessRequestId,

        /// New status (`pending`, `approved`, `denied`)
        #[arg(long)]
        status: Option<AccessRequestStatus>,

        /// Reviewer notes
        #[arg(long)]
        notes: Option<String>,

        /// Access expiry for the eventual account (RFC 3339 timestamp)
        #[arg(long)]
        expires: Option<DateTime<Utc>>,
    },
}

pub async fn run(
    client: &AdminClient,
    action: RequestAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RequestAction::List { status } => list(client, status).await?,
        RequestAction::Show { id } => {
            let request = client.access_request(id).await?;
            tracing::info!(
                "{} <{}> {} status={} notes={}",
                request.full_name,
                request.email,
                request.company,
                request.status,
                request.admin_notes.as_deref().unwrap_or("-"),
            );
            if let Some(message) = &request.message {
                tracing::info!("  message: {message}");
            }
        }
        RequestAction::Review {
            id,
            status,
            notes,
            expires,
        } => {
            let request = client
                .review_access_request(
                    id,
                    &AccessRequestReview {
                        status,
                        admin_notes: notes,
                        expires_at: expires,
                    },
                )
                .await?;
            tracing::info!("Reviewed {}: now {}", request.id, request.status);
            list(client, None).await?;
        }
    }
    Ok(())
}

/// Fetch and print the queue (the post-mutation refetch).
async fn list(
    client: &AdminClient,
    status: Option<AccessRequestStatus>,
) -> Result<(), ridgeline_client::ClientError> {
    let requests = client.access_requests(status).await?;
    tracing::info!("{} request(s)", requests.len());
    for request in requests {
        tracing::info!(
            "  {} {} <{}> {} status={}",
            request.id,
            request.full_name,
            request.email,
            request.company,
            request.status
        );
    }
    Ok(())
}
