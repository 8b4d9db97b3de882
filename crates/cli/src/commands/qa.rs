//! Q&A commands.

use clap::Subcommand;

use ridgeline_client::AdminClient;
use ridgeline_core::{QaStatus, QaThreadId};

#[derive(Subcommand)]
pub enum QaAction {
    /// List all threads
    List {
        /// Only show unanswered questions
        #[arg(long)]
        pending: bool,
    },
    /// Answer a question (or re-edit an existing answer)
    Answer {
        /// Thread id
        id: QaThreadId,

        /// Answer text
        #[arg(short, long)]
        answer: String,
    },
}

pub async fn run(
    client: &AdminClient,
    action: QaAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QaAction::List { pending } => list(client, pending).await?,
        QaAction::Answer { id, answer } => {
            let thread = client.answer_question(id, &answer).await?;
            tracing::info!("Answered {}", thread.id);
            list(client, false).await?;
        }
    }
    Ok(())
}

/// Fetch and print threads (the post-mutation refetch).
async fn list(client: &AdminClient, pending_only: bool) -> Result<(), ridgeline_client::ClientError> {
    let threads = client.qa_threads().await?;
    let threads: Vec<_> = threads
        .into_iter()
        .filter(|t| !pending_only || t.status == QaStatus::Pending)
        .collect();
    tracing::info!("{} thread(s)", threads.len());
    for thread in threads {
        let flags = match (thread.is_urgent, thread.is_public) {
            (true, true) => " [urgent, public]",
            (true, false) => " [urgent]",
            (false, true) => " [public]",
            (false, false) => "",
        };
        tracing::info!("  {} {:?}{} {}", thread.id, thread.status, flags, thread.question);
        if let Some(answer) = &thread.answer {
            tracing::info!("    answer: {answer}");
        }
    }
    Ok(())
}
