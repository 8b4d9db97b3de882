//! CLI command implementations, one module per subcommand group.

pub mod auth;
pub mod documents;
pub mod levels;
pub mod qa;
pub mod requests;
pub mod users;

/// Resolve a password from an explicit flag or `RIDGELINE_ADMIN_PASSWORD`.
pub(crate) fn password_from(flag: Option<String>) -> Result<String, CliError> {
    flag.or_else(|| std::env::var("RIDGELINE_ADMIN_PASSWORD").ok())
        .ok_or(CliError::MissingPassword)
}

/// CLI-level errors (everything else surfaces as `ClientError`).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No password flag and no `RIDGELINE_ADMIN_PASSWORD` in the environment.
    #[error("Provide --password or set RIDGELINE_ADMIN_PASSWORD")]
    MissingPassword,

    /// Refusal to run a destructive command without `--yes`.
    #[error("{0} is irreversible; re-run with --yes to confirm")]
    Unconfirmed(&'static str),

    /// A file argument could not be read.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
