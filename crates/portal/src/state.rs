//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::services::{EmailService, Mailer};
use crate::store::MemoryStore;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the store and the outgoing mail channel.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    store: MemoryStore,
    mailer: Mailer,
}

impl AppState {
    /// Create application state with a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured SMTP relay is invalid.
    pub fn new(config: PortalConfig) -> Result<Self, StateError> {
        let mailer = match &config.email {
            Some(email_config) => Mailer::Smtp(EmailService::new(email_config)?),
            None => {
                tracing::warn!("SMTP not configured; running in demo mode (OTP codes are logged)");
                Mailer::Log
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store: MemoryStore::new(),
                mailer,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.inner.store
    }

    /// Get a reference to the outgoing mail channel.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }
}
