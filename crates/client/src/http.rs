//! Shared HTTP transport for the portal and admin clients.
//!
//! One place attaches the bearer token, classifies failures into
//! [`ClientError`] and clears the stored token when the backend answers 401.
//! There is no retry and no backoff; apart from the best-effort warm-up ping
//! every call rides the platform default timeout.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{ClientError, Result};
use crate::token::{TokenKey, TokenStore};

/// How long the best-effort warm-up ping waits before giving up.
const WARM_UP_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("ridgeline-client/", env!("CARGO_PKG_VERSION"));

/// Token-aware transport shared by both client surfaces.
#[derive(Clone)]
pub(crate) struct Http {
    client: reqwest::Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
    key: TokenKey,
}

impl Http {
    pub(crate) fn new(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        key: TokenKey,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Validation(format!("Invalid base URL: {e}")))?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            store,
            key,
        })
    }

    /// The stored bearer token, if any.
    pub(crate) fn token(&self) -> Result<Option<String>> {
        self.store.load(self.key)
    }

    /// Persist a fresh bearer token.
    pub(crate) fn save_token(&self, token: &str) -> Result<()> {
        self.store.save(self.key, token)
    }

    /// Drop the stored token.
    pub(crate) fn clear_token(&self) -> Result<()> {
        self.store.clear(self.key)
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Validation(format!("Invalid request path {path}: {e}")))
    }

    /// Build a request with the bearer token attached when present.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut builder = self.client.request(method, self.url(path)?);
        if let Some(token) = self.token()? {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Fire a JSON request and decode a JSON response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Fire a request and discard the (possibly empty) response body.
    pub(crate) async fn send_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<()> {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await?;
        Ok(())
    }

    /// Fire a request and return the raw response bytes (document fetches).
    pub(crate) async fn send_bytes(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        let builder = self.request(method, path)?;
        let response = self.execute(builder).await?;
        Ok(response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?
            .to_vec())
    }

    /// Fire a prepared builder (multipart uploads) and decode JSON.
    pub(crate) async fn send_builder<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Execute, classify transport failures, and turn non-2xx into
    /// [`ClientError::Api`]. A 401 clears the stored token as a side effect.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            // The session is dead either way; a failed clear should not mask
            // the 401 the caller needs to see.
            if let Err(e) = self.clear_token() {
                tracing::warn!(error = %e, "failed to clear token after 401");
            }
        }

        let body: Option<Value> = response.bytes().await.ok().and_then(|bytes| {
            if bytes.is_empty() {
                None
            } else {
                serde_json::from_slice(&bytes).ok()
            }
        });
        Err(ClientError::from_response(status.as_u16(), body))
    }

    /// Best-effort warm-up ping against `/health` with a 5-second timeout.
    ///
    /// Demo backends cold-start; firing this early means the first real call
    /// does not eat the spin-up. Never fails the caller.
    pub(crate) async fn warm_up(&self) -> bool {
        let Ok(url) = self.url("/health") else {
            return false;
        };
        let ping = self.client.get(url).send();
        match tokio::time::timeout(WARM_UP_TIMEOUT, ping).await {
            Ok(Ok(response)) => response.status().is_success(),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "warm-up ping failed");
                false
            }
            Err(_) => {
                tracing::debug!("warm-up ping timed out");
                false
            }
        }
    }
}

impl std::fmt::Debug for Http {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Http")
            .field("base_url", &self.base_url.as_str())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
