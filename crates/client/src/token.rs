//! Bearer token persistence.
//!
//! The investor and admin surfaces hold separate sessions, so tokens are
//! stored under distinct keys and signing into one never clobbers the other.
//! [`FileTokenStore`] persists tokens between CLI invocations;
//! [`MemoryTokenStore`] backs tests and short-lived processes.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClientError, Result};

/// Which session a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    /// Investor-facing session (OTP login).
    Investor,
    /// Admin console session (password login).
    Admin,
}

impl TokenKey {
    /// Storage key string, also used as the file name in [`FileTokenStore`].
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Investor => "ridgeline_token",
            Self::Admin => "ridgeline_admin_token",
        }
    }
}

/// Token persistence boundary.
///
/// Absence of a token is a valid state (anonymous), so loads return
/// `Option`. Implementations must be safe to share across clones of a
/// client.
pub trait TokenStore: Send + Sync {
    /// The stored token for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the backing storage fails.
    fn load(&self, key: TokenKey) -> Result<Option<String>>;

    /// Store (or replace) the token for a key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the backing storage fails.
    fn save(&self, key: TokenKey, token: &str) -> Result<()>;

    /// Drop the token for a key. Clearing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the backing storage fails.
    fn clear(&self, key: TokenKey) -> Result<()>;
}

/// In-process token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKey, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: TokenKey) -> Result<Option<String>> {
        Ok(self
            .tokens
            .read()
            .map_err(|_| ClientError::TokenStore("lock poisoned".to_string()))?
            .get(&key)
            .cloned())
    }

    fn save(&self, key: TokenKey, token: &str) -> Result<()> {
        self.tokens
            .write()
            .map_err(|_| ClientError::TokenStore("lock poisoned".to_string()))?
            .insert(key, token.to_string());
        Ok(())
    }

    fn clear(&self, key: TokenKey) -> Result<()> {
        self.tokens
            .write()
            .map_err(|_| ClientError::TokenStore("lock poisoned".to_string()))?
            .remove(&key);
        Ok(())
    }
}

/// File-backed token store: one file per key under a directory.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| ClientError::TokenStore(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path(&self, key: TokenKey) -> PathBuf {
        self.dir.join(key.storage_key())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: TokenKey) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(token) => {
                let token = token.trim().to_string();
                Ok(if token.is_empty() { None } else { Some(token) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }

    fn save(&self, key: TokenKey, token: &str) -> Result<()> {
        fs::write(self.path(key), token).map_err(|e| ClientError::TokenStore(e.to_string()))
    }

    fn clear(&self, key: TokenKey) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_keys_are_independent() {
        let store = MemoryTokenStore::new();
        store.save(TokenKey::Investor, "investor-token").unwrap();
        store.save(TokenKey::Admin, "admin-token").unwrap();

        assert_eq!(
            store.load(TokenKey::Investor).unwrap().as_deref(),
            Some("investor-token")
        );
        assert_eq!(
            store.load(TokenKey::Admin).unwrap().as_deref(),
            Some("admin-token")
        );

        store.clear(TokenKey::Investor).unwrap();
        assert!(store.load(TokenKey::Investor).unwrap().is_none());
        assert!(store.load(TokenKey::Admin).unwrap().is_some());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        assert!(store.load(TokenKey::Investor).unwrap().is_none());
        store.save(TokenKey::Investor, "tok-123").unwrap();
        assert_eq!(
            store.load(TokenKey::Investor).unwrap().as_deref(),
            Some("tok-123")
        );

        // Clearing twice is fine.
        store.clear(TokenKey::Investor).unwrap();
        store.clear(TokenKey::Investor).unwrap();
        assert!(store.load(TokenKey::Investor).unwrap().is_none());
    }

    #[test]
    fn test_file_store_distinct_keys_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();
        store.save(TokenKey::Investor, "a").unwrap();
        store.save(TokenKey::Admin, "b").unwrap();

        assert!(dir.path().join("ridgeline_token").exists());
        assert!(dir.path().join("ridgeline_admin_token").exists());
    }
}
