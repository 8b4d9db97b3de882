//! In-memory store.
//!
//! Plain maps behind one `RwLock`. Critical sections are short and never
//! held across an await point; handlers clone what they need out of the
//! guard before doing anything slow.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};

use ridgeline_core::{
    AccessLogEntry, AccessRequest, AccessRequestId, AccessRequestStatus, CategoryId, Document,
    DocumentAction, DocumentCategory, DocumentId, Email, NdaAcceptance, NdaContent, NdaId,
    PermissionLevel, PermissionLevelId, QaThread, QaThreadId, User, UserId,
};

use super::{DocumentRecord, OtpChallenge, OtpKey, SessionRecord, StoreError, UserRecord};

/// NDA text served when no custom NDA has been seeded.
const DEFAULT_NDA_VERSION: &str = "1.0";
const DEFAULT_NDA_CONTENT: &str = "\
This Non-Disclosure Agreement (\"Agreement\") governs access to the materials \
made available in this data room. By accepting below you agree to hold all \
materials in strict confidence, to use them solely for evaluating a potential \
investment, and not to reproduce or distribute them without prior written \
consent.";

/// The in-memory backend. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    users: HashMap<UserId, UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    otps: HashMap<OtpKey, OtpChallenge>,
    nda: NdaContent,
    acceptances: Vec<NdaAcceptance>,
    levels: HashMap<PermissionLevelId, PermissionLevel>,
    access_requests: HashMap<AccessRequestId, AccessRequest>,
    categories: HashMap<CategoryId, DocumentCategory>,
    documents: HashMap<DocumentId, DocumentRecord>,
    access_logs: Vec<AccessLogEntry>,
    qa: HashMap<QaThreadId, QaThread>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store seeded with the default NDA.
    #[must_use]
    pub fn new() -> Self {
        Self::with_nda(NdaContent {
            nda_id: NdaId::generate(),
            version: DEFAULT_NDA_VERSION.to_string(),
            content: DEFAULT_NDA_CONTENT.to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        })
    }

    /// Create an empty store serving the given NDA.
    #[must_use]
    pub fn with_nda(nda: NdaContent) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                users: HashMap::new(),
                sessions: HashMap::new(),
                otps: HashMap::new(),
                nda,
                acceptances: Vec::new(),
                levels: HashMap::new(),
                access_requests: HashMap::new(),
                categories: HashMap::new(),
                documents: HashMap::new(),
                access_logs: Vec::new(),
                qa: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user. Emails are unique.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    pub fn insert_user(&self, record: UserRecord) -> Result<User, StoreError> {
        let mut inner = self.write()?;
        if inner
            .users
            .values()
            .any(|r| r.user.email == record.user.email)
        {
            return Err(StoreError::Conflict(format!(
                "a user with email {} already exists",
                record.user.email
            )));
        }
        let user = record.user.clone();
        inner.users.insert(user.id, record);
        Ok(user)
    }

    /// Fetch a user record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    pub fn user(&self, id: UserId) -> Result<UserRecord, StoreError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    /// Fetch a user record by email, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn user_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|r| &r.user.email == email)
            .cloned())
    }

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.read()?.users.values().map(|r| r.user.clone()).collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    /// Replace a user's wire record, preserving the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist, or
    /// `StoreError::Conflict` if the new email collides with another user.
    pub fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.write()?;
        if inner
            .users
            .values()
            .any(|r| r.user.email == user.email && r.user.id != user.id)
        {
            return Err(StoreError::Conflict(format!(
                "a user with email {} already exists",
                user.email
            )));
        }
        let record = inner
            .users
            .get_mut(&user.id)
            .ok_or(StoreError::NotFound("user"))?;
        record.user = user.clone();
        Ok(user)
    }

    /// Set or replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    pub fn set_password_hash(&self, id: UserId, hash: String) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let record = inner.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        record.password_hash = Some(hash);
        Ok(())
    }

    /// Number of admin/super-admin accounts, used for first-admin bootstrap.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn admin_count(&self) -> Result<usize, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|r| r.user.role.is_admin())
            .count())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Register a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        self.write()?
            .sessions
            .insert(session.token.clone(), session);
        Ok(())
    }

    /// Resolve a token to its session, dropping it if expired.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn session(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        let now = Utc::now();
        let mut inner = self.write()?;
        match inner.sessions.get(token) {
            Some(session) if session.is_expired(now) => {
                inner.sessions.remove(token);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    /// Destroy a session. Returns whether a live session was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn remove_session(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.write()?.sessions.remove(token).is_some())
    }

    // =========================================================================
    // OTP challenges
    // =========================================================================

    /// Store a challenge, replacing any live one for the same email+purpose.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn set_otp(&self, key: OtpKey, challenge: OtpChallenge) -> Result<(), StoreError> {
        self.write()?.otps.insert(key, challenge);
        Ok(())
    }

    /// Fetch the live challenge for an email+purpose, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn otp(&self, key: &OtpKey) -> Result<Option<OtpChallenge>, StoreError> {
        Ok(self.read()?.otps.get(key).cloned())
    }

    /// Drop a challenge (on success, expiry, or attempt exhaustion).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn remove_otp(&self, key: &OtpKey) -> Result<(), StoreError> {
        self.write()?.otps.remove(key);
        Ok(())
    }

    /// Record a failed attempt; returns the updated attempt count.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no challenge is live for the key.
    pub fn bump_otp_attempts(&self, key: &OtpKey) -> Result<u8, StoreError> {
        let mut inner = self.write()?;
        let challenge = inner
            .otps
            .get_mut(key)
            .ok_or(StoreError::NotFound("otp challenge"))?;
        challenge.attempts = challenge.attempts.saturating_add(1);
        Ok(challenge.attempts)
    }

    // =========================================================================
    // NDA
    // =========================================================================

    /// The currently effective NDA.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn nda(&self) -> Result<NdaContent, StoreError> {
        Ok(self.read()?.nda.clone())
    }

    /// The acceptance record for a user and NDA version, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn acceptance(
        &self,
        user_id: UserId,
        version: &str,
    ) -> Result<Option<NdaAcceptance>, StoreError> {
        Ok(self
            .read()?
            .acceptances
            .iter()
            .find(|a| a.user_id == user_id && a.version == version)
            .cloned())
    }

    /// Record an acceptance. Acceptances are per-user-per-version and
    /// immutable afterward.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the user already accepted this
    /// version.
    pub fn insert_acceptance(&self, acceptance: NdaAcceptance) -> Result<NdaAcceptance, StoreError> {
        let mut inner = self.write()?;
        if inner
            .acceptances
            .iter()
            .any(|a| a.user_id == acceptance.user_id && a.version == acceptance.version)
        {
            return Err(StoreError::Conflict(format!(
                "NDA version {} already accepted",
                acceptance.version
            )));
        }
        inner.acceptances.push(acceptance.clone());
        Ok(acceptance)
    }

    // =========================================================================
    // Permission levels
    // =========================================================================

    /// Insert a permission level. Names are unique.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name is taken.
    pub fn insert_level(&self, level: PermissionLevel) -> Result<PermissionLevel, StoreError> {
        let mut inner = self.write()?;
        if inner.levels.values().any(|l| l.name == level.name) {
            return Err(StoreError::Conflict(format!(
                "a permission level named {} already exists",
                level.name
            )));
        }
        inner.levels.insert(level.id, level.clone());
        Ok(level)
    }

    /// Fetch a permission level.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn level(&self, id: PermissionLevelId) -> Result<PermissionLevel, StoreError> {
        self.read()?
            .levels
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("permission level"))
    }

    /// All permission levels, by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn list_levels(&self) -> Result<Vec<PermissionLevel>, StoreError> {
        let mut levels: Vec<PermissionLevel> = self.read()?.levels.values().cloned().collect();
        levels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(levels)
    }

    /// Replace a permission level.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist, or
    /// `StoreError::Conflict` on a name collision.
    pub fn update_level(&self, level: PermissionLevel) -> Result<PermissionLevel, StoreError> {
        let mut inner = self.write()?;
        if inner
            .levels
            .values()
            .any(|l| l.name == level.name && l.id != level.id)
        {
            return Err(StoreError::Conflict(format!(
                "a permission level named {} already exists",
                level.name
            )));
        }
        if !inner.levels.contains_key(&level.id) {
            return Err(StoreError::NotFound("permission level"));
        }
        inner.levels.insert(level.id, level.clone());
        Ok(level)
    }

    /// Delete a permission level.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` while any user references the level,
    /// `StoreError::NotFound` if it does not exist.
    pub fn delete_level(&self, id: PermissionLevelId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let referenced = inner
            .users
            .values()
            .filter(|r| r.user.permission_level_id == Some(id))
            .count();
        if referenced > 0 {
            return Err(StoreError::Conflict(format!(
                "permission level is assigned to {referenced} user(s)"
            )));
        }
        inner
            .levels
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("permission level"))
    }

    // =========================================================================
    // Access requests
    // =========================================================================

    /// Record a new access request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn insert_access_request(&self, request: AccessRequest) -> Result<AccessRequest, StoreError> {
        self.write()?.access_requests.insert(request.id, request.clone());
        Ok(request)
    }

    /// Fetch an access request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn access_request(&self, id: AccessRequestId) -> Result<AccessRequest, StoreError> {
        self.read()?
            .access_requests
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("access request"))
    }

    /// Access requests, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn list_access_requests(
        &self,
        status: Option<AccessRequestStatus>,
    ) -> Result<Vec<AccessRequest>, StoreError> {
        let mut requests: Vec<AccessRequest> = self
            .read()?
            .access_requests
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Replace an access request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn update_access_request(&self, request: AccessRequest) -> Result<AccessRequest, StoreError> {
        let mut inner = self.write()?;
        if !inner.access_requests.contains_key(&request.id) {
            return Err(StoreError::NotFound("access request"));
        }
        inner.access_requests.insert(request.id, request.clone());
        Ok(request)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if `parent_id` names a missing category.
    pub fn insert_category(&self, category: DocumentCategory) -> Result<DocumentCategory, StoreError> {
        let mut inner = self.write()?;
        if let Some(parent) = category.parent_id
            && !inner.categories.contains_key(&parent)
        {
            return Err(StoreError::NotFound("parent category"));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Fetch a category.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn category(&self, id: CategoryId) -> Result<DocumentCategory, StoreError> {
        self.read()?
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("category"))
    }

    /// Categories under the given parent (`None` lists top-level folders),
    /// ordered by sort order then name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn list_categories(
        &self,
        parent_id: Option<CategoryId>,
    ) -> Result<Vec<DocumentCategory>, StoreError> {
        let mut categories: Vec<DocumentCategory> = self
            .read()?
            .categories
            .values()
            .filter(|c| c.parent_id == parent_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(categories)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Insert a document (metadata + bytes).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the category does not exist.
    pub fn insert_document(&self, record: DocumentRecord) -> Result<Document, StoreError> {
        let mut inner = self.write()?;
        if !inner.categories.contains_key(&record.document.category_id) {
            return Err(StoreError::NotFound("category"));
        }
        let document = record.document.clone();
        inner.documents.insert(document.id, record);
        Ok(document)
    }

    /// Fetch document metadata.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn document(&self, id: DocumentId) -> Result<Document, StoreError> {
        self.read()?
            .documents
            .get(&id)
            .map(|r| r.document.clone())
            .ok_or(StoreError::NotFound("document"))
    }

    /// Fetch document metadata together with the file bytes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn document_bytes(&self, id: DocumentId) -> Result<(Document, Vec<u8>), StoreError> {
        self.read()?
            .documents
            .get(&id)
            .map(|r| (r.document.clone(), r.bytes.clone()))
            .ok_or(StoreError::NotFound("document"))
    }

    /// Destroy a document. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn delete_document(&self, id: DocumentId) -> Result<(), StoreError> {
        self.write()?
            .documents
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("document"))
    }

    /// Documents in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn documents_in_category(&self, category_id: CategoryId) -> Result<Vec<Document>, StoreError> {
        let mut documents: Vec<Document> = self
            .read()?
            .documents
            .values()
            .filter(|r| r.document.category_id == category_id)
            .map(|r| r.document.clone())
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    // =========================================================================
    // Access log
    // =========================================================================

    /// Append a view/download event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn append_access(&self, entry: AccessLogEntry) -> Result<(), StoreError> {
        self.write()?.access_logs.push(entry);
        Ok(())
    }

    /// Access log for one document, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn access_logs_for(&self, document_id: DocumentId) -> Result<Vec<AccessLogEntry>, StoreError> {
        let mut entries: Vec<AccessLogEntry> = self
            .read()?
            .access_logs
            .iter()
            .filter(|e| e.document_id == document_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(entries)
    }

    /// The most recent `limit` events across all documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn recent_access_logs(&self, limit: usize) -> Result<Vec<AccessLogEntry>, StoreError> {
        let mut entries: Vec<AccessLogEntry> = self.read()?.access_logs.clone();
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Lifetime download count for a user, for `max_downloads` enforcement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn download_count(&self, user_id: UserId) -> Result<usize, StoreError> {
        Ok(self
            .read()?
            .access_logs
            .iter()
            .filter(|e| e.user_id == user_id && e.action == DocumentAction::Download)
            .count())
    }

    // =========================================================================
    // Q&A
    // =========================================================================

    /// Insert a new thread.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn insert_thread(&self, thread: QaThread) -> Result<QaThread, StoreError> {
        self.write()?.qa.insert(thread.id, thread.clone());
        Ok(thread)
    }

    /// Fetch a thread.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn thread(&self, id: QaThreadId) -> Result<QaThread, StoreError> {
        self.read()?
            .qa
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("question"))
    }

    /// Replace a thread.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    pub fn update_thread(&self, thread: QaThread) -> Result<QaThread, StoreError> {
        let mut inner = self.write()?;
        if !inner.qa.contains_key(&thread.id) {
            return Err(StoreError::NotFound("question"));
        }
        inner.qa.insert(thread.id, thread.clone());
        Ok(thread)
    }

    /// All threads, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` only on lock poisoning.
    pub fn list_threads(&self) -> Result<Vec<QaThread>, StoreError> {
        let mut threads: Vec<QaThread> = self.read()?.qa.values().cloned().collect();
        threads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(threads)
    }
}
