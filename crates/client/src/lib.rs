//! Ridgeline Client - Rust SDK for the investor data room API.
//!
//! Two client surfaces mirror the portal's two front doors:
//!
//! - [`PortalClient`] - investor flows: OTP login, NDA acceptance, the
//!   document room, access requests and Q&A.
//! - [`AdminClient`] - the admin console API: admin auth, user management,
//!   document upload, permission levels, access-request review.
//!
//! Tokens persist through a [`TokenStore`] under distinct keys per surface,
//! so one store can hold both sessions without them colliding. [`Session`]
//! layers the explicit auth/NDA state machine from `ridgeline-core` on top
//! of [`PortalClient`] for callers that want gating and redirects rather
//! than raw calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ridgeline_client::{MemoryTokenStore, PortalClient, Session};
//!
//! # async fn example() -> Result<(), ridgeline_client::ClientError> {
//! let client = PortalClient::new(
//!     "https://dataroom.example.com",
//!     Arc::new(MemoryTokenStore::new()),
//! )?;
//! let mut session = Session::new(client);
//!
//! session.request_code("lp@fund.com").await?;
//! // ... the code arrives by email ...
//! session.sign_in("lp@fund.com", "123456").await?;
//! session.accept_nda("Limited Partner", true).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod admin;
mod error;
mod http;
mod ip;
mod portal;
mod session;
mod token;
mod types;

pub use admin::AdminClient;
pub use error::{ClientError, Result};
pub use ip::{UNKNOWN_IP, resolve_public_ip};
pub use portal::PortalClient;
pub use session::Session;
pub use token::{FileTokenStore, MemoryTokenStore, TokenKey, TokenStore};
pub use types::{
    AccessRequestForm, AccessRequestReview, AdminRegistration, CategoryForm, DirectUrl,
    DocumentFilter, DocumentUpload, MessageResponse, NewUser, OtpRequested, PermissionLevelForm,
    QuestionForm, TokenResponse, UserUpdate,
};
