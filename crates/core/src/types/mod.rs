//! Core types for Ridgeline.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the wire-level entity records shared between the portal and the SDK.

pub mod access_request;
pub mod document;
pub mod email;
pub mod id;
pub mod nda;
pub mod permission;
pub mod qa;
pub mod role;
pub mod status;
pub mod user;

pub use access_request::AccessRequest;
pub use document::{AccessLogEntry, Document, DocumentCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use nda::{NdaAcceptance, NdaContent, NdaStatus};
pub use permission::PermissionLevel;
pub use qa::QaThread;
pub use role::UserRole;
pub use status::*;
pub use user::User;
