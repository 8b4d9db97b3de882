//! Ridgeline Core - Shared types library.
//!
//! This crate provides common types used across all Ridgeline components:
//! - `portal` - The data room HTTP service
//! - `client` - Rust SDK for the portal and admin APIs
//! - `cli` - Command-line admin console
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere, including inside the
//! portal's request handlers and the SDK's response decoding.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, statuses and wire-level entities
//! - [`auth`] - The explicit auth/NDA gating state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod types;

pub use auth::{AuthEvent, AuthState, Gate, RouteClass};
pub use types::*;
