//! Portal services.

pub mod auth;
pub mod mailer;

pub use auth::AuthService;
pub use mailer::{EmailService, Mailer};
