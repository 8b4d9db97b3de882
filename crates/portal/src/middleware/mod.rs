//! Request middleware and extractors.

pub mod auth;
pub mod rate_limit;

pub use auth::{BearerToken, RequireAdmin, RequireNda, RequireSuperAdmin, RequireUser};
pub use rate_limit::auth_rate_limiter;
