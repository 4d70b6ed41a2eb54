//! # Auth Module
//!
//! This module handles admin authentication:
//! - HS256 JWT validation against the shared secret
//! - Admin allow-listing via `ADMIN_EMAILS`
//! - AdminUser extractor for protected routes, with the dev-mode bypass

pub mod extractors;
pub mod models;

#[cfg(test)]
mod tests;

pub use extractors::AdminUser;
pub use models::{issue_token, Claims};
