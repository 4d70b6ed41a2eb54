//! # Companies Module
//!
//! This module handles employer company recognition:
//! - Name normalization and domain extraction
//! - The validation cascade (database, AI knowledge, web search, ask the user)
//! - Saving user-confirmed companies and triggering enrichment

pub mod handlers;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod services;
pub mod validation;
pub mod validators;


pub use routes::companies_routes;
pub use validation::{CompanyKnowledge, CompanySearch, CompanyValidator};
