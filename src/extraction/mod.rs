//! # Extraction Module
//!
//! Facts pulled out of candidate conversations wait here as pending items
//! until the candidate confirms, edits or rejects them. Confirmed items are
//! promoted into the Repo tables.

pub mod extractor;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use extractor::ProfileExtractor;
pub use routes::extraction_routes;
