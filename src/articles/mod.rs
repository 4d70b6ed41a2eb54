//! # Articles Module
//!
//! Read access to published articles and the admin job that assigns each
//! uncategorized article a C-suite category.

pub mod classifier;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use classifier::ArticleClassifier;
pub use routes::articles_routes;
