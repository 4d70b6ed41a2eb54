//! # Repo Module
//!
//! The candidate's profile ("Repo"): confirmed skills, experiences,
//! qualifications and job preferences, plus onboarding and the local
//! knowledge graph built from them.

pub mod graph;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::repo_routes;
