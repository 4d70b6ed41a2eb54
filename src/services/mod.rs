// src/services/mod.rs
//
// Outbound HTTP clients shared by the domain modules

pub mod enrichment;
pub mod gateway;
pub mod serper;

pub use enrichment::EnrichmentClient;
pub use gateway::{GatewayClient, GatewayError, JsonPrompt};
pub use serper::SerperClient;
