//! Outbound HTTP clients.

pub mod geo;
pub mod llm;
