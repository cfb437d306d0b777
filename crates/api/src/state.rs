use std::sync::Arc;

use crate::clients::geo::GeoClient;
use crate::clients::llm::LlmClient;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nihontowatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// IP geolocation client for visitor analytics.
    pub geo: Arc<GeoClient>,
    /// Chat completion client for inquiry drafts.
    pub llm: Arc<LlmClient>,
}
