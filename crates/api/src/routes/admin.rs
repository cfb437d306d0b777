//! Admin-only routes, mounted at `/admin`. Every handler takes the
//! `RequireAdmin` extractor.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{admin, analytics};
use crate::state::AppState;

/// ```text
/// PATCH /listings/{id}/cert       -> fix_cert
/// PATCH /listings/{id}/artisan    -> fix_artisan
/// PATCH /listings/{id}/status     -> fix_status
/// GET   /analytics/dealers        -> dealer_analytics
/// GET   /analytics/visitors       -> visitor_analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/listings/{id}/cert", patch(admin::fix_cert))
        .route("/listings/{id}/artisan", patch(admin::fix_artisan))
        .route("/listings/{id}/status", patch(admin::fix_status))
        .route("/analytics/dealers", get(analytics::dealer_analytics))
        .route("/analytics/visitors", get(analytics::visitor_analytics))
}
