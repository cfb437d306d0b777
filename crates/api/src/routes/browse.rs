//! Public listing routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::{browse, listings};
use crate::state::AppState;

/// Mounted at `/browse`.
///
/// ```text
/// GET /  -> browse
/// ```
pub fn browse_router() -> Router<AppState> {
    Router::new().route("/", get(browse::browse))
}

/// Mounted at `/listings`.
///
/// ```text
/// GET /{id}  -> get_listing
/// ```
pub fn listings_router() -> Router<AppState> {
    Router::new().route("/{id}", get(listings::get_listing))
}
