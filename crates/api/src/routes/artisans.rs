use axum::routing::get;
use axum::Router;

use crate::handlers::artisans;
use crate::state::AppState;

/// Mounted at `/artisans`.
///
/// ```text
/// GET /search   -> search_artisans
/// GET /{code}   -> get_artisan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(artisans::search_artisans))
        .route("/{code}", get(artisans::get_artisan))
}
