use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::favorites;
use crate::state::AppState;

/// Mounted at `/favorites`.
///
/// ```text
/// GET    /                -> list_favorites
/// POST   /                -> add_favorite
/// DELETE /{listing_id}    -> remove_favorite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::list_favorites).post(favorites::add_favorite))
        .route("/{listing_id}", delete(favorites::remove_favorite))
}
