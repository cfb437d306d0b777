//! Route definitions for saved searches, mounted at `/saved-searches`.

use axum::routing::get;
use axum::Router;

use crate::handlers::saved_searches;
use crate::state::AppState;

/// ```text
/// GET    /               -> list_saved_searches
/// POST   /               -> create_saved_search
/// GET    /{id}           -> get_saved_search
/// PATCH  /{id}           -> update_saved_search
/// DELETE /{id}           -> delete_saved_search
/// GET    /{id}/matches   -> saved_search_matches
/// GET    /{id}/count     -> saved_search_count
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(saved_searches::list_saved_searches).post(saved_searches::create_saved_search),
        )
        .route(
            "/{id}",
            get(saved_searches::get_saved_search)
                .patch(saved_searches::update_saved_search)
                .delete(saved_searches::delete_saved_search),
        )
        .route("/{id}/matches", get(saved_searches::saved_search_matches))
        .route("/{id}/count", get(saved_searches::saved_search_count))
}
