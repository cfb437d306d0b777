pub mod activity;
pub mod admin;
pub mod artisans;
pub mod browse;
pub mod cron;
pub mod favorites;
pub mod health;
pub mod inquiry;
pub mod saved_searches;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /browse                                 browse listings by URL state (public)
/// /listings/{id}                          listing detail (public)
///
/// /artisans/search                        artisan directory search (public)
/// /artisans/{code}                        artisan detail (public)
///
/// /activity                               activity beacon (optional auth)
///
/// /saved-searches                         list, create (auth required)
/// /saved-searches/{id}                    get, update, delete (owner only)
/// /saved-searches/{id}/matches            matching listings (owner only)
/// /saved-searches/{id}/count              match count (owner only)
///
/// /favorites                              list, add (auth required)
/// /favorites/{listing_id}                 remove (auth required)
///
/// /inquiry/draft                          draft a dealer email (auth required)
///
/// /admin/listings/{id}/cert               correct certification (admin only)
/// /admin/listings/{id}/artisan            correct artisan (admin only)
/// /admin/listings/{id}/status             override status (admin only)
/// /admin/analytics/dealers                dealer engagement (admin only)
/// /admin/analytics/visitors               visitor summary (admin only)
///
/// /cron/saved-searches/run                scheduled saved-search check (cron secret)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/browse", browse::browse_router())
        .nest("/listings", browse::listings_router())
        .nest("/artisans", artisans::router())
        .nest("/activity", activity::router())
        .nest("/saved-searches", saved_searches::router())
        .nest("/favorites", favorites::router())
        .nest("/inquiry", inquiry::router())
        .nest("/admin", admin::router())
        .nest("/cron", cron::router())
}
