use axum::routing::post;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Mounted at `/cron`; guarded by the cron shared secret.
///
/// ```text
/// POST /saved-searches/run  -> check_saved_searches
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/saved-searches/run", post(cron::check_saved_searches))
}
