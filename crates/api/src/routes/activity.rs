use axum::routing::post;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Mounted at `/activity`.
///
/// ```text
/// POST /  -> record_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(activity::record_activity))
}
