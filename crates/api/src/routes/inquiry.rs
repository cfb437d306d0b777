use axum::routing::post;
use axum::Router;

use crate::handlers::inquiry;
use crate::state::AppState;

/// Mounted at `/inquiry`.
///
/// ```text
/// POST /draft  -> draft_inquiry
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/draft", post(inquiry::draft_inquiry))
}
