//! Handler for client activity beacons.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_db::models::activity::{CreateActivityEvent, EVENT_TYPES};
use nihontowatch_db::repositories::ActivityRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_PATH_LEN: usize = 2048;
/// Dwell samples above this are discarded as idle tabs.
const MAX_DWELL_MS: i64 = 30 * 60 * 1000;

#[derive(Debug, Serialize)]
pub struct Recorded {
    pub id: i64,
}

/// Client IP from the proxy headers, first hop only.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

fn validate_event(input: &CreateActivityEvent) -> Vec<String> {
    let mut errors = Vec::new();
    if !EVENT_TYPES.contains(&input.event_type.as_str()) {
        errors.push(format!(
            "event_type must be one of: {}",
            EVENT_TYPES.join(", ")
        ));
    }
    if input.path.as_ref().is_some_and(|p| p.len() > MAX_PATH_LEN) {
        errors.push(format!("path must be at most {MAX_PATH_LEN} bytes"));
    }
    if let Some(dwell) = input.dwell_ms {
        if !(0..=MAX_DWELL_MS).contains(&dwell) {
            errors.push(format!("dwell_ms must be between 0 and {MAX_DWELL_MS}"));
        }
    }
    if input.event_type == "dealer_click" && input.dealer_id.is_none() {
        errors.push("dealer_click requires dealer_id".to_string());
    }
    errors
}

/// POST /activity -- anonymous or signed in.
pub async fn record_activity(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateActivityEvent>,
) -> AppResult<impl IntoResponse> {
    let errors = validate_event(&input);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let ip = client_ip(&headers);
    let event = ActivityRepo::insert(
        &state.pool,
        &input,
        user.map(|u| u.user_id),
        ip.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Recorded { id: event.id },
        }),
    ))
}
