//! Handlers for saved searches.
//!
//! All routes require a session; a saved search is only visible to its
//! owner. The `matches` and `count` routes run the saved-search matcher
//! with the configured price floor.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_core::criteria::criteria_errors;
use nihontowatch_core::types::{DbId, Timestamp};
use nihontowatch_db::matcher::{count_matching_listings, find_matching_listings};
use nihontowatch_db::models::saved_search::{CreateSavedSearch, SavedSearch, UpdateSavedSearch};
use nihontowatch_db::repositories::SavedSearchRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::browse::ListingCard;
use crate::middleware::auth::AuthUser;
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

pub const MAX_NAME_LEN: usize = 100;
const DEFAULT_MATCH_LIMIT: i64 = 50;
const MAX_MATCH_LIMIT: i64 = 200;

fn name_errors(name: &str) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        vec!["name is required".to_string()]
    } else if name.chars().count() > MAX_NAME_LEN {
        vec![format!("name must be at most {MAX_NAME_LEN} characters")]
    } else {
        Vec::new()
    }
}

/// Load a saved search and check ownership: 404 when absent, 403 when it
/// belongs to someone else.
async fn load_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<SavedSearch> {
    let search = SavedSearchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("SavedSearch", id))?;
    if search.user_id != auth.user_id {
        return Err(AppError::forbidden("You can only access your own saved searches"));
    }
    Ok(search)
}

// ---------------------------------------------------------------------------
// GET /saved-searches
// ---------------------------------------------------------------------------

pub async fn list_saved_searches(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let searches = SavedSearchRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: searches }))
}

// ---------------------------------------------------------------------------
// POST /saved-searches
// ---------------------------------------------------------------------------

pub async fn create_saved_search(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSavedSearch>,
) -> AppResult<impl IntoResponse> {
    let mut errors = name_errors(&input.name);
    errors.extend(criteria_errors(&input.criteria));
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let search = SavedSearchRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        saved_search_id = search.id,
        user_id = %auth.user_id,
        "Saved search created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: search })))
}

// ---------------------------------------------------------------------------
// GET /saved-searches/{id}
// ---------------------------------------------------------------------------

pub async fn get_saved_search(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let search = load_owned(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: search }))
}

// ---------------------------------------------------------------------------
// PATCH /saved-searches/{id}
// ---------------------------------------------------------------------------

pub async fn update_saved_search(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSavedSearch>,
) -> AppResult<impl IntoResponse> {
    load_owned(&state, &auth, id).await?;

    let mut errors = Vec::new();
    if let Some(name) = &input.name {
        errors.extend(name_errors(name));
    }
    if let Some(criteria) = &input.criteria {
        errors.extend(criteria_errors(criteria));
    }
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let search = SavedSearchRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("SavedSearch", id))?;
    Ok(Json(DataResponse { data: search }))
}

// ---------------------------------------------------------------------------
// DELETE /saved-searches/{id}
// ---------------------------------------------------------------------------

pub async fn delete_saved_search(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state, &auth, id).await?;
    SavedSearchRepo::delete(&state.pool, id).await?;
    tracing::info!(saved_search_id = id, user_id = %auth.user_id, "Saved search deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /saved-searches/{id}/matches, /count
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MatchParams {
    /// Only listings first seen at or after this instant (RFC 3339).
    pub since: Option<Timestamp>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MatchCount {
    pub count: i64,
}

pub async fn saved_search_matches(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<MatchParams>,
) -> AppResult<impl IntoResponse> {
    let search = load_owned(&state, &auth, id).await?;
    let limit = clamp_limit(params.limit, DEFAULT_MATCH_LIMIT, MAX_MATCH_LIMIT);

    let rows = find_matching_listings(
        &state.pool,
        &search.criteria,
        params.since,
        Some(limit),
        state.config.min_price_floor(),
        &state.config.exchange_rates,
    )
    .await;

    let cards: Vec<ListingCard> = rows.into_iter().map(|l| ListingCard::new(l, &state)).collect();
    Ok(Json(DataResponse { data: cards }))
}

pub async fn saved_search_count(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<MatchParams>,
) -> AppResult<impl IntoResponse> {
    let search = load_owned(&state, &auth, id).await?;
    let count = count_matching_listings(
        &state.pool,
        &search.criteria,
        params.since,
        state.config.min_price_floor(),
        &state.config.exchange_rates,
    )
    .await;
    Ok(Json(DataResponse {
        data: MatchCount { count },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert_eq!(name_errors("  "), vec!["name is required"]);
        assert!(name_errors("Juyo katana").is_empty());
        assert_eq!(name_errors(&"x".repeat(MAX_NAME_LEN + 1)).len(), 1);
    }
}
