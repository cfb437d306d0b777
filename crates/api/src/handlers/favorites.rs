//! Handlers for a user's favorites.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_core::types::DbId;
use nihontowatch_db::models::favorite::CreateFavorite;
use nihontowatch_db::repositories::{FavoriteRepo, ListingRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::browse::ListingCard;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /favorites -- favorited listings, most recent first.
pub async fn list_favorites(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let listings = ListingRepo::find_favorited_by(&state.pool, auth.user_id).await?;
    let cards: Vec<ListingCard> = listings
        .into_iter()
        .map(|l| ListingCard::new(l, &state))
        .collect();
    Ok(Json(DataResponse { data: cards }))
}

/// POST /favorites -- idempotent.
pub async fn add_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFavorite>,
) -> AppResult<impl IntoResponse> {
    if ListingRepo::find_by_id(&state.pool, input.listing_id).await?.is_none() {
        return Err(AppError::not_found("Listing", input.listing_id));
    }
    let favorite = FavoriteRepo::add(&state.pool, auth.user_id, input.listing_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: favorite })))
}

/// DELETE /favorites/{listing_id}
pub async fn remove_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if FavoriteRepo::remove(&state.pool, auth.user_id, listing_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Favorite", listing_id))
    }
}
