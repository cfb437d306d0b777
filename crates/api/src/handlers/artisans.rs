//! Handlers for the artisan directory.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_core::error::CoreError;
use nihontowatch_core::text::normalize_search_text;
use nihontowatch_db::models::artisan::ArtisanEntry;
use nihontowatch_db::repositories::{ArtisanRepo, ListingRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Deserialize)]
pub struct ArtisanSearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ArtisanDetail {
    #[serde(flatten)]
    pub artisan: ArtisanEntry,
    pub available_listings: i64,
}

/// GET /artisans/search?q= -- prefix match on name or code.
pub async fn search_artisans(
    State(state): State<AppState>,
    Query(params): Query<ArtisanSearchParams>,
) -> AppResult<impl IntoResponse> {
    let q = normalize_search_text(&params.q);
    if q.chars().count() < MIN_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "q must be at least {MIN_QUERY_LEN} characters"
        )));
    }
    let limit = clamp_limit(params.limit, 20, 50);
    let entries = ArtisanRepo::search(&state.pool, &q, limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /artisans/{code}
pub async fn get_artisan(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let artisan = ArtisanRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Artisan",
                key: code.clone(),
            })
        })?;
    let available_listings = ListingRepo::count_available_by_artisan(&state.pool, &artisan.code).await?;
    Ok(Json(DataResponse {
        data: ArtisanDetail {
            artisan,
            available_listings,
        },
    }))
}
