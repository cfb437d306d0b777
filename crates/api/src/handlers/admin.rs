//! Admin corrections to scraped listing data.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_core::cert::cert_info_for;
use nihontowatch_core::types::DbId;
use nihontowatch_db::models::listing::{UpdateListingArtisan, UpdateListingCert, UpdateListingStatus};
use nihontowatch_db::repositories::{ArtisanRepo, ListingRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::browse::ListingCard;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const STATUSES: &[&str] = &["available", "sold", "presumed_sold", "reserved", "withdrawn"];

// ---------------------------------------------------------------------------
// PATCH /admin/listings/{id}/cert
// ---------------------------------------------------------------------------

pub async fn fix_cert(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateListingCert>,
) -> AppResult<impl IntoResponse> {
    // Store the canonical tier key, whatever spelling was submitted.
    if let Some(raw) = input.cert_type.as_deref() {
        let info = cert_info_for(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown certification: {raw}")))?;
        input.cert_type = Some(info.tier.to_string());
    }

    let listing = ListingRepo::update_cert(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Listing", id))?;

    tracing::info!(admin = %admin.user_id, listing_id = id, cert = ?input.cert_type, "Listing cert corrected");
    Ok(Json(DataResponse {
        data: ListingCard::new(listing, &state),
    }))
}

// ---------------------------------------------------------------------------
// PATCH /admin/listings/{id}/artisan
// ---------------------------------------------------------------------------

pub async fn fix_artisan(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateListingArtisan>,
) -> AppResult<impl IntoResponse> {
    if let Some(code) = input.artisan_id.as_deref() {
        let entry = ArtisanRepo::find_by_code(&state.pool, code)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown artisan code: {code}")))?;
        input.artisan_id = Some(entry.code);
    } else {
        input.artisan_confidence = None;
        input.verified = false;
    }

    let listing = ListingRepo::update_artisan(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Listing", id))?;

    tracing::info!(
        admin = %admin.user_id,
        listing_id = id,
        artisan = ?input.artisan_id,
        verified = input.verified,
        "Listing artisan corrected"
    );
    Ok(Json(DataResponse {
        data: ListingCard::new(listing, &state),
    }))
}

// ---------------------------------------------------------------------------
// PATCH /admin/listings/{id}/status
// ---------------------------------------------------------------------------

pub async fn fix_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateListingStatus>,
) -> AppResult<impl IntoResponse> {
    input.status = input.status.trim().to_lowercase();
    if !STATUSES.contains(&input.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "status must be one of: {}",
            STATUSES.join(", ")
        )));
    }

    let listing = ListingRepo::update_status(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Listing", id))?;

    tracing::info!(admin = %admin.user_id, listing_id = id, status = %input.status, "Listing status overridden");
    Ok(Json(DataResponse {
        data: ListingCard::new(listing, &state),
    }))
}
