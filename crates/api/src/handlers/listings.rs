//! Handler for a single listing.

use axum::extract::{Path, State};
use axum::Json;
use nihontowatch_core::cert::CertInfo;
use nihontowatch_core::types::DbId;
use nihontowatch_db::models::dealer::Dealer;
use nihontowatch_db::models::listing::Listing;
use nihontowatch_db::repositories::{DealerRepo, ListingRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::browse::ListingCard;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub cert: Option<CertInfo>,
    pub dealer: Option<Dealer>,
}

// ---------------------------------------------------------------------------
// GET /listings/{id}
// ---------------------------------------------------------------------------

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ListingDetail>>> {
    let listing = ListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing", id))?;
    let dealer = DealerRepo::find_by_id(&state.pool, listing.dealer_id).await?;
    let card = ListingCard::new(listing, &state);

    Ok(Json(DataResponse {
        data: ListingDetail {
            listing: card.listing,
            cert: card.cert,
            dealer,
        },
    }))
}
