//! Handler for AI-drafted dealer inquiry emails.
//!
//! The model call is best-effort: when the endpoint is unset or fails, the
//! response carries a fill-in template with `generated: false`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use nihontowatch_core::cert::get_validated_cert_info;
use nihontowatch_core::inquiry::{
    build_inquiry_prompt, placeholder_draft, validate_inquiry, EmailDraft, InquiryInput,
    InquiryListingContext,
};
use nihontowatch_db::models::listing::Listing;
use nihontowatch_db::repositories::{DealerRepo, ListingRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    #[serde(flatten)]
    pub draft: EmailDraft,
    /// `false` when the draft is the fallback template.
    pub generated: bool,
}

fn price_display(listing: &Listing) -> Option<String> {
    let value = listing.price_value?;
    let currency = listing.price_currency.as_deref().unwrap_or("JPY");
    Some(format!("{currency} {value:.0}"))
}

/// POST /inquiry/draft
pub async fn draft_inquiry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<InquiryInput>,
) -> AppResult<impl IntoResponse> {
    let errors = validate_inquiry(&input);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let listing = ListingRepo::find_by_id(&state.pool, input.listing_id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing", input.listing_id))?;
    let dealer = DealerRepo::find_by_id(&state.pool, listing.dealer_id).await?;

    let cert_label = get_validated_cert_info(
        listing.cert_type.as_deref(),
        &listing.title,
        listing.price_value,
        listing.price_currency.as_deref(),
        &state.config.exchange_rates,
    )
    .map(|c| c.label.to_string());

    let context = InquiryListingContext {
        title: listing.title.clone(),
        url: listing.url.clone(),
        dealer_name: dealer.map(|d| d.name).unwrap_or_else(|| "Dealer".to_string()),
        price_display: price_display(&listing),
        cert_label,
        artisan: listing.smith.clone().or_else(|| listing.tosogu_maker.clone()),
    };

    let prompt = build_inquiry_prompt(&input, &context);
    let (draft, generated) = match state.llm.draft_email(&prompt).await {
        Ok(draft) => (draft, true),
        Err(e) => {
            tracing::warn!(
                user_id = %auth.user_id,
                listing_id = listing.id,
                error = %e,
                "Inquiry draft generation failed; returning template"
            );
            (placeholder_draft(&input, &context), false)
        }
    };

    Ok(Json(DataResponse {
        data: DraftResponse { draft, generated },
    }))
}
