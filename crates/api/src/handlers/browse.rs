//! Handlers for the public browse view.
//!
//! The query string is the browse URL state (`tab`, `cat`, `cert`, `q`, ...)
//! plus `page` / `limit`. Filtering goes through the same planner and SQL
//! renderer as the saved-search matcher; unlike the matcher, failures here
//! surface as errors.

use axum::extract::{Query, RawQuery, State};
use axum::Json;
use nihontowatch_core::cert::{get_validated_cert_info, CertInfo};
use nihontowatch_core::filter::MatchOptions;
use nihontowatch_core::semantic::{extract_semantic_filters, ExtractedFilters};
use nihontowatch_core::url_state::{parse_query_string, to_query_string, UrlState};
use nihontowatch_db::filter_sql::render_filter;
use nihontowatch_db::matcher::resolve_listing_filter;
use nihontowatch_db::models::listing::Listing;
use nihontowatch_db::repositories::ListingRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::PageParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// A listing plus its display certification (implausible tiers removed).
#[derive(Debug, Serialize)]
pub struct ListingCard {
    #[serde(flatten)]
    pub listing: Listing,
    pub cert: Option<CertInfo>,
}

impl ListingCard {
    pub fn new(listing: Listing, state: &AppState) -> Self {
        let cert = get_validated_cert_info(
            listing.cert_type.as_deref(),
            &listing.title,
            listing.price_value,
            listing.price_currency.as_deref(),
            &state.config.exchange_rates,
        );
        Self { listing, cert }
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    #[serde(flatten)]
    pub page: Page<ListingCard>,
    /// Canonical query string for the applied state (for URL sync).
    pub query: String,
    /// Facets the free-text query was interpreted as.
    pub interpreted: ExtractedFilters,
}

// ---------------------------------------------------------------------------
// GET /browse
// ---------------------------------------------------------------------------

pub async fn browse(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(paging): Query<PageParams>,
) -> AppResult<Json<DataResponse<BrowseResponse>>> {
    let url_state: UrlState = parse_query_string(raw.as_deref().unwrap_or(""));
    let rates = &state.config.exchange_rates;

    let interpreted = url_state
        .search_query
        .as_deref()
        .map(extract_semantic_filters)
        .unwrap_or_default()
        .extracted_filters;

    let filter =
        resolve_listing_filter(&state.pool, &url_state, &MatchOptions::default(), rates).await?;
    let clause = render_filter(&filter);

    let (limit, offset) = (paging.limit(), paging.offset());
    let (rows, total) = tokio::try_join!(
        ListingRepo::find_filtered(&state.pool, &clause, url_state.sort, Some(limit), offset),
        ListingRepo::count_filtered(&state.pool, &clause),
    )?;

    tracing::debug!(
        total,
        returned = rows.len(),
        predicates = filter.predicates.len(),
        "Browse query"
    );

    let items = rows.into_iter().map(|l| ListingCard::new(l, &state)).collect();

    Ok(Json(DataResponse {
        data: BrowseResponse {
            page: Page {
                items,
                total,
                page: paging.page(),
                limit,
            },
            query: to_query_string(&url_state),
            interpreted,
        },
    }))
}
