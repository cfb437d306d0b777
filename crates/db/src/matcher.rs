//! Saved-search matcher: run a criteria against the listings table.
//!
//! [`resolve_listing_filter`] is the database half of the core planner and
//! is shared with the browse route. The two matcher entry points log query
//! failures and degrade to "no matches" so a single bad search cannot abort
//! a batch run; callers that must surface errors use the `try_` variants.

use nihontowatch_core::criteria::SavedSearchCriteria;
use nihontowatch_core::currency::ExchangeRates;
use nihontowatch_core::filter::{plan_listing_query, ListingFilter, MatchOptions, Resolutions};
use nihontowatch_core::types::Timestamp;
use nihontowatch_core::url_state::{SortOrder, UrlState};
use sqlx::PgPool;

use crate::filter_sql::render_filter;
use crate::models::listing::Listing;
use crate::repositories::{ArtisanRepo, CertVariantRepo, ListingRepo};

/// Plan a filter for `state` and resolve its certification and artisan
/// lookups against the database.
pub async fn resolve_listing_filter(
    pool: &PgPool,
    state: &UrlState,
    options: &MatchOptions,
    rates: &ExchangeRates,
) -> Result<ListingFilter, sqlx::Error> {
    let plan = plan_listing_query(state, options, rates);
    let lookups = plan.lookups();

    let resolutions = Resolutions {
        cert_variants: CertVariantRepo::variants_for(pool, &lookups.certifications).await?,
        artisan_codes: ArtisanRepo::codes_for_words(pool, &lookups.artisan_words).await?,
    };

    tracing::debug!(
        certs = lookups.certifications.len(),
        artisan_words = lookups.artisan_words.len(),
        resolved_words = resolutions.artisan_codes.len(),
        "Resolved listing filter lookups"
    );

    Ok(plan.resolve(&resolutions))
}

fn options(since: Option<Timestamp>, min_price_jpy: Option<f64>) -> MatchOptions {
    MatchOptions {
        since,
        min_price_jpy,
    }
}

/// Listings matching a saved search, newest first.
pub async fn try_find_matching_listings(
    pool: &PgPool,
    criteria: &SavedSearchCriteria,
    since: Option<Timestamp>,
    limit: Option<i64>,
    min_price_jpy: Option<f64>,
    rates: &ExchangeRates,
) -> Result<Vec<Listing>, sqlx::Error> {
    let state = criteria.to_url_state();
    let filter = resolve_listing_filter(pool, &state, &options(since, min_price_jpy), rates).await?;
    let clause = render_filter(&filter);
    ListingRepo::find_filtered(pool, &clause, SortOrder::Recent, limit, 0).await
}

/// Number of listings matching a saved search.
pub async fn try_count_matching_listings(
    pool: &PgPool,
    criteria: &SavedSearchCriteria,
    since: Option<Timestamp>,
    min_price_jpy: Option<f64>,
    rates: &ExchangeRates,
) -> Result<i64, sqlx::Error> {
    let state = criteria.to_url_state();
    let filter = resolve_listing_filter(pool, &state, &options(since, min_price_jpy), rates).await?;
    let clause = render_filter(&filter);
    ListingRepo::count_filtered(pool, &clause).await
}

/// As [`try_find_matching_listings`], but a query failure is logged and
/// yields an empty list.
pub async fn find_matching_listings(
    pool: &PgPool,
    criteria: &SavedSearchCriteria,
    since: Option<Timestamp>,
    limit: Option<i64>,
    min_price_jpy: Option<f64>,
    rates: &ExchangeRates,
) -> Vec<Listing> {
    match try_find_matching_listings(pool, criteria, since, limit, min_price_jpy, rates).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Saved search match query failed");
            Vec::new()
        }
    }
}

/// As [`try_count_matching_listings`], but a query failure is logged and
/// yields zero.
pub async fn count_matching_listings(
    pool: &PgPool,
    criteria: &SavedSearchCriteria,
    since: Option<Timestamp>,
    min_price_jpy: Option<f64>,
    rates: &ExchangeRates,
) -> i64 {
    match try_count_matching_listings(pool, criteria, since, min_price_jpy, rates).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Saved search count query failed");
            0
        }
    }
}
