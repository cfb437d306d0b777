//! Scheduled saved-search check.
//!
//! Runs every saved search against listings first seen since its last
//! check (or since it was created, on the first run) and records the match
//! count. A search whose query fails is logged and skipped: its checkpoint
//! stays put so the next run covers the same window again, and the rest of
//! the batch still runs.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use nihontowatch_core::types::DbId;
use nihontowatch_db::matcher::try_count_matching_listings;
use nihontowatch_db::repositories::SavedSearchRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::cron::RequireCronSecret;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SearchCheck {
    pub saved_search_id: DbId,
    pub new_matches: i64,
}

#[derive(Debug, Serialize)]
pub struct CronReport {
    pub checked: usize,
    pub with_matches: usize,
    pub failed: usize,
    pub results: Vec<SearchCheck>,
}

/// POST /cron/saved-searches/run
pub async fn check_saved_searches(
    _cron: RequireCronSecret,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let searches = SavedSearchRepo::list_all(&state.pool).await?;
    let floor = state.config.min_price_floor();
    let rates = &state.config.exchange_rates;

    let mut results = Vec::with_capacity(searches.len());
    let mut failed = 0;
    for search in &searches {
        let checked_at = Utc::now();
        // Never-checked searches only count listings that appeared after they were saved.
        let since = search.last_checked_at.unwrap_or(search.created_at);
        let new_matches = match try_count_matching_listings(
            &state.pool,
            &search.criteria,
            Some(since),
            floor,
            rates,
        )
        .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(saved_search_id = search.id, error = %e, "Saved search check failed");
                failed += 1;
                continue;
            }
        };
        let stored = i32::try_from(new_matches).unwrap_or(i32::MAX);
        if let Err(e) =
            SavedSearchRepo::mark_checked(&state.pool, search.id, checked_at, stored).await
        {
            tracing::error!(saved_search_id = search.id, error = %e, "Failed to record saved search check");
            failed += 1;
            continue;
        }
        results.push(SearchCheck {
            saved_search_id: search.id,
            new_matches,
        });
    }

    let with_matches = results.iter().filter(|r| r.new_matches > 0).count();
    tracing::info!(checked = results.len(), with_matches, failed, "Saved search check complete");

    Ok(Json(DataResponse {
        data: CronReport {
            checked: results.len(),
            with_matches,
            failed,
            results,
        },
    }))
}
