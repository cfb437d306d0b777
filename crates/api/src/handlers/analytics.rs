//! Admin analytics: dealer engagement and visitor summaries.
//!
//! Aggregation happens in `nihontowatch_core::analytics`; these handlers
//! only fetch rows and shape the response.

use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use nihontowatch_core::analytics::{
    merge_dealer_stats, summarize_visitors, tally_by, DealerRef, DealerStats, DwellTotal,
    TallyEntry, VisitorSummary, DEFAULT_TOP_N,
};
use nihontowatch_core::geo::{select_lookup_ips, UNKNOWN_COUNTRY};
use nihontowatch_core::types::Timestamp;
use nihontowatch_db::repositories::{ActivityRepo, DealerRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    pub days: Option<i64>,
    /// Resolve visitor IPs to countries (slow; rate limited upstream).
    #[serde(default)]
    pub geo: bool,
}

impl WindowParams {
    fn window_start(&self, now: Timestamp) -> Timestamp {
        now - Duration::days(clamp_limit(self.days, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS))
    }
}

#[derive(Debug, Serialize)]
pub struct DealerAnalytics {
    pub from: Timestamp,
    pub to: Timestamp,
    pub dealers: Vec<DealerStats>,
}

#[derive(Debug, Serialize)]
pub struct VisitorAnalytics {
    pub from: Timestamp,
    pub to: Timestamp,
    #[serde(flatten)]
    pub summary: VisitorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<TallyEntry>>,
}

// ---------------------------------------------------------------------------
// GET /admin/analytics/dealers
// ---------------------------------------------------------------------------

pub async fn dealer_analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> AppResult<impl IntoResponse> {
    let to = Utc::now();
    let from = params.window_start(to);

    let (dealers, clicks, dwell) = tokio::try_join!(
        DealerRepo::list_active(&state.pool),
        ActivityRepo::dealer_click_counts(&state.pool, from),
        ActivityRepo::dealer_dwell_totals(&state.pool, from),
    )?;

    let dealers: Vec<DealerRef> = dealers
        .into_iter()
        .map(|d| DealerRef {
            id: d.id,
            name: d.name,
            domain: d.domain,
        })
        .collect();
    let clicks: Vec<(i64, i64)> = clicks.iter().map(|c| (c.dealer_id, c.clicks)).collect();
    let dwell: Vec<DwellTotal> = dwell
        .iter()
        .map(|d| DwellTotal {
            dealer_id: d.dealer_id,
            total_ms: d.total_ms,
            samples: d.samples,
        })
        .collect();

    Ok(Json(DataResponse {
        data: DealerAnalytics {
            from,
            to,
            dealers: merge_dealer_stats(&dealers, &clicks, &dwell),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /admin/analytics/visitors
// ---------------------------------------------------------------------------

pub async fn visitor_analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> AppResult<impl IntoResponse> {
    let to = Utc::now();
    let from = params.window_start(to);

    let events = ActivityRepo::list_between(&state.pool, from, to).await?;
    let facts: Vec<_> = events.iter().map(|e| e.facts()).collect();
    let summary = summarize_visitors(&facts, DEFAULT_TOP_N);

    let countries = if params.geo {
        // One country per visitor, taken from their first event with an IP.
        let mut seen = HashSet::new();
        let visitor_ips: Vec<String> = events
            .iter()
            .filter_map(|e| Some((e.visitor_id.as_deref()?, e.ip_address.as_deref()?)))
            .filter(|(visitor, _)| seen.insert(*visitor))
            .map(|(_, ip)| ip.to_string())
            .collect();
        // Bounded so the provider quota spacing cannot stall the request.
        let unique = select_lookup_ips(&visitor_ips);
        let resolved = state.geo.lookup_countries(&unique).await;
        let mut tally = tally_by(&visitor_ips, |ip| {
            Some(
                resolved
                    .get(ip.trim())
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            )
        });
        tally.truncate(DEFAULT_TOP_N);
        Some(tally)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: VisitorAnalytics {
            from,
            to,
            summary,
            countries,
        },
    }))
}
