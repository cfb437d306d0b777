//! In-process tallying for the admin analytics views.
//!
//! The routes fetch raw rows (activity events, dealer click and dwell
//! aggregates) and hand them here; nothing in this module touches storage.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::DbId;

/// Default number of entries kept in each "top N" list.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub key: String,
    pub count: u64,
}

/// Count items by key, descending by count then ascending by key.
/// Items whose key function returns `None` are skipped.
pub fn tally_by<T, F>(items: &[T], key: F) -> Vec<TallyEntry>
where
    F: Fn(&T) -> Option<String>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for item in items {
        if let Some(k) = key(item) {
            *counts.entry(k).or_default() += 1;
        }
    }
    let mut entries: Vec<TallyEntry> = counts
        .into_iter()
        .map(|(key, count)| TallyEntry { key, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries
}

// ---------------------------------------------------------------------------
// Visitors
// ---------------------------------------------------------------------------

/// The columns of an activity event the visitor summary reads.
#[derive(Debug, Clone)]
pub struct ActivityFacts<'a> {
    pub visitor_id: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub event_type: &'a str,
    pub path: Option<&'a str>,
    pub listing_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisitorSummary {
    pub total_events: u64,
    pub unique_visitors: u64,
    pub unique_sessions: u64,
    pub events_by_type: Vec<TallyEntry>,
    pub top_paths: Vec<TallyEntry>,
    pub top_listings: Vec<TallyEntry>,
}

pub fn summarize_visitors(events: &[ActivityFacts<'_>], top_n: usize) -> VisitorSummary {
    let visitors: HashSet<&str> = events.iter().filter_map(|e| e.visitor_id).collect();
    let sessions: HashSet<&str> = events.iter().filter_map(|e| e.session_id).collect();

    let mut top_paths = tally_by(events, |e| e.path.map(str::to_string));
    top_paths.truncate(top_n);
    let mut top_listings = tally_by(events, |e| e.listing_id.map(|id| id.to_string()));
    top_listings.truncate(top_n);

    VisitorSummary {
        total_events: events.len() as u64,
        unique_visitors: visitors.len() as u64,
        unique_sessions: sessions.len() as u64,
        events_by_type: tally_by(events, |e| Some(e.event_type.to_string())),
        top_paths,
        top_listings,
    }
}

// ---------------------------------------------------------------------------
// Dealers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DealerRef {
    pub id: DbId,
    pub name: String,
    pub domain: String,
}

/// Summed dwell time for one dealer's listings.
#[derive(Debug, Clone, Copy)]
pub struct DwellTotal {
    pub dealer_id: DbId,
    pub total_ms: i64,
    pub samples: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealerStats {
    pub dealer_id: DbId,
    pub name: String,
    pub domain: String,
    pub clicks: i64,
    /// Share of all clicks in the window, 0.0–1.0.
    pub click_share: f64,
    pub total_dwell_ms: i64,
    pub avg_dwell_ms: Option<f64>,
}

/// Join the dealer list with click counts and dwell totals.
///
/// Every dealer appears even with no activity; activity for ids not in
/// the dealer list is ignored. Sorted by clicks descending, then name.
pub fn merge_dealer_stats(
    dealers: &[DealerRef],
    clicks: &[(DbId, i64)],
    dwell: &[DwellTotal],
) -> Vec<DealerStats> {
    let click_map: HashMap<DbId, i64> = clicks.iter().copied().collect();
    let dwell_map: HashMap<DbId, DwellTotal> = dwell.iter().map(|d| (d.dealer_id, *d)).collect();
    let total_clicks: i64 = dealers
        .iter()
        .map(|d| click_map.get(&d.id).copied().unwrap_or(0))
        .sum();

    let mut stats: Vec<DealerStats> = dealers
        .iter()
        .map(|d| {
            let clicks = click_map.get(&d.id).copied().unwrap_or(0);
            let dwell = dwell_map.get(&d.id);
            let total_dwell_ms = dwell.map_or(0, |x| x.total_ms);
            let avg_dwell_ms = dwell
                .filter(|x| x.samples > 0)
                .map(|x| x.total_ms as f64 / x.samples as f64);
            DealerStats {
                dealer_id: d.id,
                name: d.name.clone(),
                domain: d.domain.clone(),
                clicks,
                click_share: if total_clicks > 0 {
                    clicks as f64 / total_clicks as f64
                } else {
                    0.0
                },
                total_dwell_ms,
                avg_dwell_ms,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.name.cmp(&b.name)));
    stats
}
