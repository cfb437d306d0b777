//! IP geolocation batching.
//!
//! The free tier of the lookup provider accepts at most 100 addresses per
//! batch request and 15 batch requests per minute. This module decides what
//! to send and how to fold the answers back; the HTTP client lives in the
//! api crate.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum addresses per batch request.
pub const GEO_BATCH_SIZE: usize = 100;

/// Provider quota: batch requests per minute.
pub const GEO_BATCHES_PER_MINUTE: u32 = 15;

/// Most batches one lookup will send, keeping a request to roughly
/// `(MAX_GEO_BATCHES - 1) * batch_spacing()` of waiting.
pub const MAX_GEO_BATCHES: usize = 5;

/// Most addresses one lookup will resolve.
pub const MAX_GEO_LOOKUPS: usize = GEO_BATCH_SIZE * MAX_GEO_BATCHES;

/// Placeholder for anything that could not be resolved.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Minimum spacing between batch requests that stays inside the quota.
pub fn batch_spacing() -> Duration {
    Duration::from_secs(60) / GEO_BATCHES_PER_MINUTE
}

/// Whether an address can meaningfully be geolocated.
pub fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            let seg0 = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (seg0 & 0xfe00) == 0xfc00
                || (seg0 & 0xffc0) == 0xfe80)
        }
    }
}

/// What to look up and what is already known to be unresolvable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoPlan {
    /// Public addresses, deduplicated, chunked to the provider batch size.
    pub batches: Vec<Vec<String>>,
    /// Inputs that are invalid or non-public.
    pub unresolvable: Vec<String>,
    /// Public addresses left out once [`MAX_GEO_BATCHES`] batches were full.
    pub skipped: usize,
}

pub fn plan_geo_batches<S: AsRef<str>>(ips: &[S]) -> GeoPlan {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = GeoPlan::default();

    for raw in ips {
        let raw = raw.as_ref().trim();
        if raw.is_empty() || !seen.insert(raw) {
            continue;
        }
        match raw.parse::<IpAddr>() {
            Ok(ip) if is_public_ip(&ip) => {}
            _ => {
                plan.unresolvable.push(raw.to_string());
                continue;
            }
        }
        let batch_count = plan.batches.len();
        match plan.batches.last_mut() {
            Some(batch) if batch.len() < GEO_BATCH_SIZE => batch.push(raw.to_string()),
            _ if batch_count >= MAX_GEO_BATCHES => plan.skipped += 1,
            _ => plan.batches.push(vec![raw.to_string()]),
        }
    }

    plan
}

/// Distinct addresses ordered by how often they occur (ties by address),
/// capped at [`MAX_GEO_LOOKUPS`] so the busiest visitors are resolved first.
pub fn select_lookup_ips<S: AsRef<str>>(ips: &[S]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for ip in ips {
        let ip = ip.as_ref().trim();
        if !ip.is_empty() {
            *counts.entry(ip).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(MAX_GEO_LOOKUPS)
        .map(|(ip, _)| ip.to_string())
        .collect()
}

/// One entry of the provider's batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLookupResult {
    pub query: String,
    pub status: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Map every requested address to a country name, "Unknown" when the
/// batch failed, the provider reported failure, or the address was never
/// sent.
pub fn fold_geo_results<S: AsRef<str>>(
    requested: &[S],
    results: &[GeoLookupResult],
) -> HashMap<String, String> {
    let resolved: HashMap<&str, &str> = results
        .iter()
        .filter(|r| r.status == "success")
        .filter_map(|r| r.country.as_deref().map(|c| (r.query.as_str(), c)))
        .collect();

    requested
        .iter()
        .map(|ip| {
            let ip = ip.as_ref().trim();
            let country = resolved.get(ip).copied().unwrap_or(UNKNOWN_COUNTRY);
            (ip.to_string(), country.to_string())
        })
        .collect()
}
