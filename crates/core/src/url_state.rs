//! Browse URL state: query string ↔ structured filters.
//!
//! The browse page keeps its complete filter state in the URL so links are
//! shareable. Parsing is lenient (unknown or malformed values fall back to
//! defaults); building is minimal (defaults and false flags are omitted).

use serde::{Deserialize, Serialize};

use crate::types::DbId;
use crate::vocab::Category;

pub const PARAM_TAB: &str = "tab";
pub const PARAM_CATEGORY: &str = "cat";
pub const PARAM_TYPE: &str = "type";
pub const PARAM_CERT: &str = "cert";
pub const PARAM_SCHOOL: &str = "school";
pub const PARAM_DEALER: &str = "dealer";
pub const PARAM_PERIOD: &str = "period";
pub const PARAM_SIGNATURE: &str = "sig";
pub const PARAM_ASK: &str = "ask";
pub const PARAM_SETSUMEI: &str = "setsumei";
pub const PARAM_MIN: &str = "min";
pub const PARAM_MAX: &str = "max";
pub const PARAM_QUERY: &str = "q";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_ARTISAN: &str = "artisan";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of the catalog to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingTab {
    #[default]
    Available,
    Sold,
}

impl ListingTab {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingTab::Available => "available",
            ListingTab::Sold => "sold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Some(ListingTab::Available),
            "sold" => Some(ListingTab::Sold),
            _ => None,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Recent,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Some(SortOrder::Recent),
            "price_asc" => Some(SortOrder::PriceAsc),
            "price_desc" => Some(SortOrder::PriceDesc),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Structured browse filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseFilters {
    pub category: Category,
    pub item_types: Vec<String>,
    pub certifications: Vec<String>,
    pub schools: Vec<String>,
    pub dealers: Vec<DbId>,
    pub periods: Vec<String>,
    pub signature_statuses: Vec<String>,
    pub ask_only: bool,
    pub has_setsumei: bool,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

/// Everything the browse URL encodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlState {
    pub active_tab: ListingTab,
    pub filters: BrowseFilters,
    pub sort: SortOrder,
    pub search_query: Option<String>,
    pub artisan_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn split_csv(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn split_csv_ids(value: &str) -> impl Iterator<Item = DbId> + '_ {
    split_csv(value).filter_map(|s| s.parse::<DbId>().ok()).filter(|id| *id > 0)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse decoded query parameters into a [`UrlState`].
///
/// Repeated CSV keys accumulate; repeated scalar keys keep the last value.
pub fn parse_url_state<I, K, V>(params: I) -> UrlState
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut state = UrlState::default();

    for (key, value) in params {
        let value = value.as_ref();
        let f = &mut state.filters;
        match key.as_ref() {
            PARAM_TAB => state.active_tab = ListingTab::parse(value).unwrap_or_default(),
            PARAM_CATEGORY => f.category = Category::parse(value).unwrap_or_default(),
            PARAM_TYPE => f.item_types.extend(split_csv(value).map(|s| s.to_lowercase())),
            PARAM_CERT => f.certifications.extend(split_csv(value)),
            PARAM_SCHOOL => f.schools.extend(split_csv(value)),
            PARAM_DEALER => f.dealers.extend(split_csv_ids(value)),
            PARAM_PERIOD => f.periods.extend(split_csv(value).map(|s| s.to_lowercase())),
            PARAM_SIGNATURE => f
                .signature_statuses
                .extend(split_csv(value).map(|s| s.to_lowercase())),
            PARAM_ASK => f.ask_only = parse_flag(value),
            PARAM_SETSUMEI => f.has_setsumei = parse_flag(value),
            PARAM_MIN => f.price_min = parse_price(value),
            PARAM_MAX => f.price_max = parse_price(value),
            PARAM_QUERY => state.search_query = non_empty(value),
            PARAM_SORT => state.sort = SortOrder::parse(value).unwrap_or_default(),
            PARAM_ARTISAN => state.artisan_code = non_empty(value),
            _ => {}
        }
    }

    state
}

/// Parse a raw (percent-encoded) query string, with or without leading `?`.
pub fn parse_query_string(query: &str) -> UrlState {
    let query = query.strip_prefix('?').unwrap_or(query);
    parse_url_state(url::form_urlencoded::parse(query.as_bytes()))
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

fn format_price(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Build the minimal parameter list for a state, in a stable order.
pub fn build_params_from_state(state: &UrlState) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| params.push((key.to_string(), value));

    if state.active_tab != ListingTab::default() {
        push(PARAM_TAB, state.active_tab.as_str().to_string());
    }

    let f = &state.filters;
    if f.category != Category::default() {
        push(PARAM_CATEGORY, f.category.as_str().to_string());
    }
    if !f.item_types.is_empty() {
        push(PARAM_TYPE, f.item_types.join(","));
    }
    if !f.certifications.is_empty() {
        push(PARAM_CERT, f.certifications.join(","));
    }
    if !f.schools.is_empty() {
        push(PARAM_SCHOOL, f.schools.join(","));
    }
    let dealers: Vec<String> = f
        .dealers
        .iter()
        .filter(|id| **id > 0)
        .map(|id| id.to_string())
        .collect();
    if !dealers.is_empty() {
        push(PARAM_DEALER, dealers.join(","));
    }
    if !f.periods.is_empty() {
        push(PARAM_PERIOD, f.periods.join(","));
    }
    if !f.signature_statuses.is_empty() {
        push(PARAM_SIGNATURE, f.signature_statuses.join(","));
    }
    if f.ask_only {
        push(PARAM_ASK, "true".to_string());
    }
    if f.has_setsumei {
        push(PARAM_SETSUMEI, "true".to_string());
    }
    if let Some(min) = f.price_min {
        push(PARAM_MIN, format_price(min));
    }
    if let Some(max) = f.price_max {
        push(PARAM_MAX, format_price(max));
    }

    if let Some(q) = state.search_query.as_deref().filter(|q| !q.trim().is_empty()) {
        push(PARAM_QUERY, q.trim().to_string());
    }
    if state.sort != SortOrder::default() {
        push(PARAM_SORT, state.sort.as_str().to_string());
    }
    if let Some(code) = state.artisan_code.as_deref().filter(|c| !c.trim().is_empty()) {
        push(PARAM_ARTISAN, code.trim().to_string());
    }

    params
}

/// Percent-encode the minimal parameter list (no leading `?`).
pub fn to_query_string(state: &UrlState) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(build_params_from_state(state))
        .finish()
}
