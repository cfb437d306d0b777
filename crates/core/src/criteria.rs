//! Saved-search criteria: the persisted filter definition a user can re-run.
//!
//! Stored as JSON in `saved_searches.criteria`, so the serde shape
//! (camelCase, empty fields omitted) is part of the storage format.

use serde::{Deserialize, Serialize};

use crate::types::DbId;
use crate::url_state::{BrowseFilters, ListingTab, SortOrder, UrlState};
use crate::vocab::{certification_key, Category};

/// Upper bound on the free-text query length.
pub const MAX_QUERY_LEN: usize = 200;

/// A user's saved filter specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedSearchCriteria {
    pub tab: ListingTab,
    pub category: Category,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schools: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dealers: Vec<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub sort: SortOrder,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ask_only: bool,
}

impl SavedSearchCriteria {
    /// Whether any narrowing filter is set. Tab and sort do not count.
    pub fn has_any_filter(&self) -> bool {
        !self.item_types.is_empty()
            || !self.certifications.is_empty()
            || !self.dealers.is_empty()
            || !self.schools.is_empty()
            || self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.ask_only
            || self.category != Category::default()
    }

    /// Capture the criteria-relevant subset of a browse state.
    ///
    /// Periods, signature statuses, setsumei and the artisan code are not
    /// part of a saved search and are dropped.
    pub fn from_url_state(state: &UrlState) -> Self {
        let f = &state.filters;
        Self {
            tab: state.active_tab,
            category: f.category,
            item_types: f.item_types.clone(),
            certifications: f.certifications.clone(),
            schools: f.schools.clone(),
            dealers: f.dealers.clone(),
            min_price: f.price_min,
            max_price: f.price_max,
            query: state.search_query.clone(),
            sort: state.sort,
            ask_only: f.ask_only,
        }
    }

    /// Expand into a browse state (used to build "open in browse" links and
    /// to drive the listing matcher).
    pub fn to_url_state(&self) -> UrlState {
        UrlState {
            active_tab: self.tab,
            filters: BrowseFilters {
                category: self.category,
                item_types: self.item_types.clone(),
                certifications: self.certifications.clone(),
                schools: self.schools.clone(),
                dealers: self.dealers.clone(),
                ask_only: self.ask_only,
                price_min: self.min_price,
                price_max: self.max_price,
                ..BrowseFilters::default()
            },
            sort: self.sort,
            search_query: self
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            artisan_code: None,
        }
    }
}

/// Collect every validation message for a criteria value.
pub fn criteria_errors(criteria: &SavedSearchCriteria) -> Vec<String> {
    let mut errors = Vec::new();

    if !criteria.has_any_filter() {
        errors.push("At least one filter must be set".to_string());
    }

    for (label, value) in [("minPrice", criteria.min_price), ("maxPrice", criteria.max_price)] {
        if let Some(v) = value {
            // Browse links drop non-positive bounds, so a saved search must too.
            if !v.is_finite() || v <= 0.0 {
                errors.push(format!("{label} must be a positive number"));
            }
        }
    }
    if let (Some(min), Some(max)) = (criteria.min_price, criteria.max_price) {
        if min > max {
            errors.push("minPrice must not exceed maxPrice".to_string());
        }
    }

    for cert in &criteria.certifications {
        if certification_key(cert).is_none() {
            errors.push(format!("Unknown certification: {cert}"));
        }
    }

    if criteria.dealers.iter().any(|id| *id <= 0) {
        errors.push("Dealer ids must be positive".to_string());
    }

    if let Some(q) = &criteria.query {
        if q.chars().count() > MAX_QUERY_LEN {
            errors.push(format!("query must be at most {MAX_QUERY_LEN} characters"));
        }
    }

    errors
}

/// Return the first validation error, or `None` when the criteria is valid.
pub fn validate_criteria(criteria: &SavedSearchCriteria) -> Option<String> {
    criteria_errors(criteria).into_iter().next()
}
