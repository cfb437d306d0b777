//! Listing predicate builder.
//!
//! Browse, the saved-search matcher and the admin routes all narrow the
//! `listings` table the same way. This module turns a [`UrlState`] into an
//! ordered list of [`Predicate`]s, once; the db crate renders that list into
//! SQL for both its row and count executors, and [`ListingFilter::matches`]
//! evaluates the identical semantics in memory.
//!
//! Building is two-phase because two stages need data from the database:
//! certification spellings (`certification_variants`) and artisan names
//! (`artisan_index`). [`plan_listing_query`] is pure and records what it
//! needs in [`QueryPlan::lookups`]; [`QueryPlan::resolve`] finishes the
//! filter once the caller has fetched those [`Resolutions`].

use std::collections::HashMap;

use serde::Serialize;

use crate::artisan::{normalize_artisan_code, split_artisan_tokens};
use crate::currency::ExchangeRates;
use crate::numeric::{parse_numeric_filters, NumericField, NumericFilter, NumericOp};
use crate::semantic::{extract_semantic_filters, prefer_explicit, SemanticExtraction};
use crate::types::{DbId, Timestamp};
use crate::url_state::{ListingTab, UrlState};
use crate::text::fold_for_match;
use crate::vocab::certification_key;

/// Listing `status` values that count as sold.
pub const SOLD_STATUSES: &[&str] = &["sold", "presumed_sold"];

/// Listing `status` value that counts as available.
pub const AVAILABLE_STATUS: &str = "available";

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One free-text word: substring match on the name-bearing columns, or any
/// artisan code the word resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextTerm {
    pub word: String,
    pub artisan_codes: Vec<String>,
}

/// A single narrowing condition. All predicates in a filter are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Legacy `status` text OR the newer boolean columns.
    Status { tab: ListingTab },
    /// `price_jpy >= floor`, keeping price-on-request rows.
    PriceFloorJpy { floor: f64 },
    FirstSeenSince { since: Timestamp },
    /// Lower-cased item types.
    ItemTypeIn { item_types: Vec<String> },
    /// Price on request only.
    AskOnly,
    HasSetsumei,
    /// Exact stored spellings (canonical keys plus variants).
    CertTypeIn { cert_types: Vec<String> },
    /// Substring match on `school` or `tosogu_school`, any of.
    SchoolLike { schools: Vec<String> },
    DealerIn { dealer_ids: Vec<DbId> },
    /// Lower-cased periods.
    EraIn { eras: Vec<String> },
    /// Lower-cased signature statuses.
    SignatureIn { statuses: Vec<String> },
    Numeric(NumericFilter),
    /// Upper-cased artisan codes.
    ArtisanIn { codes: Vec<String> },
    Text(TextTerm),
}

/// Column values a predicate needs, borrowed from whatever row type the
/// caller holds.
#[derive(Debug, Clone)]
pub struct ListingFacts<'a> {
    pub title: &'a str,
    pub item_type: Option<&'a str>,
    pub status: Option<&'a str>,
    pub is_available: Option<bool>,
    pub is_sold: Option<bool>,
    pub price_value: Option<f64>,
    pub price_jpy: Option<f64>,
    pub first_seen_at: Timestamp,
    pub cert_type: Option<&'a str>,
    pub smith: Option<&'a str>,
    pub school: Option<&'a str>,
    pub tosogu_maker: Option<&'a str>,
    pub tosogu_school: Option<&'a str>,
    pub era: Option<&'a str>,
    pub signature_status: Option<&'a str>,
    pub has_setsumei: bool,
    pub nagasa_cm: Option<f64>,
    pub sori_cm: Option<f64>,
    pub dealer_id: DbId,
    pub artisan_id: Option<&'a str>,
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

/// Like [`contains_ci`], but the haystack is macron-folded first. The needle
/// must already be folded.
fn contains_folded(haystack: Option<&str>, needle_folded: &str) -> bool {
    haystack.is_some_and(|h| fold_for_match(h).contains(needle_folded))
}

fn in_lower(value: Option<&str>, list: &[String]) -> bool {
    value.is_some_and(|v| {
        let v = v.to_lowercase();
        list.iter().any(|item| *item == v)
    })
}

impl ListingFacts<'_> {
    fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::PriceJpy => self.price_jpy,
            NumericField::NagasaCm => self.nagasa_cm,
            NumericField::SoriCm => self.sori_cm,
        }
    }
}

impl Predicate {
    /// In-memory evaluation with the same semantics as the SQL rendering.
    /// NULL columns never satisfy a comparison.
    pub fn matches(&self, l: &ListingFacts<'_>) -> bool {
        match self {
            Predicate::Status { tab } => match tab {
                ListingTab::Available => {
                    in_lower(l.status, &[AVAILABLE_STATUS.to_string()])
                        || l.is_available == Some(true)
                }
                ListingTab::Sold => {
                    let sold: Vec<String> = SOLD_STATUSES.iter().map(|s| s.to_string()).collect();
                    in_lower(l.status, &sold) || l.is_sold == Some(true)
                }
            },
            Predicate::PriceFloorJpy { floor } => l.price_jpy.map_or(true, |p| p >= *floor),
            Predicate::FirstSeenSince { since } => l.first_seen_at >= *since,
            Predicate::ItemTypeIn { item_types } => in_lower(l.item_type, item_types),
            Predicate::AskOnly => l.price_value.is_none(),
            Predicate::HasSetsumei => l.has_setsumei,
            Predicate::CertTypeIn { cert_types } => {
                l.cert_type.is_some_and(|c| cert_types.iter().any(|t| t == c))
            }
            Predicate::SchoolLike { schools } => schools.iter().any(|s| {
                let needle = s.to_lowercase();
                contains_ci(l.school, &needle) || contains_ci(l.tosogu_school, &needle)
            }),
            Predicate::DealerIn { dealer_ids } => dealer_ids.contains(&l.dealer_id),
            Predicate::EraIn { eras } => in_lower(l.era, eras),
            Predicate::SignatureIn { statuses } => in_lower(l.signature_status, statuses),
            Predicate::Numeric(f) => l.numeric(f.field).is_some_and(|v| f.op.holds(v, f.value)),
            Predicate::ArtisanIn { codes } => l
                .artisan_id
                .is_some_and(|a| codes.iter().any(|c| *c == a.to_uppercase())),
            Predicate::Text(term) => {
                let needle = fold_for_match(&term.word);
                contains_folded(Some(l.title), &needle)
                    || contains_folded(l.smith, &needle)
                    || contains_folded(l.school, &needle)
                    || contains_folded(l.tosogu_maker, &needle)
                    || contains_folded(l.tosogu_school, &needle)
                    || l
                        .artisan_id
                        .is_some_and(|a| term.artisan_codes.iter().any(|c| c == a))
            }
        }
    }
}

/// A fully resolved, ordered conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingFilter {
    pub predicates: Vec<Predicate>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &ListingFacts<'_>) -> bool {
        self.predicates.iter().all(|p| p.matches(listing))
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Matcher knobs that are not part of the user's filter state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchOptions {
    /// Only rows first seen at or after this instant ("what's new" runs).
    pub since: Option<Timestamp>,
    /// Price floor in JPY; `None` or zero disables it.
    pub min_price_jpy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
enum Planned {
    Ready(Predicate),
    Certifications(Vec<String>),
    NameWord(String),
}

/// A filter whose certification and artisan-name stages still need data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    steps: Vec<Planned>,
    /// What the semantic stage pulled out of the query, for diagnostics.
    pub semantic: SemanticExtraction,
}

/// The database lookups a plan needs before it can resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookups {
    /// Canonical certification keys to expand through the variants table.
    pub certifications: Vec<String>,
    /// Normalised words to look up in the artisan index.
    pub artisan_words: Vec<String>,
}

/// Answers to [`Lookups`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolutions {
    /// Canonical cert key → alternate stored spellings.
    pub cert_variants: HashMap<String, Vec<String>>,
    /// Normalised name word → artisan codes.
    pub artisan_codes: HashMap<String, Vec<String>>,
}

fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_lowercase()).collect()
}

fn canonical_cert_key(cert: &str) -> String {
    certification_key(cert)
        .map(str::to_string)
        .unwrap_or_else(|| cert.trim().to_string())
}

/// Build the predicate plan for a browse state.
///
/// Stage order: status, price floor, since, item types, ask-only,
/// setsumei, certifications, schools, dealers, periods, signature, price
/// bounds, explicit artisan, then the free-text pipeline (semantic →
/// numeric → artisan codes → name words).
pub fn plan_listing_query(
    state: &UrlState,
    options: &MatchOptions,
    rates: &ExchangeRates,
) -> QueryPlan {
    let f = &state.filters;
    let mut steps = Vec::new();

    steps.push(Planned::Ready(Predicate::Status { tab: state.active_tab }));

    if let Some(floor) = options.min_price_jpy.filter(|v| *v > 0.0) {
        if !f.ask_only {
            steps.push(Planned::Ready(Predicate::PriceFloorJpy { floor }));
        }
    }

    if let Some(since) = options.since {
        steps.push(Planned::Ready(Predicate::FirstSeenSince { since }));
    }

    let semantic = state
        .search_query
        .as_deref()
        .map(extract_semantic_filters)
        .unwrap_or_default();
    let inferred = &semantic.extracted_filters;

    let mut item_types = lowered(&prefer_explicit(&f.item_types, &inferred.item_types));
    if item_types.is_empty() {
        item_types = f
            .category
            .default_item_types()
            .iter()
            .map(|t| t.to_string())
            .collect();
    }
    if !item_types.is_empty() {
        steps.push(Planned::Ready(Predicate::ItemTypeIn { item_types }));
    }

    if f.ask_only {
        steps.push(Planned::Ready(Predicate::AskOnly));
    }
    if f.has_setsumei {
        steps.push(Planned::Ready(Predicate::HasSetsumei));
    }

    let certs = prefer_explicit(&f.certifications, &inferred.certifications);
    if !certs.is_empty() {
        let mut keys: Vec<String> = Vec::new();
        for cert in certs.iter().map(|c| canonical_cert_key(c)) {
            if !keys.contains(&cert) {
                keys.push(cert);
            }
        }
        steps.push(Planned::Certifications(keys));
    }

    if !f.schools.is_empty() {
        steps.push(Planned::Ready(Predicate::SchoolLike {
            schools: f.schools.iter().map(|s| s.trim().to_string()).collect(),
        }));
    }
    if !f.dealers.is_empty() {
        steps.push(Planned::Ready(Predicate::DealerIn {
            dealer_ids: f.dealers.clone(),
        }));
    }
    if !f.periods.is_empty() {
        steps.push(Planned::Ready(Predicate::EraIn {
            eras: lowered(&f.periods),
        }));
    }

    let signatures = prefer_explicit(&f.signature_statuses, &inferred.signature_statuses);
    if !signatures.is_empty() {
        steps.push(Planned::Ready(Predicate::SignatureIn {
            statuses: lowered(&signatures),
        }));
    }

    if let Some(min) = f.price_min {
        steps.push(Planned::Ready(Predicate::Numeric(NumericFilter {
            field: NumericField::PriceJpy,
            op: NumericOp::Gte,
            value: min,
        })));
    }
    if let Some(max) = f.price_max {
        steps.push(Planned::Ready(Predicate::Numeric(NumericFilter {
            field: NumericField::PriceJpy,
            op: NumericOp::Lte,
            value: max,
        })));
    }

    if let Some(code) = state.artisan_code.as_deref() {
        steps.push(Planned::Ready(Predicate::ArtisanIn {
            codes: vec![normalize_artisan_code(code).to_uppercase()],
        }));
    }

    let numeric = parse_numeric_filters(&semantic.remaining_terms, rates);
    steps.extend(
        numeric
            .filters
            .iter()
            .map(|nf| Planned::Ready(Predicate::Numeric(*nf))),
    );

    let artisan = split_artisan_tokens(&numeric.text_words);
    if !artisan.codes.is_empty() {
        steps.push(Planned::Ready(Predicate::ArtisanIn {
            codes: artisan.codes.iter().map(|c| c.to_uppercase()).collect(),
        }));
    }
    steps.extend(artisan.words.into_iter().map(Planned::NameWord));

    QueryPlan { steps, semantic }
}

impl QueryPlan {
    pub fn lookups(&self) -> Lookups {
        let mut lookups = Lookups::default();
        for step in &self.steps {
            match step {
                Planned::Certifications(keys) => lookups.certifications.extend(keys.iter().cloned()),
                Planned::NameWord(word) => lookups.artisan_words.push(word.clone()),
                Planned::Ready(_) => {}
            }
        }
        lookups
    }

    /// Finish the filter. Missing resolutions are treated as "no variants"
    /// and "no artisan matches".
    pub fn resolve(self, resolutions: &Resolutions) -> ListingFilter {
        let predicates = self
            .steps
            .into_iter()
            .map(|step| match step {
                Planned::Ready(p) => p,
                Planned::Certifications(keys) => {
                    let mut cert_types: Vec<String> = Vec::new();
                    for key in keys {
                        let variants = resolutions.cert_variants.get(&key);
                        for v in std::iter::once(&key).chain(variants.into_iter().flatten()) {
                            if !cert_types.contains(v) {
                                cert_types.push(v.clone());
                            }
                        }
                    }
                    Predicate::CertTypeIn { cert_types }
                }
                Planned::NameWord(word) => {
                    let artisan_codes = resolutions
                        .artisan_codes
                        .get(&word)
                        .cloned()
                        .unwrap_or_default();
                    Predicate::Text(TextTerm { word, artisan_codes })
                }
            })
            .collect();
        ListingFilter { predicates }
    }
}

/// Convenience for callers with no database behind them (tests, offline
/// tooling): plan and resolve in one step.
pub fn build_listing_filter(
    state: &UrlState,
    options: &MatchOptions,
    rates: &ExchangeRates,
    resolutions: &Resolutions,
) -> ListingFilter {
    plan_listing_query(state, options, rates).resolve(resolutions)
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_state::BrowseFilters;
    use crate::vocab::Category;
    use chrono::{TimeZone, Utc};

    fn facts<'a>() -> ListingFacts<'a> {
        ListingFacts {
            title: "Juyo Katana by Osafune Kanemitsu",
            item_type: Some("katana"),
            status: Some("available"),
            is_available: Some(true),
            is_sold: Some(false),
            price_value: Some(8_000_000.0),
            price_jpy: Some(8_000_000.0),
            first_seen_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
            cert_type: Some("Juyo"),
            smith: Some("Kanemitsu"),
            school: Some("Osafune"),
            tosogu_maker: None,
            tosogu_school: None,
            era: Some("Koto"),
            signature_status: Some("signed"),
            has_setsumei: true,
            nagasa_cm: Some(70.5),
            sori_cm: Some(2.1),
            dealer_id: 4,
            artisan_id: Some("KAN1234"),
        }
    }

    fn state_with_query(q: &str) -> UrlState {
        UrlState {
            search_query: Some(q.to_string()),
            ..UrlState::default()
        }
    }

    #[test]
    fn default_state_filters_status_and_category() {
        let filter = build_listing_filter(
            &UrlState::default(),
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        assert_eq!(filter.predicates.len(), 2);
        assert_eq!(filter.predicates[0], Predicate::Status { tab: ListingTab::Available });
        assert!(matches!(&filter.predicates[1], Predicate::ItemTypeIn { item_types } if item_types.contains(&"katana".to_string())));
        assert!(filter.matches(&facts()));
    }

    #[test]
    fn text_match_ignores_macrons_in_listing_columns() {
        let mut state = state_with_query("Gotō");
        state.filters.category = Category::All;
        let filter = build_listing_filter(
            &state,
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        let tsuba = ListingFacts {
            title: "Gotō Ichijō tsuba",
            item_type: Some("tsuba"),
            smith: None,
            school: None,
            tosogu_maker: Some("Gotō Ichijō"),
            artisan_id: None,
            ..facts()
        };
        assert!(filter.matches(&tsuba));

        let plain = build_listing_filter(
            &state_with_query("ichijo"),
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        let text_only: Vec<_> = plain
            .predicates
            .iter()
            .filter(|p| matches!(p, Predicate::Text(_)))
            .collect();
        assert!(!text_only.is_empty());
        assert!(text_only.iter().all(|p| p.matches(&tsuba)));
    }

    #[test]
    fn all_category_adds_no_type_filter() {
        let mut state = UrlState::default();
        state.filters.category = Category::All;
        let filter = build_listing_filter(
            &state,
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        assert_eq!(filter.predicates.len(), 1);
    }

    #[test]
    fn query_pipeline_end_to_end() {
        let plan = plan_listing_query(
            &state_with_query("juyo katana price>500000"),
            &MatchOptions::default(),
            &ExchangeRates::default(),
        );
        assert_eq!(plan.lookups().certifications, vec!["Juyo"]);
        assert!(plan.lookups().artisan_words.is_empty());

        let filter = plan.resolve(&Resolutions::default());
        assert!(filter.predicates.contains(&Predicate::Numeric(NumericFilter {
            field: NumericField::PriceJpy,
            op: NumericOp::Gte,
            value: 500000.0,
        })));
        assert!(!filter.predicates.iter().any(|p| matches!(p, Predicate::Text(_))));
        assert!(filter.matches(&facts()));
    }

    #[test]
    fn explicit_certification_beats_query() {
        let mut state = state_with_query("juyo");
        state.filters.certifications = vec!["Hozon".into()];
        let plan = plan_listing_query(&state, &MatchOptions::default(), &ExchangeRates::default());
        assert_eq!(plan.lookups().certifications, vec!["Hozon"]);
    }

    #[test]
    fn cert_variants_expand() {
        let mut state = UrlState::default();
        state.filters.certifications = vec!["tokuju".into()];
        let mut resolutions = Resolutions::default();
        resolutions
            .cert_variants
            .insert("Tokuju".into(), vec!["tokubetsu_juyo".into(), "Tokuju".into()]);
        let filter = build_listing_filter(
            &state,
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &resolutions,
        );
        let certs = filter
            .predicates
            .iter()
            .find_map(|p| match p {
                Predicate::CertTypeIn { cert_types } => Some(cert_types.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(certs, vec!["Tokuju", "tokubetsu_juyo"]);
    }

    #[test]
    fn name_words_resolve_to_artisan_codes() {
        let state = state_with_query("Kanemitsu");
        let plan = plan_listing_query(&state, &MatchOptions::default(), &ExchangeRates::default());
        assert_eq!(plan.lookups().artisan_words, vec!["kanemitsu"]);

        let mut resolutions = Resolutions::default();
        resolutions
            .artisan_codes
            .insert("kanemitsu".into(), vec!["KAN1234".into()]);
        let filter = plan.resolve(&resolutions);
        assert!(filter.predicates.contains(&Predicate::Text(TextTerm {
            word: "kanemitsu".into(),
            artisan_codes: vec!["KAN1234".into()],
        })));
        assert!(filter.matches(&facts()));
    }

    #[test]
    fn artisan_code_token_filters_directly() {
        let filter = build_listing_filter(
            &state_with_query("kan1234"),
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        assert!(filter.predicates.contains(&Predicate::ArtisanIn {
            codes: vec!["KAN1234".into()]
        }));
        assert!(filter.matches(&facts()));
    }

    #[test]
    fn price_floor_keeps_ask_listings_and_is_skipped_for_ask_only() {
        let options = MatchOptions {
            since: None,
            min_price_jpy: Some(100_000.0),
        };
        let filter = build_listing_filter(
            &UrlState::default(),
            &options,
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        let mut ask = facts();
        ask.price_value = None;
        ask.price_jpy = None;
        assert!(filter.matches(&ask));
        let mut cheap = facts();
        cheap.price_jpy = Some(5_000.0);
        assert!(!filter.matches(&cheap));

        let mut state = UrlState::default();
        state.filters.ask_only = true;
        let filter = build_listing_filter(&state, &options, &ExchangeRates::default(), &Resolutions::default());
        assert!(!filter.predicates.iter().any(|p| matches!(p, Predicate::PriceFloorJpy { .. })));
        assert!(filter.predicates.contains(&Predicate::AskOnly));
    }

    #[test]
    fn since_excludes_older_rows() {
        let options = MatchOptions {
            since: Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
            min_price_jpy: None,
        };
        let filter = build_listing_filter(
            &UrlState::default(),
            &options,
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        assert!(!filter.matches(&facts()));
    }

    #[test]
    fn sold_tab_uses_legacy_or_new_columns() {
        let pred = Predicate::Status { tab: ListingTab::Sold };
        let mut legacy = facts();
        legacy.status = Some("presumed_sold");
        legacy.is_sold = None;
        assert!(pred.matches(&legacy));
        let mut modern = facts();
        modern.status = None;
        modern.is_sold = Some(true);
        assert!(pred.matches(&modern));
        assert!(!pred.matches(&facts()));
    }

    #[test]
    fn school_and_dealer_filters() {
        let state = UrlState {
            filters: BrowseFilters {
                schools: vec!["osa".into()],
                dealers: vec![4, 9],
                periods: vec!["KOTO".into()],
                ..BrowseFilters::default()
            },
            ..UrlState::default()
        };
        let filter = build_listing_filter(
            &state,
            &MatchOptions::default(),
            &ExchangeRates::default(),
            &Resolutions::default(),
        );
        assert!(filter.matches(&facts()));
        let mut other_dealer = facts();
        other_dealer.dealer_id = 5;
        assert!(!filter.matches(&other_dealer));
    }

    #[test]
    fn null_numeric_column_never_matches() {
        let pred = Predicate::Numeric(NumericFilter {
            field: NumericField::NagasaCm,
            op: NumericOp::Lte,
            value: 80.0,
        });
        let mut no_length = facts();
        no_length.nagasa_cm = None;
        assert!(!pred.matches(&no_length));
        assert!(pred.matches(&facts()));
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
