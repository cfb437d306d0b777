//! Semantic query extraction.
//!
//! Pulls recognised facets (certifications, item types, signature status)
//! out of a free-text query so "juyo katana" behaves like the matching
//! structured filters. Whatever isn't recognised is handed on unchanged to
//! the numeric parser and then the text matcher.

use serde::Serialize;

use crate::text::normalize_search_text;
use crate::vocab::{canonical_certification, item_types_for, signature_status_for};

/// Facets recognised in the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFilters {
    pub certifications: Vec<String>,
    pub item_types: Vec<String>,
    pub signature_statuses: Vec<String>,
}

impl ExtractedFilters {
    pub fn is_empty(&self) -> bool {
        self.certifications.is_empty()
            && self.item_types.is_empty()
            && self.signature_statuses.is_empty()
    }
}

/// Result of running the extractor over a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemanticExtraction {
    pub extracted_filters: ExtractedFilters,
    /// Unrecognised tokens, in their original spelling and order.
    pub remaining_terms: Vec<String>,
}

enum Facet {
    Certification(&'static str),
    ItemTypes(Vec<&'static str>),
    Signature(&'static str),
}

fn classify(word: &str) -> Option<Facet> {
    if let Some(cert) = canonical_certification(word) {
        return Some(Facet::Certification(cert));
    }
    if let Some(types) = item_types_for(word) {
        return Some(Facet::ItemTypes(types));
    }
    signature_status_for(word).map(Facet::Signature)
}

fn match_key(token: &str) -> String {
    normalize_search_text(token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Split a query into recognised facets and remaining terms.
///
/// Two-word phrases ("tokubetsu hozon", "fuchi kashira") are tried before
/// single tokens.
pub fn extract_semantic_filters(query: &str) -> SemanticExtraction {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let mut out = SemanticExtraction::default();
    let mut i = 0;

    while i < tokens.len() {
        let single = match_key(tokens[i]);

        let phrase = tokens
            .get(i + 1)
            .map(|next| format!("{single} {}", match_key(next)))
            .and_then(|p| classify(&p));

        let (facet, consumed) = match phrase {
            Some(facet) => (Some(facet), 2),
            None => (classify(&single).filter(|_| !single.is_empty()), 1),
        };

        let f = &mut out.extracted_filters;
        match facet {
            Some(Facet::Certification(c)) => push_unique(&mut f.certifications, c),
            Some(Facet::ItemTypes(types)) => {
                for t in types {
                    push_unique(&mut f.item_types, t);
                }
            }
            Some(Facet::Signature(s)) => push_unique(&mut f.signature_statuses, s),
            None => out.remaining_terms.push(tokens[i].to_string()),
        }
        i += consumed;
    }

    out
}

/// Explicit structured filters always win over inferred ones.
pub fn prefer_explicit(explicit: &[String], inferred: &[String]) -> Vec<String> {
    if explicit.is_empty() {
        inferred.to_vec()
    } else {
        explicit.to_vec()
    }
}
