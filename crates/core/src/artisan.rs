//! Artisan code recognition.
//!
//! Smiths carry codes like `MAS590`; schools use `NS-` codes such as
//! `NS-Ko-Bizen`. A token in either shape filters on `listings.artisan_id`
//! directly; everything else is treated as a name word and resolved through
//! the artisan index by the db layer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::text::normalize_search_text;

static SMITH_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]{2,4}[0-9]{1,5}[a-z]?$").expect("valid regex"));

static SCHOOL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ns-[a-z]+(-[a-z]+)*$").expect("valid regex"));

/// Minimum length for a name word to be worth an index lookup.
pub const MIN_NAME_WORD_LEN: usize = 2;

pub fn looks_like_artisan_code(token: &str) -> bool {
    let token = token.trim();
    SMITH_CODE_RE.is_match(token) || SCHOOL_CODE_RE.is_match(token)
}

/// Canonical spelling of a code: smith codes upper-cased, school codes
/// with an upper-case `NS` prefix and the remainder as typed.
pub fn normalize_artisan_code(token: &str) -> String {
    let token = token.trim();
    if SCHOOL_CODE_RE.is_match(token) {
        format!("NS{}", &token[2..])
    } else {
        token.to_ascii_uppercase()
    }
}

/// Leftover terms sorted into direct codes and name words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtisanSplit {
    pub codes: Vec<String>,
    /// Normalised (lowercase, macron-free) words, deduplicated.
    pub words: Vec<String>,
}

pub fn split_artisan_tokens<S: AsRef<str>>(terms: &[S]) -> ArtisanSplit {
    let mut out = ArtisanSplit::default();
    for term in terms {
        let raw = term
            .as_ref()
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
        if raw.is_empty() {
            continue;
        }
        if looks_like_artisan_code(raw) {
            let code = normalize_artisan_code(raw);
            if !out.codes.contains(&code) {
                out.codes.push(code);
            }
            continue;
        }
        let word = normalize_search_text(raw);
        if word.chars().count() >= MIN_NAME_WORD_LEN && !out.words.contains(&word) {
            out.words.push(word);
        }
    }
    out
}
