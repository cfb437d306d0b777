//! Catalog vocabularies: item types, categories, certifications, periods
//! and signature statuses.
//!
//! Stored listing values are lowercase snake_case item types and the
//! canonical certification keys below. Scraped alternate spellings of
//! certifications live in the `certification_variants` table.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Item types
// ---------------------------------------------------------------------------

/// Blade item types.
pub const NIHONTO_TYPES: &[&str] = &[
    "katana",
    "wakizashi",
    "tanto",
    "tachi",
    "naginata",
    "yari",
    "ken",
    "kodachi",
    "daisho",
];

/// Fitting item types.
pub const TOSOGU_TYPES: &[&str] = &[
    "tsuba",
    "fuchi_kashira",
    "fuchi",
    "kashira",
    "kozuka",
    "kogai",
    "menuki",
    "mitokoromono",
    "futatokoro",
    "habaki",
    "koshirae",
];

/// Item types a user means when they type "sword".
pub const SWORD_ALIAS_TYPES: &[&str] = &["katana", "wakizashi", "tanto", "tachi"];

/// Alias words that expand to one or more item types.
const ITEM_TYPE_ALIASES: &[(&str, &[&str])] = &[
    ("sword", SWORD_ALIAS_TYPES),
    ("swords", SWORD_ALIAS_TYPES),
    ("blade", SWORD_ALIAS_TYPES),
    ("blades", SWORD_ALIAS_TYPES),
    ("fittings", TOSOGU_TYPES),
    ("tosogu", TOSOGU_TYPES),
    ("fk", &["fuchi_kashira"]),
    ("fuchi-kashira", &["fuchi_kashira"]),
    ("fuchi kashira", &["fuchi_kashira"]),
    ("spear", &["yari"]),
    ("polearm", &["naginata"]),
    ("dagger", &["tanto"]),
];

/// Return `true` if `value` is a known item type (nihonto or tosogu).
pub fn is_item_type(value: &str) -> bool {
    NIHONTO_TYPES.contains(&value) || TOSOGU_TYPES.contains(&value)
}

/// Resolve a normalised word or phrase to the item types it denotes.
///
/// A literal item type resolves to itself; aliases resolve to their
/// expansion. Unknown words return `None`.
pub fn item_types_for(word: &str) -> Option<Vec<&'static str>> {
    if let Some(t) = NIHONTO_TYPES
        .iter()
        .chain(TOSOGU_TYPES.iter())
        .find(|t| **t == word)
    {
        return Some(vec![*t]);
    }
    ITEM_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == word)
        .map(|(_, types)| types.to_vec())
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Top-level browse category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Nihonto,
    Tosogu,
    All,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Nihonto => "nihonto",
            Category::Tosogu => "tosogu",
            Category::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nihonto" => Some(Category::Nihonto),
            "tosogu" => Some(Category::Tosogu),
            "all" => Some(Category::All),
            _ => None,
        }
    }

    /// Item types implied by the category when no explicit list is set.
    /// `All` implies no restriction.
    pub fn default_item_types(self) -> &'static [&'static str] {
        match self {
            Category::Nihonto => NIHONTO_TYPES,
            Category::Tosogu => TOSOGU_TYPES,
            Category::All => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Certifications
// ---------------------------------------------------------------------------

/// Canonical certification keys, ascending by rarity.
pub const CERTIFICATIONS: &[&str] = &["Kicho", "TokuKicho", "Hozon", "TokuHozon", "Juyo", "Tokuju"];

/// Normalised spellings (single words and phrases) for each canonical key.
const CERTIFICATION_SPELLINGS: &[(&str, &str)] = &[
    ("kicho", "Kicho"),
    ("tokukicho", "TokuKicho"),
    ("tokubetsu kicho", "TokuKicho"),
    ("hozon", "Hozon"),
    ("tokuhozon", "TokuHozon"),
    ("tokubetsu hozon", "TokuHozon"),
    ("juyo", "Juyo"),
    ("tokuju", "Tokuju"),
    ("tokubetsu juyo", "Tokuju"),
];

/// Map a normalised word or phrase to its canonical certification key.
pub fn canonical_certification(word: &str) -> Option<&'static str> {
    if let Some(c) = CERTIFICATIONS.iter().find(|c| c.eq_ignore_ascii_case(word)) {
        return Some(c);
    }
    CERTIFICATION_SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == word)
        .map(|(_, canonical)| *canonical)
}

/// Resolve a user-supplied certification (any case, macrons, `_` or `-`
/// separators) to its canonical key.
pub fn certification_key(raw: &str) -> Option<&'static str> {
    let spaced = raw.replace(['_', '-'], " ");
    canonical_certification(&crate::text::normalize_search_text(&spaced))
}

// ---------------------------------------------------------------------------
// Signature status and period
// ---------------------------------------------------------------------------

pub const SIGNATURE_SIGNED: &str = "signed";
pub const SIGNATURE_UNSIGNED: &str = "unsigned";

const SIGNATURE_WORDS: &[(&str, &str)] = &[
    ("signed", SIGNATURE_SIGNED),
    ("mei", SIGNATURE_SIGNED),
    ("zaimei", SIGNATURE_SIGNED),
    ("unsigned", SIGNATURE_UNSIGNED),
    ("mumei", SIGNATURE_UNSIGNED),
];

/// Map a normalised word to a signature status.
pub fn signature_status_for(word: &str) -> Option<&'static str> {
    SIGNATURE_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, status)| *status)
}

/// Sword-making periods stored in `listings.era`.
pub const PERIODS: &[&str] = &["koto", "shinto", "shinshinto", "gendai"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_item_type_resolves_to_itself() {
        assert_eq!(item_types_for("tsuba"), Some(vec!["tsuba"]));
    }

    #[test]
    fn sword_alias_expands() {
        assert_eq!(
            item_types_for("sword"),
            Some(vec!["katana", "wakizashi", "tanto", "tachi"])
        );
    }

    #[test]
    fn unknown_word_is_not_an_item_type() {
        assert_eq!(item_types_for("masamune"), None);
        assert!(!is_item_type("masamune"));
    }

    #[test]
    fn category_defaults() {
        assert_eq!(Category::default(), Category::Nihonto);
        assert!(Category::Tosogu.default_item_types().contains(&"tsuba"));
        assert!(Category::All.default_item_types().is_empty());
        assert_eq!(Category::parse(" TOSOGU "), Some(Category::Tosogu));
        assert_eq!(Category::parse("armor"), None);
    }

    #[test]
    fn certification_spellings() {
        assert_eq!(canonical_certification("juyo"), Some("Juyo"));
        assert_eq!(canonical_certification("tokubetsu hozon"), Some("TokuHozon"));
        assert_eq!(canonical_certification("TOKUJU"), Some("Tokuju"));
        assert_eq!(canonical_certification("nbthk"), None);
    }

    #[test]
    fn certification_key_accepts_display_forms() {
        assert_eq!(certification_key("Tokubetsu Hozon"), Some("TokuHozon"));
        assert_eq!(certification_key("tokubetsu_juyo"), Some("Tokuju"));
        assert_eq!(certification_key(" Jūyō "), Some("Juyo"));
        assert_eq!(certification_key("Gold"), None);
    }

    #[test]
    fn signature_words() {
        assert_eq!(signature_status_for("mumei"), Some(SIGNATURE_UNSIGNED));
        assert_eq!(signature_status_for("zaimei"), Some(SIGNATURE_SIGNED));
        assert_eq!(signature_status_for("katana"), None);
    }
}
