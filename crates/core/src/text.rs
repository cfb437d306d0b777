//! Search text normalisation.
//!
//! Romanised Japanese arrives with and without macrons ("Gotō" / "Goto",
//! "Jūyō" / "Juyo"); every comparison in the search pipeline runs on the
//! normalised form.

use crate::vocab::item_types_for;

/// Replace long-vowel marks (macrons and circumflexes) with the plain vowel.
///
/// Case is preserved: `"Jūyō"` becomes `"Juyo"`.
pub fn remove_macrons(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ā' | 'â' => 'a',
            'ī' | 'î' => 'i',
            'ū' | 'û' => 'u',
            'ē' | 'ê' => 'e',
            'ō' | 'ô' => 'o',
            'Ā' | 'Â' => 'A',
            'Ī' | 'Î' => 'I',
            'Ū' | 'Û' => 'U',
            'Ē' | 'Ê' => 'E',
            'Ō' | 'Ô' => 'O',
            other => other,
        })
        .collect()
}

/// Lowercase long-vowel characters and their plain replacements, position
/// for position. Used to fold database columns the same way
/// [`remove_macrons`] folds text in memory.
pub const FOLD_FROM: &str = "āâīîūûēêōô";
pub const FOLD_TO: &str = "aaiiuueeoo";

/// Lowercase and strip macrons without collapsing whitespace.
pub fn fold_for_match(input: &str) -> String {
    remove_macrons(input).to_lowercase()
}

/// Trim, lowercase, strip macrons and collapse internal whitespace.
///
/// ```
/// use nihontowatch_core::text::normalize_search_text;
/// assert_eq!(normalize_search_text("  Gotō "), "goto");
/// assert_eq!(normalize_search_text("Tokubetsu   Jūyō"), "tokubetsu juyo");
/// ```
pub fn normalize_search_text(input: &str) -> String {
    remove_macrons(input)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand a search term into itself plus any item types it is an alias for.
///
/// The original (normalised) term is always first; expansions follow in
/// vocabulary order without duplicates.
pub fn expand_search_aliases(term: &str) -> Vec<String> {
    let normalized = normalize_search_text(term);
    let mut out = vec![normalized.clone()];
    if let Some(types) = item_types_for(&normalized) {
        for t in types {
            if !out.iter().any(|existing| existing == t) {
                out.push(t.to_string());
            }
        }
    }
    out
}
