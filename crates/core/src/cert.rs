//! NBTHK certification display and plausibility checks.
//!
//! Scrapers occasionally mis-tag a listing as Tokubetsu Juyo (the rarest
//! tier) from boilerplate on the dealer page. A genuine Tokuju blade is
//! never priced under the floor below, so a cheap listing whose title does
//! not itself mention the tier has its badge suppressed.

use serde::Serialize;

use crate::currency::ExchangeRates;
use crate::text::normalize_search_text;
use crate::vocab::canonical_certification;

/// Minimum plausible JPY price for a Tokubetsu Juyo item.
pub const TOKUJU_MIN_PRICE_JPY: f64 = 5_000_000.0;

/// Display information for a certification tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertInfo {
    /// Canonical key, e.g. `"TokuHozon"`.
    pub tier: &'static str,
    pub label: &'static str,
    pub short_label: &'static str,
    /// 1 (lowest) to 6 (highest).
    pub rank: u8,
}

fn cert_info(tier: &'static str) -> Option<CertInfo> {
    let (label, short_label, rank) = match tier {
        "Kicho" => ("Kicho", "Kicho", 1),
        "TokuKicho" => ("Tokubetsu Kicho", "TokuKicho", 2),
        "Hozon" => ("Hozon", "Hozon", 3),
        "TokuHozon" => ("Tokubetsu Hozon", "TokuHozon", 4),
        "Juyo" => ("Juyo", "Juyo", 5),
        "Tokuju" => ("Tokubetsu Juyo", "Tokuju", 6),
        _ => return None,
    };
    Some(CertInfo {
        tier,
        label,
        short_label,
        rank,
    })
}

/// Resolve a stored `cert_type` (any spelling) to its display info.
pub fn cert_info_for(cert_type: &str) -> Option<CertInfo> {
    let key = normalize_search_text(&cert_type.replace(['_', '-'], " "));
    canonical_certification(&key).and_then(cert_info)
}

fn title_mentions_tokuju(title: &str) -> bool {
    let t = normalize_search_text(&title.replace(['_', '-'], " "));
    t.contains("tokubetsu juyo") || t.contains("tokuju")
}

/// Certification info for a listing, with implausible Tokuju tags removed.
///
/// Returns `None` for a missing or unrecognised cert, or for a Tokuju tag
/// priced (after conversion) under [`TOKUJU_MIN_PRICE_JPY`] whose title
/// does not mention Tokubetsu Juyo. A title mention always passes, as does
/// a listing with no price or an unconvertible currency.
pub fn get_validated_cert_info(
    cert_type: Option<&str>,
    title: &str,
    price_value: Option<f64>,
    price_currency: Option<&str>,
    rates: &ExchangeRates,
) -> Option<CertInfo> {
    let info = cert_info_for(cert_type?)?;

    if info.tier == "Tokuju" && !title_mentions_tokuju(title) {
        let price_jpy =
            price_value.and_then(|v| rates.to_jpy(v, price_currency.unwrap_or("JPY")));
        if price_jpy.is_some_and(|p| p < TOKUJU_MIN_PRICE_JPY) {
            return None;
        }
    }

    Some(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ExchangeRates {
        ExchangeRates::default()
    }

    #[test]
    fn cheap_tokuju_without_mention_is_suppressed() {
        let info = get_validated_cert_info(
            Some("Tokuju"),
            "Katana by Kunihiro",
            Some(2_000_000.0),
            Some("JPY"),
            &rates(),
        );
        assert_eq!(info, None);
    }

    #[test]
    fn foreign_price_is_converted_before_the_check() {
        // 20,000 USD ≈ 3,000,000 JPY at the default rate.
        assert!(get_validated_cert_info(
            Some("Tokuju"),
            "Katana",
            Some(20_000.0),
            Some("USD"),
            &rates()
        )
        .is_none());
        // 50,000 USD ≈ 7,500,000 JPY.
        assert!(get_validated_cert_info(
            Some("Tokuju"),
            "Katana",
            Some(50_000.0),
            Some("USD"),
            &rates()
        )
        .is_some());
    }

    #[test]
    fn title_mention_passes_regardless_of_price() {
        for title in ["Tokubetsu Jūyō Tachi", "TOKUJU wakizashi"] {
            let info = get_validated_cert_info(
                Some("Tokuju"),
                title,
                Some(100_000.0),
                Some("JPY"),
                &rates(),
            );
            assert_eq!(info.map(|i| i.tier), Some("Tokuju"), "title {title}");
        }
    }

    #[test]
    fn ask_price_tokuju_passes() {
        assert!(get_validated_cert_info(Some("Tokuju"), "Katana", None, None, &rates()).is_some());
    }

    #[test]
    fn other_tiers_are_not_price_checked() {
        let info =
            get_validated_cert_info(Some("Juyo"), "Tanto", Some(10.0), Some("JPY"), &rates())
                .unwrap();
        assert_eq!(info.label, "Juyo");
        assert_eq!(info.rank, 5);
    }

    #[test]
    fn variant_spellings_resolve() {
        assert_eq!(cert_info_for("tokubetsu_hozon").map(|i| i.tier), Some("TokuHozon"));
        assert_eq!(cert_info_for("Tokubetsu-Juyo").map(|i| i.tier), Some("Tokuju"));
        assert_eq!(cert_info_for("Registration"), None);
    }

    #[test]
    fn missing_cert_is_none() {
        assert_eq!(get_validated_cert_info(None, "Katana", None, None, &rates()), None);
    }
}
