//! Numeric comparison extraction ("price>5000", "cm<70", "usd>=5k").

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::currency::ExchangeRates;

static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)(>=|<=|>|<|=)([0-9][0-9,]*(?:\.[0-9]+)?)([km]?)$")
        .expect("valid regex")
});

/// Listing column a numeric filter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    /// Price normalised to JPY.
    PriceJpy,
    NagasaCm,
    SoriCm,
}

impl NumericField {
    pub fn column(self) -> &'static str {
        match self {
            NumericField::PriceJpy => "price_jpy",
            NumericField::NagasaCm => "nagasa_cm",
            NumericField::SoriCm => "sori_cm",
        }
    }
}

/// Comparison operator. Strict and inclusive forms are treated alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericOp {
    Gte,
    Lte,
    Eq,
}

impl NumericOp {
    pub fn sql(self) -> &'static str {
        match self {
            NumericOp::Gte => ">=",
            NumericOp::Lte => "<=",
            NumericOp::Eq => "=",
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            NumericOp::Gte => lhs >= rhs,
            NumericOp::Lte => lhs <= rhs,
            NumericOp::Eq => (lhs - rhs).abs() < f64::EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericFilter {
    pub field: NumericField,
    pub op: NumericOp,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericParse {
    pub filters: Vec<NumericFilter>,
    pub text_words: Vec<String>,
}

/// Resolve a field keyword to its column and a multiplier into the
/// column's unit (JPY for price fields).
fn field_for(keyword: &str, rates: &ExchangeRates) -> Option<(NumericField, f64)> {
    match keyword {
        "price" | "yen" | "jpy" => Some((NumericField::PriceJpy, 1.0)),
        "usd" => Some((NumericField::PriceJpy, rates.usd)),
        "eur" => Some((NumericField::PriceJpy, rates.eur)),
        "gbp" => Some((NumericField::PriceJpy, rates.gbp)),
        "aud" => Some((NumericField::PriceJpy, rates.aud)),
        "cm" | "nagasa" => Some((NumericField::NagasaCm, 1.0)),
        "sori" => Some((NumericField::SoriCm, 1.0)),
        _ => None,
    }
}

fn parse_token(token: &str, rates: &ExchangeRates) -> Option<NumericFilter> {
    let caps = COMPARISON_RE.captures(token.trim())?;
    let (field, multiplier) = field_for(&caps[1].to_ascii_lowercase(), rates)?;

    let op = match &caps[2] {
        ">" | ">=" => NumericOp::Gte,
        "<" | "<=" => NumericOp::Lte,
        _ => NumericOp::Eq,
    };

    let number: f64 = caps[3].replace(',', "").parse().ok()?;
    let scale = match caps[4].to_ascii_lowercase().as_str() {
        "k" => 1_000.0,
        "m" => 1_000_000.0,
        _ => 1.0,
    };

    Some(NumericFilter {
        field,
        op,
        value: number * scale * multiplier,
    })
}

/// Split terms into numeric comparisons and plain words.
pub fn parse_numeric_filters<S: AsRef<str>>(terms: &[S], rates: &ExchangeRates) -> NumericParse {
    let mut out = NumericParse::default();
    for term in terms {
        let term = term.as_ref();
        match parse_token(term, rates) {
            Some(filter) => out.filters.push(filter),
            None => out.text_words.push(term.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ExchangeRates {
        ExchangeRates::default()
    }

    #[test]
    fn price_greater_than_maps_to_gte() {
        let parsed = parse_numeric_filters(&["price>500000"], &rates());
        assert_eq!(
            parsed.filters,
            vec![NumericFilter {
                field: NumericField::PriceJpy,
                op: NumericOp::Gte,
                value: 500000.0,
            }]
        );
        assert!(parsed.text_words.is_empty());
    }

    #[test]
    fn cm_less_than() {
        let parsed = parse_numeric_filters(&["cm<70"], &rates());
        assert_eq!(parsed.filters[0].field, NumericField::NagasaCm);
        assert_eq!(parsed.filters[0].op, NumericOp::Lte);
        assert_eq!(parsed.filters[0].value, 70.0);
    }

    #[test]
    fn usd_converts_to_jpy() {
        let r = rates();
        let parsed = parse_numeric_filters(&["USD>5000"], &r);
        assert_eq!(parsed.filters[0].field, NumericField::PriceJpy);
        assert_eq!(parsed.filters[0].value, 5000.0 * r.usd);
    }

    #[test]
    fn suffixes_and_separators() {
        let parsed = parse_numeric_filters(&["price<=1.5m", "yen>=250,000", "jpy=5k"], &rates());
        let values: Vec<f64> = parsed.filters.iter().map(|f| f.value).collect();
        assert_eq!(values, vec![1_500_000.0, 250_000.0, 5_000.0]);
        assert_eq!(parsed.filters[2].op, NumericOp::Eq);
    }

    #[test]
    fn unknown_fields_and_plain_words_pass_through() {
        let parsed = parse_numeric_filters(&["bizen", "weight>500", "nagasa>"], &rates());
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.text_words, vec!["bizen", "weight>500", "nagasa>"]);
    }

    #[test]
    fn op_semantics() {
        assert!(NumericOp::Gte.holds(10.0, 10.0));
        assert!(!NumericOp::Lte.holds(10.5, 10.0));
        assert!(NumericOp::Eq.holds(3.0, 3.0));
    }
}
