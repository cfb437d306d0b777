//! Currency conversion to JPY.
//!
//! Dealers quote in their local currency; all price comparisons (floors,
//! ranges, cert plausibility) happen in JPY.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USD_JPY: f64 = 150.0;
pub const DEFAULT_EUR_JPY: f64 = 163.0;
pub const DEFAULT_GBP_JPY: f64 = 190.0;
pub const DEFAULT_AUD_JPY: f64 = 98.0;

/// JPY per one unit of each supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub usd: f64,
    pub eur: f64,
    pub gbp: f64,
    pub aud: f64,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            usd: DEFAULT_USD_JPY,
            eur: DEFAULT_EUR_JPY,
            gbp: DEFAULT_GBP_JPY,
            aud: DEFAULT_AUD_JPY,
        }
    }
}

impl ExchangeRates {
    /// JPY per unit of `currency` (ISO code, case-insensitive).
    pub fn rate(&self, currency: &str) -> Option<f64> {
        match currency.trim().to_ascii_uppercase().as_str() {
            "JPY" | "" => Some(1.0),
            "USD" => Some(self.usd),
            "EUR" => Some(self.eur),
            "GBP" => Some(self.gbp),
            "AUD" => Some(self.aud),
            _ => None,
        }
    }

    /// Convert an amount to JPY. Unknown currencies yield `None`.
    pub fn to_jpy(&self, value: f64, currency: &str) -> Option<f64> {
        self.rate(currency).map(|r| value * r)
    }
}
