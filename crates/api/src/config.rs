use std::time::Duration;

use nihontowatch_core::currency::ExchangeRates;

use crate::auth::jwt::JwtConfig;

/// Default JPY floor applied to saved-search matching.
const DEFAULT_SAVED_SEARCH_MIN_PRICE_JPY: f64 = 100_000.0;
/// Default budget for the admin guard's profile lookup.
const DEFAULT_PROFILE_FETCH_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_GEO_API_URL: &str = "http://ip-api.com/batch";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible chat completion endpoint used for inquiry drafts.
/// Drafting falls back to a template when `api_url` or `api_key` is unset.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except `JWT_SECRET` have defaults suitable for local
/// development. Malformed values abort startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Session token verification.
    pub jwt: JwtConfig,
    /// Shared secret for `/cron/*`. Cron routes reject everything when unset.
    pub cron_secret: Option<String>,
    /// How long the admin guard waits for the profile row.
    pub profile_fetch_timeout: Duration,
    /// JPY floor for saved-search matches; `0` disables it.
    pub saved_search_min_price_jpy: f64,
    pub exchange_rates: ExchangeRates,
    pub geo_api_url: String,
    pub llm: LlmConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid value, got {raw:?}")),
        Err(_) => default,
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                       |
    /// | `CRON_SECRET`                | unset                      |
    /// | `PROFILE_FETCH_TIMEOUT_MS`   | `3000`                     |
    /// | `SAVED_SEARCH_MIN_PRICE_JPY` | `100000`                   |
    /// | `FX_USD_JPY` / `FX_EUR_JPY` / `FX_GBP_JPY` / `FX_AUD_JPY` | 150 / 163 / 190 / 98 |
    /// | `GEO_API_URL`                | `http://ip-api.com/batch`  |
    /// | `LLM_API_URL`, `LLM_API_KEY` | unset                      |
    /// | `LLM_MODEL`                  | `gpt-4o-mini`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = ExchangeRates::default();
        let exchange_rates = ExchangeRates {
            usd: env_or("FX_USD_JPY", defaults.usd),
            eur: env_or("FX_EUR_JPY", defaults.eur),
            gbp: env_or("FX_GBP_JPY", defaults.gbp),
            aud: env_or("FX_AUD_JPY", defaults.aud),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            cron_secret: env_opt("CRON_SECRET"),
            profile_fetch_timeout: Duration::from_millis(env_or(
                "PROFILE_FETCH_TIMEOUT_MS",
                DEFAULT_PROFILE_FETCH_TIMEOUT_MS,
            )),
            saved_search_min_price_jpy: env_or(
                "SAVED_SEARCH_MIN_PRICE_JPY",
                DEFAULT_SAVED_SEARCH_MIN_PRICE_JPY,
            ),
            exchange_rates,
            geo_api_url: env_opt("GEO_API_URL").unwrap_or_else(|| DEFAULT_GEO_API_URL.into()),
            llm: LlmConfig {
                api_url: env_opt("LLM_API_URL"),
                api_key: env_opt("LLM_API_KEY"),
                model: env_opt("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            },
        }
    }

    /// The saved-search price floor as matcher input.
    pub fn min_price_floor(&self) -> Option<f64> {
        Some(self.saved_search_min_price_jpy).filter(|v| *v > 0.0)
    }
}
