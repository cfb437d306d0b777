//! Shared-secret guard for scheduled job endpoints.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Alternate header for schedulers that cannot set `Authorization`.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Passes when the request carries `CRON_SECRET` as a Bearer token or in
/// [`CRON_SECRET_HEADER`]. With no secret configured, every request fails.
pub struct RequireCronSecret;

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn presented_secret(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer
        .or_else(|| {
            parts
                .headers
                .get(CRON_SECRET_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .map(str::trim)
}

impl FromRequestParts<AppState> for RequireCronSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.cron_secret.as_deref() else {
            tracing::warn!("Cron request rejected: CRON_SECRET is not configured");
            return Err(AppError::unauthorized("Cron secret not configured"));
        };
        match presented_secret(parts) {
            Some(given) if constant_time_eq(given, expected) => Ok(RequireCronSecret),
            _ => Err(AppError::unauthorized("Invalid cron secret")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_only_equal_strings() {
        assert!(constant_time_eq("s3cret", "s3cret"));
        assert!(!constant_time_eq("s3cret", "s3creT"));
        assert!(!constant_time_eq("s3cret", "s3cret!"));
    }
}
