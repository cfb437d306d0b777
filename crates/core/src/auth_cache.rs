//! Cached authentication snapshot used to pick the initial auth state.
//!
//! A client that has recently confirmed its session may start out as
//! `Authenticated` without waiting for a round trip. Anything older than
//! the TTL, or a cache for a different user, starts as `Unknown` and must
//! be confirmed again.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

/// Default lifetime of a cached snapshot.
pub const DEFAULT_AUTH_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCache {
    pub user_id: UserId,
    pub is_admin: bool,
    pub cached_at: Timestamp,
}

impl AuthCache {
    pub fn new(user_id: UserId, is_admin: bool, now: Timestamp) -> Self {
        Self {
            user_id,
            is_admin,
            cached_at: now,
        }
    }

    /// A snapshot is fresh when it is younger than `ttl`. Timestamps in the
    /// future (clock skew) are treated as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let Ok(age) = (now - self.cached_at).to_std() else {
            return false;
        };
        age < ttl
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InitialAuthState {
    Authenticated { user_id: UserId, is_admin: bool },
    Unknown,
}

pub fn initial_auth_state(
    cache: Option<&AuthCache>,
    now: Timestamp,
    ttl: Duration,
) -> InitialAuthState {
    match cache {
        Some(c) if c.is_fresh(now, ttl) => InitialAuthState::Authenticated {
            user_id: c.user_id,
            is_admin: c.is_admin,
        },
        _ => InitialAuthState::Unknown,
    }
}
