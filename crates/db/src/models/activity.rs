//! Activity event model, DTO and aggregate rows.

use nihontowatch_core::analytics::ActivityFacts;
use nihontowatch_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Accepted `event_type` values; mirrors the table's check constraint.
pub const EVENT_TYPES: &[&str] = &[
    "page_view",
    "listing_view",
    "dealer_click",
    "favorite",
    "search",
];

/// A row from the `activity_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityEvent {
    pub id: DbId,
    pub visitor_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<UserId>,
    pub event_type: String,
    pub listing_id: Option<DbId>,
    pub dealer_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub path: Option<String>,
    pub dwell_ms: Option<i64>,
    pub created_at: Timestamp,
}

impl ActivityEvent {
    pub fn facts(&self) -> ActivityFacts<'_> {
        ActivityFacts {
            visitor_id: self.visitor_id.as_deref(),
            session_id: self.session_id.as_deref(),
            event_type: &self.event_type,
            path: self.path.as_deref(),
            listing_id: self.listing_id,
        }
    }
}

/// DTO for recording an event. The IP address and user are filled in by
/// the handler, not the client.
#[derive(Debug, Deserialize)]
pub struct CreateActivityEvent {
    pub visitor_id: Option<String>,
    pub session_id: Option<String>,
    pub event_type: String,
    pub listing_id: Option<DbId>,
    pub dealer_id: Option<DbId>,
    pub path: Option<String>,
    pub dwell_ms: Option<i64>,
}

/// Click count per dealer over a window.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DealerClickCount {
    pub dealer_id: DbId,
    pub clicks: i64,
}

/// Summed listing-view dwell per dealer over a window.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DealerDwell {
    pub dealer_id: DbId,
    pub total_ms: i64,
    pub samples: i64,
}
