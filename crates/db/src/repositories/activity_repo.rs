//! Repository for the `activity_events` table.

use nihontowatch_core::types::{Timestamp, UserId};
use sqlx::PgPool;

use crate::models::activity::{ActivityEvent, CreateActivityEvent, DealerClickCount, DealerDwell};

const COLUMNS: &str = "\
    id, visitor_id, session_id, user_id, event_type, listing_id, dealer_id, \
    ip_address, path, dwell_ms, created_at";

/// Upper bound on rows pulled for in-process visitor tallies.
pub const MAX_EVENTS_PER_QUERY: i64 = 50_000;

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn insert(
        pool: &PgPool,
        input: &CreateActivityEvent,
        user_id: Option<UserId>,
        ip_address: Option<&str>,
    ) -> Result<ActivityEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_events \
                (visitor_id, session_id, user_id, event_type, listing_id, dealer_id, \
                 ip_address, path, dwell_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityEvent>(&query)
            .bind(&input.visitor_id)
            .bind(&input.session_id)
            .bind(user_id)
            .bind(&input.event_type)
            .bind(input.listing_id)
            .bind(input.dealer_id)
            .bind(ip_address)
            .bind(&input.path)
            .bind(input.dwell_ms)
            .fetch_one(pool)
            .await
    }

    /// Events in `[from, to)`, oldest first, capped at [`MAX_EVENTS_PER_QUERY`].
    pub async fn list_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<ActivityEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_events \
             WHERE created_at >= $1 AND created_at < $2 \
             ORDER BY created_at \
             LIMIT $3"
        );
        sqlx::query_as::<_, ActivityEvent>(&query)
            .bind(from)
            .bind(to)
            .bind(MAX_EVENTS_PER_QUERY)
            .fetch_all(pool)
            .await
    }

    /// `dealer_click` events per dealer since `from`.
    pub async fn dealer_click_counts(
        pool: &PgPool,
        from: Timestamp,
    ) -> Result<Vec<DealerClickCount>, sqlx::Error> {
        sqlx::query_as::<_, DealerClickCount>(
            "SELECT dealer_id, COUNT(*) AS clicks FROM activity_events \
             WHERE event_type = 'dealer_click' AND dealer_id IS NOT NULL AND created_at >= $1 \
             GROUP BY dealer_id",
        )
        .bind(from)
        .fetch_all(pool)
        .await
    }

    /// Summed `listing_view` dwell per dealer since `from`, attributed via
    /// the viewed listing.
    pub async fn dealer_dwell_totals(
        pool: &PgPool,
        from: Timestamp,
    ) -> Result<Vec<DealerDwell>, sqlx::Error> {
        sqlx::query_as::<_, DealerDwell>(
            "SELECT l.dealer_id, \
                    COALESCE(SUM(e.dwell_ms), 0)::BIGINT AS total_ms, \
                    COUNT(e.dwell_ms) AS samples \
             FROM activity_events e \
             JOIN listings l ON l.id = e.listing_id \
             WHERE e.event_type = 'listing_view' AND e.dwell_ms IS NOT NULL AND e.created_at >= $1 \
             GROUP BY l.dealer_id",
        )
        .bind(from)
        .fetch_all(pool)
        .await
    }
}
