//! Repository for the `listings` table.

use nihontowatch_core::types::{DbId, UserId};
use nihontowatch_core::url_state::SortOrder;
use sqlx::PgPool;

use crate::bind_params;
use crate::filter_sql::WhereClause;
use crate::models::listing::{
    Listing, UpdateListingArtisan, UpdateListingCert, UpdateListingStatus,
};

/// Column list for `listings` queries.
const COLUMNS: &str = "\
    id, url, title, item_type, price_value, price_currency, price_jpy, \
    smith, school, tosogu_maker, tosogu_school, cert_type, era, \
    signature_status, nagasa_cm, sori_cm, images, has_setsumei, \
    first_seen_at, status, is_available, is_sold, dealer_id, \
    artisan_id, artisan_confidence, artisan_verified_at, \
    created_at, updated_at";

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Recent => "first_seen_at DESC, id DESC",
        SortOrder::PriceAsc => "price_jpy ASC NULLS LAST, id DESC",
        SortOrder::PriceDesc => "price_jpy DESC NULLS LAST, id DESC",
    }
}

/// Provides filtered reads and admin corrections for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Find a listing by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Rows matching a rendered filter, in `sort` order.
    ///
    /// `limit = None` returns every match.
    pub async fn find_filtered(
        pool: &PgPool,
        clause: &WhereClause,
        sort: SortOrder,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let offset_idx = clause.next_param();
        let mut query = format!(
            "SELECT {COLUMNS} FROM listings WHERE {} ORDER BY {} OFFSET ${offset_idx}",
            clause.sql,
            order_clause(sort),
        );
        if limit.is_some() {
            query.push_str(&format!(" LIMIT ${}", offset_idx + 1));
        }

        let mut q = bind_params!(sqlx::query_as::<_, Listing>(&query), &clause.params);
        q = q.bind(offset);
        if let Some(limit) = limit {
            q = q.bind(limit);
        }
        q.fetch_all(pool).await
    }

    /// Number of rows matching a rendered filter.
    pub async fn count_filtered(pool: &PgPool, clause: &WhereClause) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM listings WHERE {}", clause.sql);
        bind_params!(sqlx::query_scalar::<_, i64>(&query), &clause.params)
            .fetch_one(pool)
            .await
    }

    /// Listings a user has favorited, most recently favorited first.
    pub async fn find_favorited_by(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let cols = COLUMNS
            .split(", ")
            .map(|c| format!("l.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT {cols} FROM listings l \
             JOIN user_favorites f ON f.listing_id = l.id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at DESC"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Available listings attributed to an artisan code.
    pub async fn count_available_by_artisan(pool: &PgPool, code: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings \
             WHERE UPPER(artisan_id) = UPPER($1) \
               AND (LOWER(status) = 'available' OR is_available IS TRUE)",
        )
        .bind(code)
        .fetch_one(pool)
        .await
    }

    /// Set or clear the certification. Returns the updated row if found.
    pub async fn update_cert(
        pool: &PgPool,
        id: DbId,
        input: &UpdateListingCert,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET cert_type = $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.cert_type)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the artisan attribution. `verified` stamps
    /// `artisan_verified_at`; otherwise it is cleared.
    pub async fn update_artisan(
        pool: &PgPool,
        id: DbId,
        input: &UpdateListingArtisan,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET \
                artisan_id = $1, \
                artisan_confidence = $2, \
                artisan_verified_at = CASE WHEN $3 THEN NOW() ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $4 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.artisan_id)
            .bind(&input.artisan_confidence)
            .bind(input.verified)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Override availability. Boolean columns left `None` keep their value.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        input: &UpdateListingStatus,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET \
                status = $1, \
                is_available = COALESCE($2, is_available), \
                is_sold = COALESCE($3, is_sold), \
                updated_at = NOW() \
             WHERE id = $4 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.status)
            .bind(input.is_available)
            .bind(input.is_sold)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
