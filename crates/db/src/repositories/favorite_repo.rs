//! Repository for the `user_favorites` table.

use nihontowatch_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::favorite::Favorite;

const COLUMNS: &str = "id, user_id, listing_id, created_at";

pub struct FavoriteRepo;

impl FavoriteRepo {
    /// Add a favorite. Adding one that already exists returns the existing row.
    pub async fn add(
        pool: &PgPool,
        user_id: UserId,
        listing_id: DbId,
    ) -> Result<Favorite, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_favorites (user_id, listing_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, listing_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Favorite>(&query)
            .bind(user_id)
            .bind(listing_id)
            .fetch_one(pool)
            .await
    }

    /// Remove a favorite. Returns `true` if a row was removed.
    pub async fn remove(pool: &PgPool, user_id: UserId, listing_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND listing_id = $2")
            .bind(user_id)
            .bind(listing_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
