//! Repository for the `saved_searches` table.

use nihontowatch_core::types::{DbId, Timestamp, UserId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::saved_search::{CreateSavedSearch, SavedSearch, UpdateSavedSearch};

const COLUMNS: &str = "\
    id, user_id, name, criteria, last_checked_at, last_match_count, \
    created_at, updated_at";

/// Provides CRUD operations for saved searches.
pub struct SavedSearchRepo;

impl SavedSearchRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        input: &CreateSavedSearch,
    ) -> Result<SavedSearch, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_searches (user_id, name, criteria) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(Json(&input.criteria))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SavedSearch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM saved_searches WHERE id = $1");
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's saved searches, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<SavedSearch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM saved_searches WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every saved search, oldest check first (for the cron run).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SavedSearch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM saved_searches ORDER BY last_checked_at ASC NULLS FIRST, id"
        );
        sqlx::query_as::<_, SavedSearch>(&query).fetch_all(pool).await
    }

    /// Update a saved search. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSavedSearch,
    ) -> Result<Option<SavedSearch>, sqlx::Error> {
        let query = format!(
            "UPDATE saved_searches SET \
                name = COALESCE($2, name), \
                criteria = COALESCE($3, criteria), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.criteria.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Record the outcome of a matcher run.
    pub async fn mark_checked(
        pool: &PgPool,
        id: DbId,
        checked_at: Timestamp,
        match_count: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE saved_searches SET last_checked_at = $2, last_match_count = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(checked_at)
        .bind(match_count)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a saved search. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
