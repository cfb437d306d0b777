//! Saved search entity model and DTOs.

use nihontowatch_core::criteria::SavedSearchCriteria;
use nihontowatch_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `saved_searches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedSearch {
    pub id: DbId,
    pub user_id: UserId,
    pub name: String,
    pub criteria: Json<SavedSearchCriteria>,
    pub last_checked_at: Option<Timestamp>,
    pub last_match_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a saved search.
#[derive(Debug, Deserialize)]
pub struct CreateSavedSearch {
    pub name: String,
    pub criteria: SavedSearchCriteria,
}

/// DTO for updating a saved search. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSavedSearch {
    pub name: Option<String>,
    pub criteria: Option<SavedSearchCriteria>,
}
