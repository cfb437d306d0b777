//! User favorite model and DTO.

use nihontowatch_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_favorites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Favorite {
    pub id: DbId,
    pub user_id: UserId,
    pub listing_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateFavorite {
    pub listing_id: DbId,
}
