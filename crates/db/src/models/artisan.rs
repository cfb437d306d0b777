//! Artisan index entry.

use serde::Serialize;
use sqlx::FromRow;

/// A row from the `artisan_index` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArtisanEntry {
    pub code: String,
    pub name_romaji: String,
    pub name_normalized: String,
    /// `smith` or `tosogu`.
    pub kind: String,
    pub school: Option<String>,
}
