//! Repository for the `artisan_index` table.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::artisan::ArtisanEntry;

const COLUMNS: &str = "code, name_romaji, name_normalized, kind, school";

pub struct ArtisanRepo;

impl ArtisanRepo {
    /// Resolve normalised name words to artisan codes. A word matches an
    /// entry whose normalised name equals it or contains it as a whole word.
    pub async fn codes_for_words(
        pool: &PgPool,
        words: &[String],
    ) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
        if words.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT w.word, a.code \
             FROM unnest($1::text[]) AS w(word) \
             JOIN artisan_index a \
               ON a.name_normalized = w.word \
               OR w.word = ANY(string_to_array(a.name_normalized, ' ')) \
             ORDER BY w.word, a.code",
        )
        .bind(words)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (word, code) in rows {
            map.entry(word).or_default().push(code);
        }
        Ok(map)
    }

    /// Prefix search on the normalised name or the code.
    pub async fn search(
        pool: &PgPool,
        normalized_prefix: &str,
        limit: i64,
    ) -> Result<Vec<ArtisanEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM artisan_index \
             WHERE name_normalized LIKE $1 OR UPPER(code) LIKE UPPER($1) \
             ORDER BY name_normalized, code \
             LIMIT $2"
        );
        let pattern = format!(
            "{}%",
            nihontowatch_core::filter::escape_like(normalized_prefix)
        );
        sqlx::query_as::<_, ArtisanEntry>(&query)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<ArtisanEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM artisan_index WHERE UPPER(code) = UPPER($1)");
        sqlx::query_as::<_, ArtisanEntry>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
