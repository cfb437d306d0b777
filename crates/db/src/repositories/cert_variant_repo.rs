//! Repository for the `certification_variants` table.

use std::collections::HashMap;

use sqlx::PgPool;

pub struct CertVariantRepo;

impl CertVariantRepo {
    /// Alternate stored spellings for each canonical key. Keys with no
    /// variants are absent from the map.
    pub async fn variants_for(
        pool: &PgPool,
        canonical: &[String],
    ) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
        if canonical.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT canonical, variant FROM certification_variants \
             WHERE canonical = ANY($1) ORDER BY canonical, variant",
        )
        .bind(canonical)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (canonical, variant) in rows {
            map.entry(canonical).or_default().push(variant);
        }
        Ok(map)
    }
}
