//! Repository for the `dealers` table.

use nihontowatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::dealer::Dealer;

const COLUMNS: &str = "\
    id, name, domain, country, ships_international, accepts_wire, \
    accepts_paypal, accepts_credit_card, is_active, created_at, updated_at";

pub struct DealerRepo;

impl DealerRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dealer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dealers WHERE id = $1");
        sqlx::query_as::<_, Dealer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All active dealers, by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Dealer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dealers WHERE is_active ORDER BY name");
        sqlx::query_as::<_, Dealer>(&query).fetch_all(pool).await
    }
}
