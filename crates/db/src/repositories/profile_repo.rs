//! Repository for the `profiles` table.

use nihontowatch_core::types::UserId;
use sqlx::PgPool;

use crate::models::profile::Profile;

const COLUMNS: &str = "id, email, display_name, role, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Only the role column; used on the admin guard's hot path.
    pub async fn find_role(pool: &PgPool, id: UserId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
