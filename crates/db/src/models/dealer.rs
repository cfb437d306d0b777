//! Dealer entity model.

use nihontowatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dealers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dealer {
    pub id: DbId,
    pub name: String,
    pub domain: String,
    pub country: String,
    pub ships_international: bool,
    pub accepts_wire: bool,
    pub accepts_paypal: bool,
    pub accepts_credit_card: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
