//! Listing entity model and admin correction DTOs.

use nihontowatch_core::filter::ListingFacts;
use nihontowatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    pub url: String,
    pub title: String,
    pub item_type: Option<String>,
    pub price_value: Option<f64>,
    pub price_currency: Option<String>,
    pub price_jpy: Option<f64>,
    pub smith: Option<String>,
    pub school: Option<String>,
    pub tosogu_maker: Option<String>,
    pub tosogu_school: Option<String>,
    pub cert_type: Option<String>,
    pub era: Option<String>,
    pub signature_status: Option<String>,
    pub nagasa_cm: Option<f64>,
    pub sori_cm: Option<f64>,
    pub images: serde_json::Value,
    pub has_setsumei: bool,
    pub first_seen_at: Timestamp,
    pub status: Option<String>,
    pub is_available: Option<bool>,
    pub is_sold: Option<bool>,
    pub dealer_id: DbId,
    pub artisan_id: Option<String>,
    pub artisan_confidence: Option<String>,
    pub artisan_verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// Borrow the columns the listing filter evaluates.
    pub fn facts(&self) -> ListingFacts<'_> {
        ListingFacts {
            title: &self.title,
            item_type: self.item_type.as_deref(),
            status: self.status.as_deref(),
            is_available: self.is_available,
            is_sold: self.is_sold,
            price_value: self.price_value,
            price_jpy: self.price_jpy,
            first_seen_at: self.first_seen_at,
            cert_type: self.cert_type.as_deref(),
            smith: self.smith.as_deref(),
            school: self.school.as_deref(),
            tosogu_maker: self.tosogu_maker.as_deref(),
            tosogu_school: self.tosogu_school.as_deref(),
            era: self.era.as_deref(),
            signature_status: self.signature_status.as_deref(),
            has_setsumei: self.has_setsumei,
            nagasa_cm: self.nagasa_cm,
            sori_cm: self.sori_cm,
            dealer_id: self.dealer_id,
            artisan_id: self.artisan_id.as_deref(),
        }
    }
}

/// DTO for correcting a listing's certification. `None` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateListingCert {
    pub cert_type: Option<String>,
}

/// DTO for assigning or clearing an artisan attribution.
#[derive(Debug, Deserialize)]
pub struct UpdateListingArtisan {
    pub artisan_id: Option<String>,
    pub artisan_confidence: Option<String>,
    /// Marks the attribution as human-verified.
    #[serde(default)]
    pub verified: bool,
}

/// DTO for overriding availability.
#[derive(Debug, Deserialize)]
pub struct UpdateListingStatus {
    pub status: String,
    pub is_available: Option<bool>,
    pub is_sold: Option<bool>,
}
