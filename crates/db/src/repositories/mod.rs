//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod artisan_repo;
pub mod cert_variant_repo;
pub mod dealer_repo;
pub mod favorite_repo;
pub mod listing_repo;
pub mod profile_repo;
pub mod saved_search_repo;

pub use activity_repo::ActivityRepo;
pub use artisan_repo::ArtisanRepo;
pub use cert_variant_repo::CertVariantRepo;
pub use dealer_repo::DealerRepo;
pub use favorite_repo::FavoriteRepo;
pub use listing_repo::ListingRepo;
pub use profile_repo::ProfileRepo;
pub use saved_search_repo::SavedSearchRepo;
