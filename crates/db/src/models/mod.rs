//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, plus the `Deserialize` DTOs the api crate accepts.

pub mod activity;
pub mod artisan;
pub mod dealer;
pub mod favorite;
pub mod listing;
pub mod profile;
pub mod saved_search;
