//! Domain logic for the Nihontowatch listing aggregator.
//!
//! Everything in this crate is pure: no database, HTTP, or clock access.
//! The `db` and `api` crates feed it rows and request data and act on
//! what it returns.

pub mod analytics;
pub mod artisan;
pub mod auth_cache;
pub mod cert;
pub mod criteria;
pub mod currency;
pub mod error;
pub mod filter;
pub mod geo;
pub mod inquiry;
pub mod numeric;
pub mod quickview;
pub mod roles;
pub mod semantic;
pub mod signup_pressure;
pub mod text;
pub mod types;
pub mod url_state;
pub mod vocab;
