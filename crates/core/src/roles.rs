//! Well-known profile role constants.
//!
//! These must match the `profiles.role` check constraint in
//! `20260301000003_create_profiles.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
