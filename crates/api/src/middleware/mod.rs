//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the signed-in profile, from a Bearer token or the session cookie.
//! - [`auth::MaybeAuthUser`] -- the same, but optional.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role on the profile row.
//! - [`cron::RequireCronSecret`] -- shared-secret guard for scheduled jobs.

pub mod auth;
pub mod cron;
pub mod rbac;
