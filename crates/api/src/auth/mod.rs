//! Session token verification.
//!
//! Sessions are issued by the external auth provider; this server only
//! verifies them. See [`jwt`].

pub mod jwt;
