//! Database, configuration and auth models.

#[cfg(feature = "server")]
pub mod auth;
pub mod booking;
#[cfg(feature = "server")]
pub mod config;
