//! HTTP handlers for personnel-service.

pub mod auth;
pub mod metrics;
pub mod pengguna;
