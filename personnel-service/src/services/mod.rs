//! Services layer for personnel-service.
//!
//! Credential storage, token handling, and the login/registration flows
//! built on them.

mod auth;
mod database;
pub mod error;
mod jwt;
pub mod metrics;
pub mod store;

pub use auth::AuthService;
pub use database::PgCredentialStore;
pub use error::GatewayError;
pub use jwt::{IssuedToken, TokenClaims, TokenError, TokenService};
pub use store::{CredentialStore, IdentifierField, MemoryCredentialStore, StoreError};
