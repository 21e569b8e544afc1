pub mod auth;
pub mod metrics;
pub mod role;

pub use auth::{authenticate, authenticate_request, CurrentUser};
pub use metrics::metrics_middleware;
pub use role::{authorize, require_admin, require_roles, AccessDecision};
