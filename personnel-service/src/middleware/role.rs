use axum::{extract::Request, middleware::Next, response::Response};
use service_core::error::AppError;

use crate::{
    models::{Identity, Role, ADMIN_ROLES},
    services::{metrics, GatewayError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

/// The single role check.
pub fn authorize(role: Role, allowed: &[Role]) -> AccessDecision {
    if allowed.contains(&role) {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny
    }
}

/// Must run behind `authenticate`; a request without an identity is a
/// routing mistake and fails as an internal error.
pub async fn require_roles(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<Identity>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "Role gate reached without an authenticated identity"
        ))
    })?;

    if authorize(identity.role, allowed) == AccessDecision::Deny {
        let err = GatewayError::InsufficientRole;
        metrics::record_gate_rejection(err.reason());
        tracing::warn!(
            user_id = identity.id,
            role = %identity.role,
            path = %req.uri().path(),
            "Role gate rejected request"
        );
        return Err(err.into());
    }

    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_roles(ADMIN_ROLES, req, next).await
}
