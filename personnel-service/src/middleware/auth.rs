use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{
    models::Identity,
    services::{metrics, CredentialStore, GatewayError, TokenService},
    AppState,
};

/// Resolve the caller behind `Authorization: Bearer <token>`.
///
/// Verifies the token and then looks the subject up among active users, so a
/// token outlives neither its expiry nor its account.
pub async fn authenticate_request(
    headers: &HeaderMap,
    tokens: &TokenService,
    store: &dyn CredentialStore,
) -> Result<Identity, GatewayError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(GatewayError::MissingToken)?;

    let claims = tokens.verify(token)?;
    let user_id = claims.subject_id().ok_or(GatewayError::InvalidSignature)?;

    let user = store
        .find_active_by_id(user_id)
        .await?
        .ok_or(GatewayError::IdentityNotFound)?;

    Ok(user.identity())
}

/// Middleware to require authentication
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match authenticate_request(req.headers(), &state.tokens, state.store.as_ref())
        .await
    {
        Ok(identity) => identity,
        Err(err) => {
            if !matches!(err, GatewayError::Store(_) | GatewayError::Internal(_)) {
                metrics::record_gate_rejection(err.reason());
                tracing::warn!(
                    reason = err.reason(),
                    path = %req.uri().path(),
                    "Authentication rejected"
                );
            }
            return Err(err.into());
        }
    };

    // Store identity in request extensions so handlers can access it
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the identity placed by [`authenticate`].
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Identity missing from request extensions"
            ))
        })?;

        Ok(CurrentUser(identity.clone()))
    }
}
