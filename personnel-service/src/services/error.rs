use service_core::error::AppError;
use thiserror::Error;

use crate::services::jwt::TokenError;
use crate::services::store::{IdentifierField, StoreError};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("phone number and password are required")]
    MissingCredentialInput,

    #[error("phone number or password incorrect")]
    InvalidCredentials,

    #[error("this account is not permitted to log in")]
    RoleNotPermitted,

    #[error("{0} already in use")]
    DuplicateIdentifier(IdentifierField),

    #[error("token missing")]
    MissingToken,

    #[error("invalid token")]
    InvalidSignature,

    #[error("token expired, please log in again")]
    Expired,

    #[error("user not found")]
    IdentityNotFound,

    #[error("insufficient role")]
    InsufficientRole,

    #[error("current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("user not found")]
    UserNotFound,

    #[error("department not found")]
    UnknownDepartment,

    #[error("cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Store error: {0}")]
    Store(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Short label used for metrics and rejection logs.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::MissingCredentialInput => "missing_credential_input",
            GatewayError::InvalidCredentials => "invalid_credentials",
            GatewayError::RoleNotPermitted => "role_not_permitted",
            GatewayError::DuplicateIdentifier(_) => "duplicate_identifier",
            GatewayError::MissingToken => "missing_token",
            GatewayError::InvalidSignature => "invalid_signature",
            GatewayError::Expired => "expired",
            GatewayError::IdentityNotFound => "identity_not_found",
            GatewayError::InsufficientRole => "insufficient_role",
            GatewayError::IncorrectCurrentPassword => "incorrect_current_password",
            GatewayError::UserNotFound => "user_not_found",
            GatewayError::UnknownDepartment => "unknown_department",
            GatewayError::CannotDeleteSelf => "cannot_delete_self",
            GatewayError::Store(_) => "store",
            GatewayError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => GatewayError::DuplicateIdentifier(field),
            StoreError::UnknownDepartment => GatewayError::UnknownDepartment,
            StoreError::Backend(e) => GatewayError::Store(e),
        }
    }
}

impl From<TokenError> for GatewayError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => GatewayError::InvalidSignature,
            TokenError::Expired => GatewayError::Expired,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let message = anyhow::anyhow!(err.to_string());
        match err {
            GatewayError::MissingCredentialInput
            | GatewayError::IncorrectCurrentPassword
            | GatewayError::UnknownDepartment
            | GatewayError::CannotDeleteSelf => AppError::BadRequest(message),
            GatewayError::InvalidCredentials
            | GatewayError::MissingToken
            | GatewayError::IdentityNotFound => AppError::Unauthorized(message),
            GatewayError::RoleNotPermitted
            | GatewayError::InvalidSignature
            | GatewayError::Expired
            | GatewayError::InsufficientRole => AppError::Forbidden(message),
            GatewayError::DuplicateIdentifier(_) => AppError::Conflict(message),
            GatewayError::UserNotFound => AppError::NotFound(message),
            GatewayError::Store(e) => AppError::DatabaseError(e),
            GatewayError::Internal(e) => AppError::InternalError(e),
        }
    }
}
