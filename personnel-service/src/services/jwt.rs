use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Tampered, signed with another secret, malformed, or naming a
    /// subject that is not a user id.
    #[error("invalid token")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    pub fn subject_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        tracing::info!(
            expiry_minutes = config.expiry_minutes,
            "Token service initialized with HS256"
        );

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_minutes: config.expiry_minutes,
        }
    }

    /// Issue a token for `subject_id`, valid from now.
    pub fn issue(&self, subject_id: i32) -> Result<IssuedToken, anyhow::Error> {
        self.issue_at(subject_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject_id: i32,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, anyhow::Error> {
        let expires_at = Duration::try_minutes(self.expiry_minutes)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                anyhow::anyhow!("Token lifetime of {} minutes is out of range", self.expiry_minutes)
            })?;

        let claims = TokenClaims {
            sub: subject_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature first, then expiry. Expired means `now > exp`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })?
            .claims;

        if claims.subject_id().is_none() {
            return Err(TokenError::InvalidSignature);
        }

        Ok(claims)
    }
}
