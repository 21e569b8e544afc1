use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserProfile;

/// Missing fields deserialize as empty so the service can answer with
/// its own "required" error instead of a body rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(rename = "nomorTelepon", default)]
    pub phone_number: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "nama")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(rename = "nomorTelepon")]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default, deserialize_with = "super::empty_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(rename = "tanggalLahir", default)]
    pub birth_date: Option<NaiveDate>,

    #[serde(rename = "departemenId", default)]
    pub department_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(rename = "newPassword")]
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

/// Token plus the signed-in user's profile.
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}
