use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::Role;

/// Administrative user creation. Unlike self-registration the role is
/// chosen by the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
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

    #[serde(default)]
    pub role: Role,
}
