//! User model - credential-bearing records and the views handed to callers.
//!
//! Only [`Identity`] and [`UserProfile`] are serializable; a [`UserRecord`]
//! carries the password hash and never leaves the service layer as-is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::str::FromStr;

use crate::models::Role;
use crate::utils::PasswordHashString;

/// Lifecycle state codes. Users are soft deleted, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Deleted,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Deleted => "deleted",
        }
    }
}

impl FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LifecycleState::Active),
            "deleted" => Ok(LifecycleState::Deleted),
            _ => Err(format!("Invalid lifecycle state: {}", s)),
        }
    }
}

/// Persisted user: identity, contact details and credential.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    pub department_id: Option<i32>,
    pub password_hash: PasswordHashString,
    pub lifecycle: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn is_active(&self) -> bool {
        self.lifecycle == LifecycleState::Active
    }

    /// Identity attached to authenticated requests.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            display_name: self.name.clone(),
            role: self.role,
            department_id: self.department_id,
        }
    }

    /// Convert to a profile response (no credential).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            birth_date: self.birth_date,
            role: self.role,
            department_id: self.department_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Authenticated actor as seen by handlers. Read-only, no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(rename = "nomor")]
    pub id: i32,
    #[serde(rename = "nama")]
    pub display_name: String,
    pub role: Role,
    #[serde(rename = "departemenId")]
    pub department_id: Option<i32>,
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(rename = "nomor")]
    pub id: i32,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "nomorTelepon")]
    pub phone_number: String,
    #[serde(rename = "tanggalLahir")]
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    #[serde(rename = "departemenId")]
    pub department_id: Option<i32>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    pub department_id: Option<i32>,
    pub password_hash: PasswordHashString,
}

/// Raw `pengguna` row.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub nomor: i32,
    pub nama: String,
    pub email: Option<String>,
    pub nomor_telepon: String,
    pub tanggal_lahir: Option<NaiveDate>,
    pub role: String,
    pub departemen_id: Option<i32>,
    pub password_hash: String,
    pub lifecycle_state_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.nomor,
            name: row.nama,
            email: row.email,
            phone_number: row.nomor_telepon,
            birth_date: row.tanggal_lahir,
            role: row.role.parse().map_err(anyhow::Error::msg)?,
            department_id: row.departemen_id,
            password_hash: PasswordHashString::new(row.password_hash),
            lifecycle: row
                .lifecycle_state_code
                .parse()
                .map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
