//! Role model - the closed set of roles a user can hold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role.
///
/// Stored and serialized with the codes the database and the frontend use
/// (`KARYAWAN`, `SUPERVISOR`, `ADMIN`, `SUPER_ADMIN`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular employee; the role every self-registered account gets.
    #[default]
    #[serde(rename = "KARYAWAN")]
    Employee,
    #[serde(rename = "SUPERVISOR")]
    Supervisor,
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "SUPER_ADMIN")]
    SuperAdmin,
}

/// Roles allowed through administrative routes.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

impl Role {
    pub const ALL: [Role; 4] = [Role::Employee, Role::Supervisor, Role::Admin, Role::SuperAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "KARYAWAN",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: only the stored codes are roles.
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Invalid role: {}", s))
    }
}
