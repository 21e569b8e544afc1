use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::{LifecycleState, NewUser, UserRecord};
use crate::utils::PasswordHashString;

/// Identifier that must be unique among active users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    PhoneNumber,
    Email,
}

impl fmt::Display for IdentifierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierField::PhoneNumber => f.write_str("phone number"),
            IdentifierField::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already in use")]
    Duplicate(IdentifierField),

    #[error("department does not exist")]
    UnknownDepartment,

    #[error("Store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Persistence for user credentials. Every lookup sees active users only.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_active_by_phone(&self, phone_number: &str)
        -> Result<Option<UserRecord>, StoreError>;

    /// Case-insensitive.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_active_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError>;

    /// Insert an active user. Uniqueness is checked atomically with the insert.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Returns false when no active user has `id`.
    async fn update_password(
        &self,
        id: i32,
        password_hash: &PasswordHashString,
    ) -> Result<bool, StoreError>;

    /// Mark an active user deleted. Returns false when no active user has `id`.
    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

/// In-process store used by tests and local runs.
#[derive(Default)]
pub struct MemoryCredentialStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    departments: HashSet<i32>,
    next_id: i32,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a department id that new users may reference.
    pub fn with_department(self, id: i32) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.departments.insert(id);
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("Memory store mutex poisoned: {}", e)))
    }

    fn find_active<F>(&self, predicate: F) -> Result<Option<UserRecord>, StoreError>
    where
        F: Fn(&UserRecord) -> bool,
    {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.is_active() && predicate(u))
            .cloned())
    }
}

fn same_email(stored: Option<&str>, candidate: &str) -> bool {
    stored.is_some_and(|e| e.to_lowercase() == candidate.to_lowercase())
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_active_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        self.find_active(|u| u.phone_number == phone_number)
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_active(|u| same_email(u.email.as_deref(), email))
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        self.find_active(|u| u.id == id)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut state = self.lock()?;

        for existing in state.users.iter().filter(|u| u.is_active()) {
            if existing.phone_number == user.phone_number {
                return Err(StoreError::Duplicate(IdentifierField::PhoneNumber));
            }
            if let Some(email) = user.email.as_deref() {
                if same_email(existing.email.as_deref(), email) {
                    return Err(StoreError::Duplicate(IdentifierField::Email));
                }
            }
        }
        if let Some(department_id) = user.department_id {
            if !state.departments.contains(&department_id) {
                return Err(StoreError::UnknownDepartment);
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: state.next_id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            birth_date: user.birth_date,
            role: user.role,
            department_id: user.department_id,
            password_hash: user.password_hash,
            lifecycle: LifecycleState::Active,
            created_at: now,
            updated_at: now,
        };
        state.users.push(record.clone());

        Ok(record)
    }

    async fn update_password(
        &self,
        id: i32,
        password_hash: &PasswordHashString,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|u| u.is_active() && u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.clone();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|u| u.is_active() && u.id == id) {
            Some(user) => {
                user.lifecycle = LifecycleState::Deleted;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let _state = self.lock()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(phone: &str, email: Option<&str>) -> NewUser {
        NewUser {
            name: "Budi".to_string(),
            email: email.map(str::to_string),
            phone_number: phone.to_string(),
            birth_date: None,
            role: Role::Employee,
            department_id: None,
            password_hash: PasswordHashString::new("hash".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryCredentialStore::new();
        let created = store.create(new_user("0811", Some("budi@example.com"))).await.unwrap();

        assert!(store.find_active_by_phone("0811").await.unwrap().is_some());
        assert!(store.find_active_by_email("BUDI@example.com").await.unwrap().is_some());
        assert_eq!(
            store.find_active_by_id(created.id).await.unwrap().map(|u| u.id),
            Some(created.id)
        );
    }

    #[tokio::test]
    async fn test_duplicates_among_active_are_rejected() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("0811", Some("budi@example.com"))).await.unwrap();

        let phone = store.create(new_user("0811", None)).await.unwrap_err();
        assert!(matches!(phone, StoreError::Duplicate(IdentifierField::PhoneNumber)));

        let email = store
            .create(new_user("0822", Some("Budi@Example.com")))
            .await
            .unwrap_err();
        assert!(matches!(email, StoreError::Duplicate(IdentifierField::Email)));
    }

    #[tokio::test]
    async fn test_soft_deleted_users_are_invisible() {
        let store = MemoryCredentialStore::new();
        let created = store.create(new_user("0811", Some("budi@example.com"))).await.unwrap();

        assert!(store.soft_delete(created.id).await.unwrap());
        assert!(!store.soft_delete(created.id).await.unwrap());

        assert!(store.find_active_by_id(created.id).await.unwrap().is_none());
        assert!(store.find_active_by_phone("0811").await.unwrap().is_none());
        assert!(!store
            .update_password(created.id, &PasswordHashString::new("x".to_string()))
            .await
            .unwrap());

        let again = store.create(new_user("0811", Some("budi@example.com"))).await.unwrap();
        assert_ne!(again.id, created.id);
    }

    #[tokio::test]
    async fn test_unknown_department_is_rejected() {
        let store = MemoryCredentialStore::new().with_department(1);

        let mut user = new_user("0811", None);
        user.department_id = Some(2);
        assert!(matches!(
            store.create(user).await.unwrap_err(),
            StoreError::UnknownDepartment
        ));

        let mut user = new_user("0811", None);
        user.department_id = Some(1);
        assert!(store.create(user).await.is_ok());
    }
}
