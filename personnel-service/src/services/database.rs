//! PostgreSQL credential store.
//!
//! Uses sqlx with runtime-checked queries. Every read goes through
//! [`active_scope`] so soft-deleted rows are never visible.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::models::{LifecycleState, NewUser, UserRecord, UserRow};
use crate::services::store::{CredentialStore, IdentifierField, StoreError};
use crate::utils::PasswordHashString;

const USER_COLUMNS: &str = "nomor, nama, email, nomor_telepon, tanggal_lahir, role, \
     departemen_id, password_hash, lifecycle_state_code, created_at, updated_at";

const PHONE_UNIQUE_INDEX: &str = "pengguna_active_phone_key";
const EMAIL_UNIQUE_INDEX: &str = "pengguna_active_email_key";

/// `SELECT` over active users narrowed by `predicate` (which uses `$1`).
fn active_scope(predicate: &str) -> String {
    format!(
        "SELECT {} FROM pengguna WHERE lifecycle_state_code = '{}' AND {}",
        USER_COLUMNS,
        LifecycleState::Active.as_str(),
        predicate
    )
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(PHONE_UNIQUE_INDEX) => {
                    return StoreError::Duplicate(IdentifierField::PhoneNumber)
                }
                Some(EMAIL_UNIQUE_INDEX) => return StoreError::Duplicate(IdentifierField::Email),
                _ => {}
            }
        }
        if db.is_foreign_key_violation() {
            return StoreError::UnknownDepartment;
        }
    }
    StoreError::Backend(anyhow::anyhow!(err))
}

fn into_record(row: UserRow) -> Result<UserRecord, StoreError> {
    UserRecord::try_from(row).map_err(StoreError::Backend)
}

/// PostgreSQL-backed [`CredentialStore`].
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_active_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRow>(&active_scope("nomor_telepon = $1"))
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(into_record)
            .transpose()
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRow>(&active_scope("LOWER(email) = LOWER($1)"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(into_record)
            .transpose()
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRow>(&active_scope("nomor = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(into_record)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO pengguna (nama, email, nomor_telepon, tanggal_lahir, role, departemen_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(user.birth_date)
            .bind(user.role.as_str())
            .bind(user.department_id)
            .bind(user.password_hash.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_record(row)
    }

    async fn update_password(
        &self,
        id: i32,
        password_hash: &PasswordHashString,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE pengguna
            SET password_hash = $2, updated_at = NOW()
            WHERE nomor = $1 AND lifecycle_state_code = $3
            "#,
        )
        .bind(id)
        .bind(password_hash.as_str())
        .bind(LifecycleState::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE pengguna
            SET lifecycle_state_code = $2, updated_at = NOW()
            WHERE nomor = $1 AND lifecycle_state_code = $3
            "#,
        )
        .bind(id)
        .bind(LifecycleState::Deleted.as_str())
        .bind(LifecycleState::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                anyhow::anyhow!("Database health check failed: {}", e)
            })?;
        Ok(())
    }
}
