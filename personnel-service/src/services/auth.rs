use secrecy::ExposeSecret;
use std::sync::Arc;

use crate::{
    config::BootstrapConfig,
    dtos::{
        auth::{AuthSession, ChangePasswordRequest, LoginRequest, RegisterRequest},
        pengguna::CreateUserRequest,
    },
    models::{Identity, NewUser, Role, UserProfile, UserRecord},
    services::{metrics, CredentialStore, GatewayError, IdentifierField, TokenService},
    utils::{hash_password_blocking, verify_against_unmatchable, verify_password_blocking, Password},
};

/// Credential checks and user lifecycle on top of a [`CredentialStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    login_roles: Vec<Role>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService, login_roles: Vec<Role>) -> Self {
        Self {
            store,
            tokens,
            login_roles,
        }
    }

    /// Exchange a phone number and password for a token.
    ///
    /// Unknown accounts and wrong passwords fail identically. The role check
    /// only runs once the password has matched.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession, GatewayError> {
        let phone_number = req.phone_number.trim();
        if phone_number.is_empty() || req.password.is_empty() {
            metrics::record_login("missing_input");
            return Err(GatewayError::MissingCredentialInput);
        }

        let password = Password::new(req.password);

        let user = match self.store.find_active_by_phone(phone_number).await? {
            Some(user) => user,
            None => {
                verify_against_unmatchable(password).await?;
                metrics::record_login("invalid_credentials");
                tracing::info!("Login rejected: invalid credentials");
                return Err(GatewayError::InvalidCredentials);
            }
        };

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            metrics::record_login("invalid_credentials");
            tracing::info!("Login rejected: invalid credentials");
            return Err(GatewayError::InvalidCredentials);
        }

        if !self.login_roles.contains(&user.role) {
            metrics::record_login("role_not_permitted");
            tracing::info!(user_id = user.id, role = %user.role, "Login rejected: role not permitted");
            return Err(GatewayError::RoleNotPermitted);
        }

        metrics::record_login("success");
        tracing::info!(user_id = user.id, "User logged in");

        self.session_for(&user)
    }

    /// Self-registration. Always yields an employee account.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession, GatewayError> {
        let (name, phone_number) = required_identity(&req.name, &req.phone_number)?;
        let email = req.email.map(|e| e.trim().to_string());
        self.ensure_identifiers_free(&phone_number, email.as_deref()).await?;
        let password_hash = hash_password_blocking(Password::new(req.password)).await?;

        let user = self
            .store
            .create(NewUser {
                name,
                email,
                phone_number,
                birth_date: req.birth_date,
                role: Role::Employee,
                department_id: req.department_id,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");

        self.session_for(&user)
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        req: ChangePasswordRequest,
    ) -> Result<(), GatewayError> {
        let user = self
            .store
            .find_active_by_id(user_id)
            .await?
            .ok_or(GatewayError::IdentityNotFound)?;

        let current = Password::new(req.current_password);
        if !verify_password_blocking(current, user.password_hash.clone()).await? {
            return Err(GatewayError::IncorrectCurrentPassword);
        }

        let password_hash = hash_password_blocking(Password::new(req.new_password)).await?;

        if !self.store.update_password(user.id, &password_hash).await? {
            return Err(GatewayError::IdentityNotFound);
        }

        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Administrative creation with an explicit role.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<UserProfile, GatewayError> {
        let (name, phone_number) = required_identity(&req.name, &req.phone_number)?;
        let email = req.email.map(|e| e.trim().to_string());
        self.ensure_identifiers_free(&phone_number, email.as_deref()).await?;
        let password_hash = hash_password_blocking(Password::new(req.password)).await?;

        let user = self
            .store
            .create(NewUser {
                name,
                email,
                phone_number,
                birth_date: req.birth_date,
                role: req.role,
                department_id: req.department_id,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");

        Ok(user.profile())
    }

    pub async fn get_user(&self, id: i32) -> Result<UserProfile, GatewayError> {
        self.store
            .find_active_by_id(id)
            .await?
            .map(|user| user.profile())
            .ok_or(GatewayError::UserNotFound)
    }

    /// Soft delete `id`. Callers may not delete themselves.
    pub async fn deactivate_user(&self, actor: &Identity, id: i32) -> Result<(), GatewayError> {
        if actor.id == id {
            return Err(GatewayError::CannotDeleteSelf);
        }

        if !self.store.soft_delete(id).await? {
            return Err(GatewayError::UserNotFound);
        }

        tracing::info!(user_id = id, actor_id = actor.id, "User deactivated");
        Ok(())
    }

    /// Create the configured super admin unless an active account already
    /// holds its phone number. Returns whether an account was created.
    pub async fn bootstrap_super_admin(
        &self,
        config: &BootstrapConfig,
    ) -> Result<bool, GatewayError> {
        if self
            .store
            .find_active_by_phone(&config.phone_number)
            .await?
            .is_some()
        {
            tracing::info!("Bootstrap super admin already present");
            return Ok(false);
        }

        let password_hash =
            hash_password_blocking(Password::new(config.password.expose_secret().clone())).await?;

        let user = self
            .store
            .create(NewUser {
                name: config.name.clone(),
                email: None,
                phone_number: config.phone_number.clone(),
                birth_date: None,
                role: Role::SuperAdmin,
                department_id: None,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "Bootstrap super admin created");
        Ok(true)
    }

    /// Early duplicate check so taken identifiers skip the password hash.
    /// `create` still enforces uniqueness atomically.
    async fn ensure_identifiers_free(
        &self,
        phone_number: &str,
        email: Option<&str>,
    ) -> Result<(), GatewayError> {
        if self.store.find_active_by_phone(phone_number).await?.is_some() {
            return Err(GatewayError::DuplicateIdentifier(IdentifierField::PhoneNumber));
        }
        if let Some(email) = email {
            if self.store.find_active_by_email(email).await?.is_some() {
                return Err(GatewayError::DuplicateIdentifier(IdentifierField::Email));
            }
        }
        Ok(())
    }

    fn session_for(&self, user: &UserRecord) -> Result<AuthSession, GatewayError> {
        let issued = self.tokens.issue(user.id)?;

        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.profile(),
        })
    }
}

/// Trimmed name and phone number; either one blank rejects the request.
fn required_identity(name: &str, phone_number: &str) -> Result<(String, String), GatewayError> {
    let name = name.trim();
    let phone_number = phone_number.trim();
    if name.is_empty() || phone_number.is_empty() {
        return Err(GatewayError::MissingCredentialInput);
    }
    Ok((name.to_string(), phone_number.to_string()))
}
