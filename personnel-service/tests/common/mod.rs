//! Test helpers for personnel-service integration tests.
//!
//! Builds the full router over an in-memory credential store.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use personnel_service::{
    build_router,
    config::{
        AccessConfig, DatabaseConfig, Environment, JwtConfig, PersonnelConfig, RateLimitConfig,
        SecurityConfig,
    },
    models::{NewUser, Role, ADMIN_ROLES},
    services::{AuthService, CredentialStore, MemoryCredentialStore, TokenService},
    utils::{hash_password, Password},
    AppState,
};
use secrecy::SecretString;
use serde_json::Value;
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const EXPIRY_MINUTES: i64 = 1440;
pub const KNOWN_DEPARTMENT: i32 = 1;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryCredentialStore>,
}

pub fn test_config() -> PersonnelConfig {
    PersonnelConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "personnel-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: SecretString::new(TEST_JWT_SECRET.to_string()),
            expiry_minutes: EXPIRY_MINUTES,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        access: AccessConfig {
            login_roles: ADMIN_ROLES.to_vec(),
        },
        rate_limit: RateLimitConfig {
            login_attempts: 100,
            login_window_seconds: 60,
            register_attempts: 100,
            register_window_seconds: 60,
        },
        bootstrap: None,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: PersonnelConfig) -> Self {
        let store = Arc::new(MemoryCredentialStore::new().with_department(KNOWN_DEPARTMENT));
        let dyn_store: Arc<dyn CredentialStore> = store.clone();

        let tokens = TokenService::new(&config.jwt);
        let auth = AuthService::new(
            dyn_store.clone(),
            tokens.clone(),
            config.access.login_roles.clone(),
        );

        let state = AppState {
            login_rate_limiter: create_ip_rate_limiter(
                config.rate_limit.login_attempts,
                config.rate_limit.login_window_seconds,
            ),
            register_rate_limiter: create_ip_rate_limiter(
                config.rate_limit.register_attempts,
                config.rate_limit.register_window_seconds,
            ),
            config,
            store: dyn_store,
            tokens,
            auth,
        };

        let router = build_router(state.clone())
            .await
            .expect("Failed to build router");

        Self {
            router,
            state,
            store,
        }
    }

    /// Insert a user directly, bypassing the HTTP surface.
    pub async fn seed_user(&self, role: Role, phone: &str, password: &str) -> i32 {
        let password_hash =
            hash_password(&Password::new(password)).expect("Failed to hash password");

        self.store
            .create(NewUser {
                name: format!("{} user", role),
                email: None,
                phone_number: phone.to_string(),
                birth_date: None,
                role,
                department_id: None,
                password_hash,
            })
            .await
            .expect("Failed to seed user")
            .id
    }

    pub fn token_for(&self, user_id: i32) -> String {
        self.state
            .tokens
            .issue(user_id)
            .expect("Failed to issue token")
            .token
    }

    pub fn expired_token_for(&self, user_id: i32) -> String {
        self.state
            .tokens
            .issue_at(user_id, Utc::now() - Duration::minutes(EXPIRY_MINUTES + 1))
            .expect("Failed to issue token")
            .token
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        read_json(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        read_json(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        read_json(self.send(request).await).await
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Flip the first character of the signature segment.
pub fn tamper(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').unwrap();
    let first = signature.chars().next().unwrap();
    let replacement = if first == 'A' { 'B' } else { 'A' };
    format!("{}.{}{}", head, replacement, &signature[1..])
}
