use secrecy::{ExposeSecret, SecretString};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::models::{Role, ADMIN_ROLES};

#[derive(Debug, Clone)]
pub struct PersonnelConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub access: AccessConfig,
    pub rate_limit: RateLimitConfig,
    pub bootstrap: Option<BootstrapConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Roles that may sign in through `/api/auth/login`.
    pub login_roles: Vec<Role>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub register_attempts: u32,
    pub register_window_seconds: u64,
}

/// First super admin, created at startup when absent.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub name: String,
    pub phone_number: String,
    pub password: SecretString,
}

const MIN_PROD_SECRET_LEN: usize = 32;
/// One year.
const MAX_EXPIRY_MINUTES: i64 = 525_600;

impl PersonnelConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = PersonnelConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("personnel-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1", is_prod)?,
            },
            jwt: JwtConfig {
                secret: SecretString::new(get_env("JWT_SECRET", None, is_prod)?),
                expiry_minutes: parse_env("JWT_EXPIRY_MINUTES", "1440", is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:5173"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
            access: AccessConfig {
                login_roles: match env::var("LOGIN_ROLES") {
                    Ok(raw) => parse_roles(&raw)?,
                    Err(_) => ADMIN_ROLES.to_vec(),
                },
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", "5", false)?,
                login_window_seconds: parse_env("RATE_LIMIT_LOGIN_WINDOW_SECONDS", "900", false)?,
                register_attempts: parse_env("RATE_LIMIT_REGISTER_ATTEMPTS", "3", false)?,
                register_window_seconds: parse_env(
                    "RATE_LIMIT_REGISTER_WINDOW_SECONDS",
                    "3600",
                    false,
                )?,
            },
            bootstrap: bootstrap_from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.expiry_minutes <= 0 || self.jwt.expiry_minutes > MAX_EXPIRY_MINUTES {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_EXPIRY_MINUTES must be between 1 and {}",
                MAX_EXPIRY_MINUTES
            )));
        }

        if self.jwt.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.access.login_roles.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "LOGIN_ROLES must name at least one role"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.jwt.secret.expose_secret().len() < MIN_PROD_SECRET_LEN {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} bytes in production",
                    MIN_PROD_SECRET_LEN
                )));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("Invalid {}: {}", key, e)))
}

fn parse_roles(raw: &str) -> Result<Vec<Role>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Role>()
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!("LOGIN_ROLES: {}", e)))
        })
        .collect()
}

fn bootstrap_from_env() -> Option<BootstrapConfig> {
    let phone_number = env::var("BOOTSTRAP_ADMIN_PHONE").ok().filter(|s| !s.is_empty())?;
    let password = env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty())?;
    let name = env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string());

    Some(BootstrapConfig {
        name,
        phone_number,
        password: SecretString::new(password),
    })
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_roles_list() {
        let roles = parse_roles("ADMIN, SUPER_ADMIN").unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::SuperAdmin]);
    }

    #[test]
    fn rejects_unknown_login_role() {
        assert!(parse_roles("ADMIN,Admin").is_err());
    }

    fn valid_config() -> PersonnelConfig {
        PersonnelConfig {
            common: core_config::Config::default(),
            environment: Environment::Dev,
            service_name: "personnel-service".to_string(),
            service_version: "test".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: "postgres://localhost/personnel".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: SecretString::new("config-test-secret".to_string()),
                expiry_minutes: 1440,
            },
            security: SecurityConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            access: AccessConfig {
                login_roles: ADMIN_ROLES.to_vec(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: 5,
                login_window_seconds: 60,
                register_attempts: 3,
                register_window_seconds: 60,
            },
            bootstrap: None,
        }
    }

    #[test]
    fn accepts_token_lifetime_up_to_a_year() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.jwt.expiry_minutes = MAX_EXPIRY_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_token_lifetime() {
        let mut config = valid_config();

        for minutes in [0, -5, MAX_EXPIRY_MINUTES + 1, i64::MAX / 2] {
            config.jwt.expiry_minutes = minutes;
            assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
        }
    }

    #[test]
    fn environment_is_case_insensitive() {
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Prod));
        assert!("staging".parse::<Environment>().is_err());
    }
}
