/// Configuration management for Study Gate
use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Admin authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Secret seeded into settings on first boot only
    pub default_secret: String,
    /// HMAC key for admin grant tokens
    pub token_secret: String,
    /// Lifetime of an admin grant in seconds
    pub token_ttl_secs: i64,
}

/// Login throttling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub login_requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GateResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GATE_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GATE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| GateError::InvalidInput("Invalid port number".to_string()))?;
        let version = env::var("GATE_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let data_directory: PathBuf = env::var("GATE_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("GATE_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("platform.sqlite"));

        let default_secret =
            env::var("GATE_ADMIN_DEFAULT_SECRET").unwrap_or_else(|_| "10012002".to_string());
        let token_secret = env::var("GATE_ADMIN_TOKEN_SECRET")
            .map_err(|_| GateError::InvalidInput("Admin token secret required".to_string()))?;
        let token_ttl_secs = env::var("GATE_ADMIN_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        let rate_limit_enabled = env::var("GATE_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let login_requests_per_minute = env::var("GATE_LOGIN_RATE_PER_MINUTE")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let log_level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "study_gate=debug,tower_http=debug".to_string());
        let log_json = env::var("GATE_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            admin: AdminConfig {
                default_secret,
                token_secret,
                token_ttl_secs,
            },
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                login_requests_per_minute,
            },
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GateResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GateError::InvalidInput("Hostname cannot be empty".to_string()));
        }

        if self.admin.token_secret.len() < 32 {
            return Err(GateError::InvalidInput(
                "Admin token secret must be at least 32 characters".to_string(),
            ));
        }

        if self.admin.default_secret.is_empty() {
            return Err(GateError::InvalidInput(
                "Default admin secret cannot be empty".to_string(),
            ));
        }

        if self.admin.token_ttl_secs <= 0 {
            return Err(GateError::InvalidInput(
                "Admin token lifetime must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Configuration for tests and local tooling
    pub fn test_default() -> Self {
        ServerConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 3000,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                database: PathBuf::from(":memory:"),
            },
            admin: AdminConfig {
                default_secret: "10012002".to_string(),
                token_secret: "test-secret-key-for-testing-only-0123".to_string(),
                token_ttl_secs: 3600,
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                login_requests_per_minute: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}
