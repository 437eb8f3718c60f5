/// Application context and dependency injection
use crate::{
    account::{AccessGate, AccountRegistry},
    admin::AdminAuthority,
    config::ServerConfig,
    db,
    error::{GateError, GateResult},
    rate_limit::LoginRateLimiter,
    usage::UsageCounters,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub registry: Arc<AccountRegistry>,
    pub gate: Arc<AccessGate>,
    pub admin_authority: Arc<AdminAuthority>,
    pub usage: Arc<UsageCounters>,
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> GateResult<Self> {
        config.validate()?;

        let db = if config.storage.database.as_os_str() == ":memory:" {
            tracing::warn!("Using in-memory database; nothing will be persisted");
            db::create_memory_pool().await?
        } else {
            Self::ensure_directories(&config).await?;
            db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?
        };

        Self::with_pool(config, db).await
    }

    /// Build the context around an existing pool
    pub async fn with_pool(config: ServerConfig, db: SqlitePool) -> GateResult<Self> {
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let registry = Arc::new(AccountRegistry::new(db.clone()));
        let gate = Arc::new(AccessGate::new((*registry).clone()));

        let admin_authority = Arc::new(AdminAuthority::new(db.clone(), config.admin.clone()));
        admin_authority.initialize().await?;

        let usage = Arc::new(UsageCounters::new(db.clone()));
        let login_limiter = Arc::new(LoginRateLimiter::new(&config.rate_limit));

        Ok(Self {
            config: Arc::new(config),
            db,
            registry,
            gate,
            admin_authority,
            usage,
            login_limiter,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> GateResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                GateError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
