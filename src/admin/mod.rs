/// Admin authority
///
/// A single shared secret authorizes every administrative mutation. A
/// successful `authorize` yields an `AdminGrant`, and every admin-only
/// operation in the crate takes `&AdminGrant`, so it cannot be reached
/// without one.

pub mod settings;
pub mod token;

pub use settings::PlatformSettings;

use crate::{
    config::AdminConfig,
    crypto::{hash_credential_async, verify_credential_async},
    error::{GateError, GateResult},
    metrics,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Proof of a successful admin authorization
///
/// Only this module can construct one: through `AdminAuthority::authorize`
/// or by verifying a token that `authorize` issued.
#[derive(Debug, Clone)]
pub struct AdminGrant {
    token_id: Uuid,
    generation: i64,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AdminGrant {
    pub fn token_id(&self) -> Uuid {
        self.token_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Reject a grant that has expired or predates the last secret change
    pub(crate) async fn ensure_current(&self, settings: &PlatformSettings) -> GateResult<()> {
        if self.is_expired() {
            return Err(GateError::Authorization("Admin grant has expired".to_string()));
        }

        if self.generation != settings.generation().await? {
            return Err(GateError::Authorization(
                "Admin grant was issued under a previous secret".to_string(),
            ));
        }

        Ok(())
    }
}

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Admin login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Change admin secret request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSecretRequest {
    #[serde(default)]
    pub new_password: String,
}

/// Admin authority service
#[derive(Clone)]
pub struct AdminAuthority {
    settings: PlatformSettings,
    config: AdminConfig,
}

impl AdminAuthority {
    pub fn new(db: SqlitePool, config: AdminConfig) -> Self {
        Self {
            settings: PlatformSettings::new(db),
            config,
        }
    }

    /// Seed the admin secret on first boot; later boots keep the stored one
    pub async fn initialize(&self) -> GateResult<()> {
        let seeded = self
            .settings
            .insert_default(
                settings::ADMIN_SECRET_HASH,
                &hash_credential_async(&self.config.default_secret).await?,
            )
            .await?;
        self.settings
            .insert_default(settings::ADMIN_SECRET_GENERATION, "0")
            .await?;

        if seeded {
            tracing::warn!("Admin secret initialized to the configured default; change it");
        } else {
            tracing::debug!("Admin secret already initialized");
        }

        Ok(())
    }

    /// Check a submitted secret
    ///
    /// Returns `None` on mismatch. There is no lockout here; throttling
    /// happens at the HTTP boundary.
    pub async fn authorize(&self, submitted: &str) -> GateResult<Option<AdminGrant>> {
        let stored_hash = self.settings.require(settings::ADMIN_SECRET_HASH).await?;

        if !verify_credential_async(submitted, &stored_hash).await? {
            metrics::ADMIN_AUTHORIZATIONS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            tracing::warn!("Admin authorization rejected");
            return Ok(None);
        }

        let generation = self.settings.generation().await?;
        let now = Utc::now();
        let grant = AdminGrant {
            token_id: Uuid::new_v4(),
            generation,
            issued_at: now,
            expires_at: now + Duration::seconds(self.config.token_ttl_secs),
        };

        metrics::ADMIN_AUTHORIZATIONS_TOTAL
            .with_label_values(&["granted"])
            .inc();
        tracing::info!(token_id = %grant.token_id, "Admin authorization granted");

        Ok(Some(grant))
    }

    /// Encode a grant for the HTTP boundary
    pub fn issue_token(&self, grant: &AdminGrant) -> GateResult<String> {
        token::encode_grant(grant, &self.config.token_secret)
    }

    /// Turn a bearer token back into a grant
    ///
    /// Tokens issued before the last secret change are rejected.
    pub async fn verify_token(&self, token: &str) -> GateResult<AdminGrant> {
        let grant = token::decode_grant(token, &self.config.token_secret)?;
        grant.ensure_current(&self.settings).await?;
        Ok(grant)
    }

    /// Replace the admin secret
    ///
    /// Every outstanding grant, including the one passed in, stops working.
    pub async fn change_secret(&self, grant: &AdminGrant, new_secret: &str) -> GateResult<()> {
        grant.ensure_current(&self.settings).await?;

        if new_secret.trim().is_empty() {
            return Err(GateError::InvalidInput(
                "New admin secret cannot be empty".to_string(),
            ));
        }

        let generation = self
            .settings
            .rotate_admin_secret(&hash_credential_async(new_secret).await?)
            .await?;

        metrics::ADMIN_MUTATIONS_TOTAL
            .with_label_values(&["change_secret"])
            .inc();
        tracing::info!(generation, "Admin secret changed");

        Ok(())
    }
}
