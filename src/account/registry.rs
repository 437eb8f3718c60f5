/// Account registry backed by the `account` table
///
/// Email uniqueness is enforced by the table's UNIQUE constraint; a racing
/// duplicate insert surfaces as `DuplicateEmail` straight from the store.

use crate::{
    account::{Account, AccountStatus, NewAccount},
    admin::{AdminGrant, PlatformSettings},
    crypto::hash_credential_async,
    error::{GateError, GateResult},
    metrics,
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Account registry service
#[derive(Clone)]
pub struct AccountRegistry {
    db: SqlitePool,
    settings: PlatformSettings,
}

impl AccountRegistry {
    /// Create a new account registry
    pub fn new(db: SqlitePool) -> Self {
        Self {
            settings: PlatformSettings::new(db.clone()),
            db,
        }
    }

    /// Register a new student account
    ///
    /// New accounts start `pending` with zero subscription days.
    pub async fn register(&self, new_account: NewAccount) -> GateResult<i64> {
        Self::validate_new_account(&new_account)?;

        let credential_hash = hash_credential_async(&new_account.credential).await?;
        let now = Utc::now();

        let insert = sqlx::query(
            "INSERT INTO account (name, email, credential_hash, phone, grade_level, status, subscription_days, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&new_account.name)
        .bind(&new_account.email)
        .bind(&credential_hash)
        .bind(&new_account.phone)
        .bind(&new_account.grade_level)
        .bind(AccountStatus::Pending.as_str())
        .bind(0_i64)
        .bind(now)
        .execute(&self.db)
        .await;

        let result = match insert {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                metrics::REGISTRATIONS_TOTAL
                    .with_label_values(&["duplicate"])
                    .inc();
                tracing::info!("Registration rejected: email already registered");
                return Err(GateError::DuplicateEmail(new_account.email.clone()));
            }
            Err(e) => return Err(GateError::Database(e)),
        };

        let id = result.last_insert_rowid();
        metrics::REGISTRATIONS_TOTAL.with_label_values(&["created"]).inc();
        tracing::info!(account_id = id, "Registered new account");

        Ok(id)
    }

    /// Every account, newest first
    pub async fn list_all(&self, grant: &AdminGrant) -> GateResult<Vec<Account>> {
        grant.ensure_current(&self.settings).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM account ORDER BY created_at DESC, id DESC",
            Account::COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Account::from_row).collect()
    }

    /// Overwrite an account's status
    ///
    /// No transition is forbidden. Fails with `NotFound` when `id` does not exist.
    pub async fn set_status(
        &self,
        grant: &AdminGrant,
        id: i64,
        status: AccountStatus,
    ) -> GateResult<()> {
        grant.ensure_current(&self.settings).await?;

        let result = sqlx::query("UPDATE account SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GateError::NotFound(format!("Account {} not found", id)));
        }

        metrics::ADMIN_MUTATIONS_TOTAL
            .with_label_values(&["set_status"])
            .inc();
        tracing::info!(account_id = id, status = %status, "Account status updated");

        Ok(())
    }

    /// Overwrite an account's remaining subscription days
    ///
    /// Negative values are stored as given; the gate treats any value <= 0 alike.
    pub async fn set_subscription_days(
        &self,
        grant: &AdminGrant,
        id: i64,
        days: i64,
    ) -> GateResult<()> {
        grant.ensure_current(&self.settings).await?;

        let result = sqlx::query("UPDATE account SET subscription_days = ?1 WHERE id = ?2")
            .bind(days)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GateError::NotFound(format!("Account {} not found", id)));
        }

        metrics::ADMIN_MUTATIONS_TOTAL
            .with_label_values(&["set_subscription_days"])
            .inc();
        tracing::info!(account_id = id, days, "Subscription days updated");

        Ok(())
    }

    /// Total number of accounts
    pub async fn count_all(&self) -> GateResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    /// Get account by id
    pub async fn get(&self, id: i64) -> GateResult<Account> {
        let row = sqlx::query(&format!("SELECT {} FROM account WHERE id = ?1", Account::COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| GateError::NotFound(format!("Account {} not found", id)))?;

        Account::from_row(&row)
    }

    /// Find account by exact (case-sensitive) email
    pub async fn find_by_email(&self, email: &str) -> GateResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account WHERE email = ?1",
            Account::COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Account::from_row).transpose()
    }

    /// Validate registration fields
    ///
    /// Descriptive fields must hold more than whitespace. The credential is
    /// taken verbatim and only has to be non-empty.
    fn validate_new_account(new_account: &NewAccount) -> GateResult<()> {
        let descriptive = [
            ("name", &new_account.name),
            ("email", &new_account.email),
            ("phone", &new_account.phone),
            ("grade", &new_account.grade_level),
        ];

        for (field, value) in descriptive {
            if value.trim().is_empty() {
                return Err(GateError::InvalidInput(format!("{} is required", field)));
            }
        }

        if new_account.credential.is_empty() {
            return Err(GateError::InvalidInput("password is required".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminAuthority;
    use crate::config::{AdminConfig, ServerConfig};
    use crate::db;

    const DEFAULT_SECRET: &str = "10012002";

    async fn setup_with_authority(admin: AdminConfig) -> (AccountRegistry, AdminAuthority) {
        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        let authority = AdminAuthority::new(pool.clone(), admin);
        authority.initialize().await.unwrap();

        (AccountRegistry::new(pool), authority)
    }

    async fn setup() -> (AccountRegistry, AdminGrant) {
        let (registry, authority) = setup_with_authority(ServerConfig::test_default().admin).await;
        let grant = authority
            .authorize(DEFAULT_SECRET)
            .await
            .unwrap()
            .expect("default secret should authorize");

        (registry, grant)
    }

    fn student(email: &str) -> NewAccount {
        NewAccount {
            name: "Ali".to_string(),
            email: email.to_string(),
            credential: "pw1".to_string(),
            phone: "0770".to_string(),
            grade_level: "G4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_starts_pending_with_no_days() {
        let (registry, _) = setup().await;

        let id = registry.register(student("a@x.com")).await.unwrap();
        assert_eq!(id, 1);

        let account = registry.get(id).await.unwrap();
        assert_eq!(account.status, AccountStatus::Pending);
        assert_eq!(account.subscription_days, 0);
        assert_eq!(account.email, "a@x.com");
        assert_ne!(account.credential_hash, "pw1");
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let (registry, _) = setup().await;

        let first = registry.register(student("a@x.com")).await.unwrap();
        let second = registry.register(student("b@x.com")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_without_insert() {
        let (registry, _) = setup().await;

        registry.register(student("a@x.com")).await.unwrap();
        let err = registry.register(student("a@x.com")).await.unwrap_err();

        assert!(matches!(err, GateError::DuplicateEmail(_)));
        assert_eq!(registry.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let (registry, _) = setup().await;

        registry.register(student("a@x.com")).await.unwrap();
        registry.register(student("A@x.com")).await.unwrap();

        assert_eq!(registry.count_all().await.unwrap(), 2);
        assert!(registry.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let (registry, _) = setup().await;

        let mut missing_phone = student("a@x.com");
        missing_phone.phone = "   ".to_string();
        let err = registry.register(missing_phone).await.unwrap_err();
        assert!(matches!(err, GateError::InvalidInput(_)));

        let mut missing_email = student("");
        missing_email.name = "Ali".to_string();
        assert!(registry.register(missing_email).await.is_err());

        assert_eq!(registry.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let (registry, grant) = setup().await;

        let first = registry.register(student("a@x.com")).await.unwrap();
        let second = registry.register(student("b@x.com")).await.unwrap();
        let third = registry.register(student("c@x.com")).await.unwrap();

        let ids: Vec<i64> = registry
            .list_all(&grant)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_status_transitions_are_flat() {
        let (registry, grant) = setup().await;
        let id = registry.register(student("a@x.com")).await.unwrap();

        // Every status is reachable from every other
        for from in AccountStatus::ALL {
            for to in AccountStatus::ALL {
                registry.set_status(&grant, id, from).await.unwrap();
                registry.set_status(&grant, id, to).await.unwrap();
                assert_eq!(registry.get(id).await.unwrap().status, to);
            }
        }
    }

    #[tokio::test]
    async fn test_subscription_days_overwrite() {
        let (registry, grant) = setup().await;
        let id = registry.register(student("a@x.com")).await.unwrap();

        registry.set_subscription_days(&grant, id, 30).await.unwrap();
        assert_eq!(registry.get(id).await.unwrap().subscription_days, 30);

        registry.set_subscription_days(&grant, id, -5).await.unwrap();
        assert_eq!(registry.get(id).await.unwrap().subscription_days, -5);

        // Status untouched by day changes
        assert_eq!(registry.get(id).await.unwrap().status, AccountStatus::Pending);
    }

    #[tokio::test]
    async fn test_mutating_missing_account_is_not_found() {
        let (registry, grant) = setup().await;

        let err = registry
            .set_status(&grant, 42, AccountStatus::Allowed)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound(_)));

        let err = registry
            .set_subscription_days(&grant, 42, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_count_all() {
        let (registry, _) = setup().await;
        assert_eq!(registry.count_all().await.unwrap(), 0);

        registry.register(student("a@x.com")).await.unwrap();
        registry.register(student("b@x.com")).await.unwrap();
        assert_eq!(registry.count_all().await.unwrap(), 2);
    }

    async fn assert_grant_refused(registry: &AccountRegistry, grant: &AdminGrant, id: i64) {
        assert!(matches!(
            registry.set_status(grant, id, AccountStatus::Allowed).await,
            Err(GateError::Authorization(_))
        ));
        assert!(matches!(
            registry.set_subscription_days(grant, id, 999).await,
            Err(GateError::Authorization(_))
        ));
        assert!(matches!(
            registry.list_all(grant).await,
            Err(GateError::Authorization(_))
        ));

        let account = registry.get(id).await.unwrap();
        assert_eq!(account.status, AccountStatus::Pending);
        assert_eq!(account.subscription_days, 0);
    }

    #[tokio::test]
    async fn test_grant_revoked_by_secret_change_is_refused() {
        let (registry, authority) = setup_with_authority(ServerConfig::test_default().admin).await;
        let id = registry.register(student("a@x.com")).await.unwrap();

        let old = authority.authorize(DEFAULT_SECRET).await.unwrap().unwrap();
        authority.change_secret(&old, "new-secret").await.unwrap();

        assert_grant_refused(&registry, &old, id).await;

        let fresh = authority.authorize("new-secret").await.unwrap().unwrap();
        registry
            .set_status(&fresh, id, AccountStatus::Allowed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_grant_is_refused() {
        let mut admin = ServerConfig::test_default().admin;
        admin.token_ttl_secs = 0;
        let (registry, authority) = setup_with_authority(admin).await;
        let id = registry.register(student("a@x.com")).await.unwrap();

        let expired = authority.authorize(DEFAULT_SECRET).await.unwrap().unwrap();
        assert!(expired.is_expired());

        assert_grant_refused(&registry, &expired, id).await;
    }

    #[tokio::test]
    async fn test_whitespace_credential_is_kept_verbatim() {
        let (registry, _) = setup().await;

        let mut spaced = student("a@x.com");
        spaced.credential = "   ".to_string();
        let id = registry.register(spaced).await.unwrap();

        let account = registry.get(id).await.unwrap();
        assert!(crate::crypto::verify_credential("   ", &account.credential_hash));
        assert!(!crate::crypto::verify_credential("", &account.credential_hash));

        let mut empty = student("b@x.com");
        empty.credential.clear();
        assert!(matches!(
            registry.register(empty).await,
            Err(GateError::InvalidInput(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_admit_one_per_email() {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("race.sqlite"), db::DatabaseOptions::default())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        let registry = AccountRegistry::new(pool);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.register(student("race@x.com")).await
            }));
        }

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(GateError::DuplicateEmail(_)) => duplicates += 1,
                Err(e) => panic!("unexpected registration error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(registry.count_all().await.unwrap(), 1);
    }
}
