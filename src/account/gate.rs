/// Access gate for student logins
use crate::{
    account::{Account, AccountRegistry, AccountStatus, DenialReason, LoginOutcome},
    crypto::{run_blocking, verify_against_dummy, verify_credential},
    error::GateResult,
    metrics,
};

/// Decide a login for the account found under the submitted email
///
/// Checks run in a fixed order and the first failing check names the denial:
/// credential, pending, locked, blocked, subscription days.
pub fn decide(account: Option<Account>, credential: &str) -> LoginOutcome {
    let account = match account {
        Some(account) if verify_credential(credential, &account.credential_hash) => account,
        Some(_) => return LoginOutcome::Denied(DenialReason::InvalidCredentials),
        None => {
            verify_against_dummy(credential);
            return LoginOutcome::Denied(DenialReason::InvalidCredentials);
        }
    };

    match account.status {
        AccountStatus::Pending => LoginOutcome::Denied(DenialReason::PendingApproval),
        AccountStatus::Locked => LoginOutcome::Denied(DenialReason::AccountLocked),
        AccountStatus::Blocked => LoginOutcome::Denied(DenialReason::AccountBlocked),
        AccountStatus::Allowed if !account.has_remaining_days() => {
            LoginOutcome::Denied(DenialReason::SubscriptionExpired)
        }
        AccountStatus::Allowed => LoginOutcome::Allowed(account),
    }
}

/// Looks accounts up in the registry and applies `decide`
#[derive(Clone)]
pub struct AccessGate {
    registry: AccountRegistry,
}

impl AccessGate {
    pub fn new(registry: AccountRegistry) -> Self {
        Self { registry }
    }

    /// Authenticate a student
    ///
    /// Reads the account fresh on every call, so status and day changes take
    /// effect on the next login.
    pub async fn authenticate(&self, email: &str, credential: &str) -> GateResult<LoginOutcome> {
        let account = self.registry.find_by_email(email).await?;
        let credential = credential.to_owned();
        let outcome = run_blocking(move || decide(account, &credential)).await?;

        match &outcome {
            LoginOutcome::Allowed(account) => {
                metrics::LOGIN_OUTCOMES_TOTAL
                    .with_label_values(&["allowed"])
                    .inc();
                tracing::info!(account_id = account.id, "Student login allowed");
            }
            LoginOutcome::Denied(reason) => {
                metrics::LOGIN_OUTCOMES_TOTAL
                    .with_label_values(&[reason.code()])
                    .inc();
                tracing::info!(reason = reason.code(), "Student login denied");
            }
        }

        Ok(outcome)
    }
}
