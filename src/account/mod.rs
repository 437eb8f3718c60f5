/// Account management system
///
/// Owns student registration, the lifecycle fields administrators mutate,
/// and the ordered login decision.

mod gate;
mod registry;

pub use gate::{decide, AccessGate};
pub use registry::AccountRegistry;

pub use crate::db::account::{Account, AccountStatus};

use serde::{Deserialize, Serialize};

/// Fields collected at registration
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub credential: String,
    pub phone: String,
    pub grade_level: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub grade: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        NewAccount {
            name: req.name,
            email: req.email,
            credential: req.password,
            phone: req.phone,
            grade_level: req.grade,
        }
    }
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub id: i64,
}

/// Student login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Student login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Account,
}

/// Why the access gate refused a login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialReason {
    /// No account matches the email and credential pair
    InvalidCredentials,
    PendingApproval,
    AccountLocked,
    AccountBlocked,
    /// Allowed account with no subscription days left
    SubscriptionExpired,
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::InvalidCredentials => "InvalidCredentials",
            DenialReason::PendingApproval => "PendingApproval",
            DenialReason::AccountLocked => "AccountLocked",
            DenialReason::AccountBlocked => "AccountBlocked",
            DenialReason::SubscriptionExpired => "SubscriptionExpired",
        }
    }

    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::InvalidCredentials => "Invalid login credentials",
            DenialReason::PendingApproval => {
                "Your account is under review, please contact the administration to activate it"
            }
            DenialReason::AccountLocked => "Your account has been temporarily locked",
            DenialReason::AccountBlocked => "Your account has been permanently blocked",
            DenialReason::SubscriptionExpired => {
                "Your subscription has expired, please contact the administration to renew it"
            }
        }
    }
}

/// Result of a student login attempt
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Allowed(Account),
    Denied(DenialReason),
}

impl LoginOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginOutcome::Allowed(_))
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            LoginOutcome::Allowed(_) => None,
            LoginOutcome::Denied(reason) => Some(*reason),
        }
    }
}
