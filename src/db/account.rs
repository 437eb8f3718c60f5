/// Account database models
use crate::error::{GateError, GateResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use std::{fmt, str::FromStr};

/// Account lifecycle status
///
/// Any status may be set from any other; the administrator drives every
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Allowed,
    Locked,
    Blocked,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 4] = [
        AccountStatus::Pending,
        AccountStatus::Allowed,
        AccountStatus::Locked,
        AccountStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Allowed => "allowed",
            AccountStatus::Locked => "locked",
            AccountStatus::Blocked => "blocked",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AccountStatus::Pending),
            "allowed" => Ok(AccountStatus::Allowed),
            "locked" => Ok(AccountStatus::Locked),
            "blocked" => Ok(AccountStatus::Blocked),
            _ => Err(GateError::InvalidInput(format!("Invalid status: {}", s))),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student account record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string, never sent to clients
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub phone: String,
    pub grade_level: String,
    pub status: AccountStatus,
    pub subscription_days: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Column list matching `from_row`
    pub const COLUMNS: &'static str =
        "id, name, email, credential_hash, phone, grade_level, status, subscription_days, created_at";

    pub fn from_row(row: &SqliteRow) -> GateResult<Self> {
        let status: String = row.try_get("status")?;

        Ok(Account {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            credential_hash: row.try_get("credential_hash")?,
            phone: row.try_get("phone")?,
            grade_level: row.try_get("grade_level")?,
            status: status.parse()?,
            subscription_days: row.try_get("subscription_days")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Whether the account still has subscription time left
    pub fn has_remaining_days(&self) -> bool {
        self.subscription_days > 0
    }
}
