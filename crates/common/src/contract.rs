//! Contract of the VouchersKit web app as the E2E suites observe it.
//!
//! Routes, storage keys and vocabulary the suites rely on. Nothing here talks
//! to the app; these are the values fixtures and probes are built from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// localStorage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

/// localStorage key holding the serialized user object
pub const USER_STORAGE_KEY: &str = "user";

/// Path of the login page
pub const LOGIN_PATH: &str = "/login";

/// Login form field names. The inputs also carry matching `#email` / `#password` ids.
pub const LOGIN_EMAIL_FIELD: &str = "email";
pub const LOGIN_PASSWORD_FIELD: &str = "password";

/// Length of a voucher code
pub const VOUCHER_CODE_LEN: usize = 8;

/// User role, which decides the dashboard a login lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Therapist,
    Employee,
    Client,
    Owner,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Therapist,
        Role::Employee,
        Role::Client,
        Role::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Therapist => "therapist",
            Role::Employee => "employee",
            Role::Client => "client",
            Role::Owner => "owner",
        }
    }

    /// Where a successful login for this role redirects
    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Where an unauthenticated visit to `path` is sent
pub fn login_redirect(path: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, path)
}

/// Lifecycle state of a scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Missed,
    Rescheduled,
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 5] = [
        SessionStatus::Scheduled,
        SessionStatus::Completed,
        SessionStatus::Missed,
        SessionStatus::Rescheduled,
        SessionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Missed => "missed",
            SessionStatus::Rescheduled => "rescheduled",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// A missed session is the one a backup code can replace
    pub fn allows_backup(&self) -> bool {
        matches!(self, SessionStatus::Missed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SessionStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownVariant {
                kind: "session status",
                value: s.to_string(),
            })
    }
}

/// Regular or backup voucher code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    #[default]
    Regular,
    Backup,
}

/// Voucher code state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    #[default]
    Active,
    Used,
    Expired,
}

impl CodeKind {
    pub const ALL: [CodeKind; 2] = [CodeKind::Regular, CodeKind::Backup];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Regular => "regular",
            CodeKind::Backup => "backup",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CodeStatus {
    pub const ALL: [CodeStatus; 3] = [CodeStatus::Active, CodeStatus::Used, CodeStatus::Expired];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeStatus::Active => "active",
            CodeStatus::Used => "used",
            CodeStatus::Expired => "expired",
        }
    }

    /// Only an active code can be redeemed
    pub fn redeemable(&self) -> bool {
        matches!(self, CodeStatus::Active)
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An 8-character uppercase alphanumeric voucher code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Parse a code, uppercasing lowercase input
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_uppercase();
        let invalid = |reason: String| Error::InvalidVoucherCode {
            code: raw.to_string(),
            reason,
        };

        if code.chars().count() != VOUCHER_CODE_LEN {
            return Err(invalid(format!(
                "expected {} characters, got {}",
                VOUCHER_CODE_LEN,
                code.chars().count()
            )));
        }
        if let Some(bad) = code.chars().find(|c| !c.is_ascii_uppercase() && !c.is_ascii_digit()) {
            return Err(invalid(format!("unexpected character '{}'", bad)));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VoucherCode> for String {
    fn from(code: VoucherCode) -> Self {
        code.0
    }
}
