//! Playwright storage-state fixtures for logged-in suites
//!
//! Each fixture seeds the app's localStorage with a user object and bearer
//! token, so specs start on an authenticated session without going through
//! the login form. The files are the ones `storageState` in a Playwright
//! project points at.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use voucherkit_common::contract::{Role, TOKEN_STORAGE_KEY, USER_STORAGE_KEY};

use crate::error::E2eResult;

/// Fixture written for the default (client) session
pub const DEFAULT_STATE_FILE: &str = "user.json";

/// User object as the app stores it under the `user` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockUser {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

impl MockUser {
    pub fn new(id: u32, email: &str, name: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role,
            token: format!("mock-{}-token", role),
        }
    }
}

/// Demo accounts used across the suites
pub fn default_users() -> Vec<MockUser> {
    vec![
        MockUser::new(1, "admin@voucherskit.com", "Admin User", Role::Admin),
        MockUser::new(2, "therapist@voucherskit.com", "Dr. Smith", Role::Therapist),
        MockUser::new(3, "client@voucherskit.com", "John Doe", Role::Client),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    #[serde(rename = "localStorage")]
    pub local_storage: Vec<StorageEntry>,
}

/// Playwright `storageState` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageState {
    pub cookies: Vec<serde_json::Value>,
    pub origins: Vec<OriginState>,
}

impl StorageState {
    /// localStorage for `origin` holding the user and its token
    pub fn for_user(origin: &str, user: &MockUser) -> E2eResult<Self> {
        Ok(Self {
            cookies: Vec::new(),
            origins: vec![OriginState {
                origin: origin.trim_end_matches('/').to_string(),
                local_storage: vec![
                    StorageEntry {
                        name: USER_STORAGE_KEY.to_string(),
                        value: serde_json::to_string(user)?,
                    },
                    StorageEntry {
                        name: TOKEN_STORAGE_KEY.to_string(),
                        value: user.token.clone(),
                    },
                ],
            }],
        })
    }

    fn entry(&self, key: &str) -> Option<&str> {
        self.origins
            .iter()
            .flat_map(|o| o.local_storage.iter())
            .find(|e| e.name == key)
            .map(|e| e.value.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.entry(TOKEN_STORAGE_KEY)
    }

    pub fn user(&self) -> Option<MockUser> {
        self.entry(USER_STORAGE_KEY)
            .and_then(|v| serde_json::from_str(v).ok())
    }
}

/// Write `<role>.json` for every user into `dir`. The client session is
/// also written as `user.json`.
pub fn write_fixtures(dir: &Path, origin: &str, users: &[MockUser]) -> E2eResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for user in users {
        let state = StorageState::for_user(origin, user)?;
        let json = serde_json::to_string_pretty(&state)?;

        let path = dir.join(format!("{}.json", user.role));
        std::fs::write(&path, &json)?;
        info!("Wrote {} session to {}", user.role, path.display());
        written.push(path);

        if user.role == Role::Client {
            let path = dir.join(DEFAULT_STATE_FILE);
            std::fs::write(&path, &json)?;
            written.push(path);
        }
    }

    Ok(written)
}
