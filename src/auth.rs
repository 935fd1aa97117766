//! Department official login.
//!
//! The credential and token schemes here are placeholders: the stored
//! credential is derived from the username and the session token is an
//! unsigned string. A deployment must put a salted one-way hash with a
//! constant-time comparison behind `CredentialVerifier`, and a signed token
//! behind `issue_token`.

use crate::department::Department;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialRecord {
    pub username: String,
    pub password_credential: String,
    pub govt_id: String,
    pub department: Department,
    pub display_name: String,
}

/// Read-only source of official records.
pub trait OfficialDirectory: Send + Sync {
    fn lookup(&self, username: &str) -> Option<OfficialRecord>;
}

/// Directory backed by the configured officials table.
pub struct StaticDirectory {
    records: HashMap<String, OfficialRecord>,
}

impl StaticDirectory {
    pub fn new(records: Vec<OfficialRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.username.clone(), r))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl OfficialDirectory for StaticDirectory {
    fn lookup(&self, username: &str) -> Option<OfficialRecord> {
        self.records.get(username).cloned()
    }
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str, stored_credential: &str) -> bool;
}

/// Mock scheme: a credential is `hashed_password_<secret>`, and the stored
/// credential must be the one derived from the username suffix
/// (`john.doe@gov.in` -> `hashed_password_doe`).
pub struct MockCredentialVerifier;

impl MockCredentialVerifier {
    const PREFIX: &'static str = "hashed_password_";

    /// Token after the last dot of the local part: "john.doe@gov.in" -> "doe".
    pub fn username_suffix(username: &str) -> &str {
        let local = username.split('@').next().unwrap_or(username);
        local.rsplit('.').next().unwrap_or(local)
    }

    pub fn expected_credential(username: &str) -> String {
        format!("{}{}", Self::PREFIX, Self::username_suffix(username))
    }

    pub fn mock_hash(password: &str) -> String {
        format!("{}{}", Self::PREFIX, password)
    }
}

impl CredentialVerifier for MockCredentialVerifier {
    fn verify(&self, username: &str, password: &str, stored_credential: &str) -> bool {
        stored_credential == Self::expected_credential(username)
            && Self::mock_hash(password) == stored_credential
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing one of username, password or govt id")]
    MissingFields,
    #[error("unknown username")]
    UnknownUser,
    #[error("password does not match stored credential")]
    BadPassword,
    #[error("govt id does not match record")]
    GovtIdMismatch,
}

impl AuthError {
    /// Message safe to return to the caller. Unknown user and bad password
    /// are indistinguishable here.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "Missing required fields (Username, Password, Govt ID).",
            AuthError::UnknownUser | AuthError::BadPassword => {
                "Authentication failed: Invalid credentials."
            }
            AuthError::GovtIdMismatch => "Authentication failed: Unique Government ID mismatch.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub token: String,
    pub department: Department,
    pub official_name: String,
}

pub struct OfficialAuthenticator {
    directory: Box<dyn OfficialDirectory>,
    verifier: Box<dyn CredentialVerifier>,
}

impl OfficialAuthenticator {
    pub fn new(
        directory: Box<dyn OfficialDirectory>,
        verifier: Box<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            directory,
            verifier,
        }
    }

    pub fn with_records(records: Vec<OfficialRecord>) -> Self {
        Self::new(
            Box::new(StaticDirectory::new(records)),
            Box::new(MockCredentialVerifier),
        )
    }

    pub fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        govt_id: Option<&str>,
    ) -> Result<AuthSuccess, AuthError> {
        let (Some(username), Some(password), Some(govt_id)) =
            (non_empty(username), non_empty(password), non_empty(govt_id))
        else {
            log::info!("Official login rejected: missing fields");
            return Err(AuthError::MissingFields);
        };

        let Some(record) = self.directory.lookup(username) else {
            log::info!("Official login failed: unknown username");
            return Err(AuthError::UnknownUser);
        };

        if !self
            .verifier
            .verify(username, password, &record.password_credential)
        {
            log::warn!("Official login failed: bad password for user: {username}");
            return Err(AuthError::BadPassword);
        }

        if record.govt_id != govt_id {
            log::warn!("Failed Govt ID validation attempt for user: {username}");
            return Err(AuthError::GovtIdMismatch);
        }

        let token = issue_token(record.department, username);
        log::info!(
            "Official {} ({}) logged in successfully.",
            record.display_name,
            record.department
        );

        Ok(AuthSuccess {
            token,
            department: record.department,
            official_name: record.display_name,
        })
    }
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|v| !v.is_empty())
}

/// Opaque, unsigned session token: `JWT.<department>.<hash of username>`.
pub fn issue_token(department: Department, username: &str) -> String {
    let mut hasher = DefaultHasher::new();
    username.hash(&mut hasher);
    format!("JWT.{}.{:x}", department, hasher.finish())
}
