//! User accounts and the account directory.
//!
//! Accounts are first-class entities in a mapping keyed by normalized email.
//! Password hashing itself is an API-layer concern; this module only stores
//! the resulting hash string.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::id::UserId;

/// Normalizes an email for use as a directory key.
///
/// Trims surrounding whitespace and lowercases; two registrations differing
/// only in case target the same account.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// A registered student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique account id.
    pub id: UserId,
    /// Normalized email, the directory key.
    pub email: String,
    /// Password hash in PHC string format.
    pub password_hash: String,
    /// Parent contact email. Collected but never mailed (non-goal).
    pub parent_email: String,
    /// Self-reported gender.
    pub gender: String,
    /// School-issued student number, checked against the roster at signup.
    pub student_number: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Builds a new account with a fresh id and the current timestamp.
    ///
    /// The email is normalized here so every account carries its own
    /// directory key.
    #[must_use]
    pub fn new(
        email: &str,
        password_hash: impl Into<String>,
        parent_email: impl Into<String>,
        gender: impl Into<String>,
        student_number: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            parent_email: parent_email.into(),
            gender: gender.into(),
            student_number: student_number.into(),
            created_at: Utc::now(),
        }
    }
}

/// Directory of registered accounts, keyed by normalized email.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmailTaken`] if an account already exists under the
    /// same normalized email.
    async fn insert(&self, account: UserAccount) -> Result<()>;

    /// Looks up an account by email (normalized before lookup).
    async fn find(&self, email: &str) -> Result<Option<UserAccount>>;
}

/// In-memory account directory.
///
/// Thread-safe via `RwLock`. State lives for the process lifetime only.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    accounts: Arc<RwLock<HashMap<String, UserAccount>>>,
}

impl MemoryUserDirectory {
    /// Creates a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn insert(&self, account: UserAccount) -> Result<()> {
        let mut accounts = self.accounts.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        if accounts.contains_key(&account.email) {
            return Err(Error::EmailTaken {
                email: account.email,
            });
        }

        accounts.insert(account.email.clone(), account);
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<UserAccount>> {
        let accounts = self.accounts.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        Ok(accounts.get(&normalize_email(email)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str) -> UserAccount {
        UserAccount::new(email, "$argon2id$stub", "parent@x.com", "female", "12345678")
    }

    #[tokio::test]
    async fn insert_and_find_by_normalized_email() {
        let directory = MemoryUserDirectory::new();
        directory.insert(account("  Student@X.com ")).await.unwrap();

        let found = directory.find("student@x.com").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().email, "student@x.com");

        // Lookup normalizes too.
        assert!(directory.find(" STUDENT@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let directory = MemoryUserDirectory::new();
        directory.insert(account("student@x.com")).await.unwrap();

        let result = directory.insert(account("Student@x.com")).await;
        assert!(matches!(result, Err(Error::EmailTaken { .. })));
    }

    #[tokio::test]
    async fn missing_account_is_none() {
        let directory = MemoryUserDirectory::new();
        assert!(directory.find("nobody@x.com").await.unwrap().is_none());
    }

    #[test]
    fn accounts_get_distinct_ids() {
        let first = account("a@x.com");
        let second = account("b@x.com");
        assert_ne!(first.id, second.id);
    }
}
