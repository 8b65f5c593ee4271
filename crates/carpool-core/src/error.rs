//! Error types and result aliases for Carpool.
//!
//! This module defines the shared error types used across all Carpool
//! components. Errors are structured for programmatic handling; the HTTP
//! layer maps each variant to a status code.

use crate::id::RideId;

/// The result type used throughout Carpool.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Carpool operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An invalid identifier was provided.
    #[error("invalid identifier: {message}")]
    InvalidId {
        /// Description of what made the ID invalid.
        message: String,
    },

    /// Invalid or missing input was provided.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the failed validation.
        message: String,
    },

    /// The caller is not authenticated.
    #[error("not authenticated: {message}")]
    Unauthenticated {
        /// Description of the authentication failure.
        message: String,
    },

    /// The caller is authenticated but not entitled to act on this resource.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of the denied action.
        message: String,
    },

    /// No ride with the given id exists in the expected stage.
    #[error("ride not found: {id}")]
    RideNotFound {
        /// The ride identifier that was looked up.
        id: RideId,
    },

    /// No account is registered under the given email.
    #[error("account not found: {email}")]
    AccountNotFound {
        /// The email that was looked up.
        email: String,
    },

    /// An account already exists under the given email.
    #[error("email already in use: {email}")]
    EmailTaken {
        /// The conflicting email.
        email: String,
    },

    /// A storage operation failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new validation error with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new unauthenticated error with the given message.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new forbidden error with the given message.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new storage error with the given message.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
