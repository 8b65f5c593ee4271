//! Strongly-typed identifiers for Carpool entities.
//!
//! Two kinds of identifier are used:
//!
//! - [`RideId`]: a process-unique monotonically increasing integer allocated
//!   by the ride store. Never reused, never reset, even after deletion.
//! - [`UserId`]: a ULID, globally unique without coordination and
//!   lexicographically sortable by creation time.
//!
//! # Example
//!
//! ```rust
//! use carpool_core::id::{RideId, UserId};
//!
//! let ride = RideId::new(7);
//! let user = UserId::generate();
//!
//! // IDs are different types - this won't compile:
//! // let wrong: RideId = user;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::{Error, Result};

/// A unique identifier for a ride.
///
/// Ride ids are allocated from a monotonically increasing counter shared
/// across the whole process lifetime. An id is assigned at creation and is
/// never reused or mutated, even after the ride is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(u64);

impl RideId {
    /// Creates a ride ID from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying counter value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RideId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u64>().map(Self).map_err(|e| Error::InvalidId {
            message: format!("invalid ride ID '{s}': {e}"),
        })
    }
}

impl From<u64> for RideId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A unique identifier for a user account.
///
/// Uses ULID generation which is:
/// - Lexicographically sortable by creation time
/// - Globally unique without coordination
/// - URL-safe and case-insensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Ulid);

impl UserId {
    /// Generates a new unique user ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creates a user ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Returns the creation timestamp encoded in the ID.
    #[must_use]
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        let ms = self.0.timestamp_ms();
        chrono::DateTime::from_timestamp_millis(ms as i64).unwrap_or_else(chrono::Utc::now)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| Error::InvalidId {
                message: format!("invalid user ID '{s}': {e}"),
            })
    }
}
