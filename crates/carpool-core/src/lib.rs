//! # carpool-core
//!
//! Core domain types for the Carpool ride-matching service.
//!
//! This crate provides the foundational types and traits used across all
//! Carpool components:
//!
//! - **Ride Lifecycle**: The state machine moving rides through
//!   Requested → DriverAccepted → Confirmed
//! - **Identifiers**: Strongly-typed IDs for rides and user accounts
//! - **Storage Traits**: Abstract storage interfaces for rides and accounts
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `carpool-core` is the **only** crate allowed to define shared primitives.
//! The HTTP layer in `carpool-api` composes these types but carries no domain
//! policy of its own.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use carpool_core::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> carpool_core::Result<()> {
//! let lifecycle = RideLifecycle::new(Arc::new(MemoryRideStore::new()));
//! let ride = lifecycle
//!     .create_request("a@x.com", "Game Night", "Fri 7pm", "Gym", 5.0)
//!     .await?;
//! assert_eq!(ride.stage, RideStage::Requested);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod lifecycle;
pub mod observability;
pub mod ride;
pub mod store;
pub mod user;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use carpool_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::id::{RideId, UserId};
    pub use crate::lifecycle::{RideBoard, RideLifecycle};
    pub use crate::ride::{Ride, RideDraft, RideStage};
    pub use crate::store::{MemoryRideStore, RideStore};
    pub use crate::user::{MemoryUserDirectory, UserAccount, UserDirectory, normalize_email};
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use id::{RideId, UserId};
pub use lifecycle::{RideBoard, RideLifecycle};
pub use observability::{LogFormat, init_logging};
pub use ride::{Ride, RideDraft, RideStage};
pub use store::{MemoryRideStore, RideStore};
pub use user::{MemoryUserDirectory, UserAccount, UserDirectory, normalize_email};
