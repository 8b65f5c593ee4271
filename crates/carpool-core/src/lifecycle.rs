//! The ride lifecycle manager.
//!
//! Owns the rules governing how a ride moves through
//! `Requested` → `DriverAccepted` → `Confirmed`: who may act at each stage,
//! what each transition requires, and how rides become visible to riders and
//! drivers. Everything else in the system is a thin client of this type.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::id::RideId;
use crate::ride::{Ride, RideDraft, RideStage};
use crate::store::RideStore;

/// Cancellation searches stages in this order and removes the ride from the
/// first stage where the actor is authorized. A found-but-unauthorized ride
/// does not stop the search.
const CANCEL_SEARCH_ORDER: [RideStage; 3] = [
    RideStage::Confirmed,
    RideStage::DriverAccepted,
    RideStage::Requested,
];

/// The rides visible to one user, grouped by stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideBoard {
    /// Confirmed rides where the user is the rider or the driver.
    pub confirmed: Vec<Ride>,
    /// The user's own pending requests.
    pub requested: Vec<Ride>,
    /// The user's requests that a driver has accepted, awaiting confirmation.
    pub accepted: Vec<Ride>,
}

/// The ride lifecycle manager.
///
/// The identity provider (session layer) supplies an authenticated email to
/// every operation; the manager trusts that input completely.
#[derive(Clone)]
pub struct RideLifecycle {
    store: Arc<dyn RideStore>,
}

impl std::fmt::Debug for RideLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RideLifecycle")
            .field("store", &"<RideStore>")
            .finish()
    }
}

impl RideLifecycle {
    /// Creates a lifecycle manager over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Creates a new ride request for `rider_email`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is empty or the payment is
    /// not a finite, non-negative amount.
    pub async fn create_request(
        &self,
        rider_email: &str,
        event: &str,
        time_date: &str,
        location: &str,
        payment: f64,
    ) -> Result<Ride> {
        let rider_email = non_empty("rider email", rider_email)?;
        let event = non_empty("event", event)?;
        let time_date = non_empty("pick-up time", time_date)?;
        let location = non_empty("pick-up location", location)?;

        if !payment.is_finite() || payment < 0.0 {
            return Err(Error::validation(
                "payment must be a non-negative amount".to_string(),
            ));
        }

        tracing::info!(rider = %rider_email, event = %event, "Creating ride request");

        self.store
            .create(RideDraft {
                rider_email,
                event,
                time_date,
                location,
                payment,
            })
            .await
    }

    /// Returns the rides visible to `email`, grouped by stage.
    ///
    /// Confirmed rides are visible to both parties; requested and accepted
    /// rides only to their rider. Pure read, no mutation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn list_visible_to(&self, email: &str) -> Result<RideBoard> {
        let confirmed = self
            .store
            .list_stage(RideStage::Confirmed)
            .await?
            .into_iter()
            .filter(|ride| ride.involves(email))
            .collect();

        let requested = self
            .store
            .list_stage(RideStage::Requested)
            .await?
            .into_iter()
            .filter(|ride| ride.rider_email == email)
            .collect();

        let accepted = self
            .store
            .list_stage(RideStage::DriverAccepted)
            .await?
            .into_iter()
            .filter(|ride| ride.rider_email == email)
            .collect();

        Ok(RideBoard {
            confirmed,
            requested,
            accepted,
        })
    }

    /// Returns all pending requests `email` could accept as a driver.
    ///
    /// A user never sees their own requests here. Pure read.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn list_available_to(&self, email: &str) -> Result<Vec<Ride>> {
        Ok(self
            .store
            .list_stage(RideStage::Requested)
            .await?
            .into_iter()
            .filter(|ride| ride.rider_email != email)
            .collect())
    }

    /// Records `driver_email` as the driver for a pending request and moves
    /// the ride to `DriverAccepted`.
    ///
    /// # Errors
    ///
    /// - [`Error::RideNotFound`] if no ride with this id sits at `Requested`,
    ///   including when a concurrent driver accepted it first.
    /// - [`Error::Forbidden`] if the driver is the ride's own rider.
    pub async fn accept_as_driver(&self, id: RideId, driver_email: &str) -> Result<Ride> {
        let ride = self
            .store
            .find_in_stage(id, RideStage::Requested)
            .await?
            .ok_or(Error::RideNotFound { id })?;

        // Hard invariant: a rider can never be their own driver. The rider
        // email is immutable, so checking before the advance is race-free.
        if ride.rider_email == driver_email {
            return Err(Error::forbidden("cannot accept your own ride request"));
        }

        tracing::info!(ride = %id, driver = %driver_email, "Driver accepting ride");

        self.store
            .advance(
                id,
                RideStage::Requested,
                RideStage::DriverAccepted,
                Some(driver_email.to_string()),
            )
            .await
    }

    /// Confirms the accepted driver and moves the ride to `Confirmed`.
    ///
    /// # Errors
    ///
    /// - [`Error::RideNotFound`] if no ride with this id sits at
    ///   `DriverAccepted`.
    /// - [`Error::Forbidden`] if `acting_email` is not the original rider.
    pub async fn confirm_driver(&self, id: RideId, acting_email: &str) -> Result<Ride> {
        let ride = self
            .store
            .find_in_stage(id, RideStage::DriverAccepted)
            .await?
            .ok_or(Error::RideNotFound { id })?;

        if ride.rider_email != acting_email {
            return Err(Error::forbidden("only the rider may confirm a driver"));
        }

        tracing::info!(ride = %id, rider = %acting_email, "Rider confirming driver");

        self.store
            .advance(id, RideStage::DriverAccepted, RideStage::Confirmed, None)
            .await
    }

    /// Cancels a ride on behalf of its rider or driver.
    ///
    /// Searches `Confirmed`, then `DriverAccepted`, then `Requested`; removes
    /// the ride from the first stage where it is found and the actor is a
    /// party to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RideNotFound`] if the id is absent from every stage,
    /// or present only where the actor is neither rider nor driver. A
    /// stranger cancelling an existing ride deliberately observes the same
    /// error as a missing ride.
    pub async fn cancel(&self, id: RideId, acting_email: &str) -> Result<()> {
        for stage in CANCEL_SEARCH_ORDER {
            let Some(ride) = self.store.find_in_stage(id, stage).await? else {
                continue;
            };
            if !ride.involves(acting_email) {
                continue;
            }

            self.store.remove(id, stage).await?;
            tracing::info!(ride = %id, actor = %acting_email, stage = %stage, "Ride cancelled");
            return Ok(());
        }

        Err(Error::RideNotFound { id })
    }
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
