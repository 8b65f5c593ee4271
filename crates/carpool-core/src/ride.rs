//! The ride entity and its lifecycle stages.
//!
//! A ride is the only first-class domain entity in Carpool. Its stage is an
//! explicit field rather than implied by which collection holds it, which
//! makes the "exactly one stage at any time" invariant structural instead of
//! convention-based.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::RideId;

/// The lifecycle stage of a ride.
///
/// Transitions are strictly forward: `Requested` → `DriverAccepted` →
/// `Confirmed`. A ride terminates by deletion from whichever stage currently
/// holds it; there are no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RideStage {
    /// A rider has requested the ride; no driver yet.
    Requested,
    /// A driver has accepted; awaiting confirmation by the rider.
    DriverAccepted,
    /// The rider has confirmed the driver.
    Confirmed,
}

impl RideStage {
    /// Returns the stage as a wire-format string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::DriverAccepted => "driverAccepted",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for RideStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a new ride request.
///
/// Field validation happens in [`RideLifecycle::create_request`]; the store
/// only allocates the id and records the draft at stage `Requested`.
///
/// [`RideLifecycle::create_request`]: crate::lifecycle::RideLifecycle::create_request
#[derive(Debug, Clone, PartialEq)]
pub struct RideDraft {
    /// Identity of the requester.
    pub rider_email: String,
    /// The school event the ride is for.
    pub event: String,
    /// Pick-up time and date, as entered by the rider.
    pub time_date: String,
    /// Pick-up location.
    pub location: String,
    /// Offered payment amount.
    pub payment: f64,
}

/// One request for transportation to a school event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    /// Process-unique id, assigned at creation, never reused or mutated.
    pub ride_id: RideId,
    /// Identity of the requester; immutable after creation.
    pub rider_email: String,
    /// Identity of the accepting driver; `None` until a driver accepts,
    /// immutable once set.
    pub driver_email: Option<String>,
    /// The school event the ride is for.
    pub event: String,
    /// Pick-up time and date.
    pub time_date: String,
    /// Pick-up location.
    pub location: String,
    /// Offered payment amount.
    pub payment: f64,
    /// Current lifecycle stage.
    pub stage: RideStage,
    /// 0-based position in insertion order within the owning stage.
    ///
    /// Recomputed after every structural change to the stage. Display-only;
    /// carries no semantic weight.
    pub position_index: usize,
}

impl Ride {
    /// Returns true when the given email is the rider or the driver.
    #[must_use]
    pub fn involves(&self, email: &str) -> bool {
        self.rider_email == email || self.driver_email.as_deref() == Some(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ride() -> Ride {
        Ride {
            ride_id: RideId::new(0),
            rider_email: "a@x.com".to_string(),
            driver_email: None,
            event: "Game Night".to_string(),
            time_date: "Friday 7pm".to_string(),
            location: "Gym".to_string(),
            payment: 5.0,
            stage: RideStage::Requested,
            position_index: 0,
        }
    }

    #[test]
    fn involves_matches_rider_and_driver() {
        let mut ride = sample_ride();
        assert!(ride.involves("a@x.com"));
        assert!(!ride.involves("b@x.com"));

        ride.driver_email = Some("b@x.com".to_string());
        assert!(ride.involves("b@x.com"));
        assert!(!ride.involves("c@x.com"));
    }

    #[test]
    fn stage_serializes_camel_case() {
        let json = serde_json::to_string(&RideStage::DriverAccepted).unwrap();
        assert_eq!(json, "\"driverAccepted\"");
        assert_eq!(RideStage::DriverAccepted.as_str(), "driverAccepted");
    }

    #[test]
    fn ride_serializes_camel_case_fields() {
        let value = serde_json::to_value(sample_ride()).unwrap();
        assert_eq!(value["rideId"], 0);
        assert_eq!(value["riderEmail"], "a@x.com");
        assert_eq!(value["positionIndex"], 0);
        assert_eq!(value["stage"], "requested");
    }
}
