//! Ride storage abstraction and in-memory backend.
//!
//! The lifecycle manager is the only caller of this trait; no other code
//! touches storage directly. The contract is operation-granular so that each
//! mutation is atomic with respect to the stage check that guards it: two
//! racing `advance` calls on the same ride cannot both succeed, which
//! preserves the "every ride id is a member of exactly one stage" invariant.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::id::RideId;
use crate::ride::{Ride, RideDraft, RideStage};

/// Storage backend for rides.
///
/// Implementations must be thread-safe; every mutating operation runs to
/// completion under a single mutual-exclusion boundary covering all stages.
#[async_trait]
pub trait RideStore: Send + Sync + 'static {
    /// Allocates the next ride id and records the draft at stage `Requested`.
    ///
    /// Ids come from a monotonically increasing counter that is never reset
    /// and never reused, even after deletion.
    async fn create(&self, draft: RideDraft) -> Result<Ride>;

    /// Returns all rides at the given stage, in insertion order.
    async fn list_stage(&self, stage: RideStage) -> Result<Vec<Ride>>;

    /// Looks up a ride by id, but only if it currently sits at `stage`.
    async fn find_in_stage(&self, id: RideId, stage: RideStage) -> Result<Option<Ride>>;

    /// Atomically moves a ride from `expected` to `next`, optionally setting
    /// the driver, and recomputes position indexes in both stages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RideNotFound`] if the ride is absent from `expected` -
    /// including when a concurrent caller moved it first.
    async fn advance(
        &self,
        id: RideId,
        expected: RideStage,
        next: RideStage,
        driver: Option<String>,
    ) -> Result<Ride>;

    /// Removes a ride from `expected` and recomputes that stage's indexes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RideNotFound`] if the ride is absent from `expected`.
    async fn remove(&self, id: RideId, expected: RideStage) -> Result<Ride>;
}

/// Per-stage insertion-order index.
///
/// The rides map owns the entities; these vectors only record ordering so
/// that `position_index` can be recomputed after structural changes.
#[derive(Debug, Default)]
struct StageOrder {
    requested: Vec<RideId>,
    driver_accepted: Vec<RideId>,
    confirmed: Vec<RideId>,
}

impl StageOrder {
    fn for_stage(&self, stage: RideStage) -> &Vec<RideId> {
        match stage {
            RideStage::Requested => &self.requested,
            RideStage::DriverAccepted => &self.driver_accepted,
            RideStage::Confirmed => &self.confirmed,
        }
    }

    fn for_stage_mut(&mut self, stage: RideStage) -> &mut Vec<RideId> {
        match stage {
            RideStage::Requested => &mut self.requested,
            RideStage::DriverAccepted => &mut self.driver_accepted,
            RideStage::Confirmed => &mut self.confirmed,
        }
    }
}

#[derive(Debug, Default)]
struct BoardInner {
    rides: HashMap<RideId, Ride>,
    order: StageOrder,
    next_id: u64,
}

impl BoardInner {
    /// Rewrites `position_index` for every member of a stage after a
    /// structural change, so indexes never go stale.
    fn reindex(&mut self, stage: RideStage) {
        // Collect first: the order vector and rides map cannot be borrowed
        // mutably at the same time.
        let ids: Vec<RideId> = self.order.for_stage(stage).clone();
        for (position, id) in ids.into_iter().enumerate() {
            if let Some(ride) = self.rides.get_mut(&id) {
                ride.position_index = position;
            }
        }
    }
}

/// In-memory ride store.
///
/// Thread-safe via `RwLock`; all three stages share one lock, so the stage
/// check and the mutation of any operation happen under the same write guard.
/// State lives for the process lifetime only - a restart discards everything.
#[derive(Debug, Default)]
pub struct MemoryRideStore {
    inner: Arc<RwLock<BoardInner>>,
}

impl MemoryRideStore {
    /// Creates a new empty ride store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for MemoryRideStore {
    async fn create(&self, draft: RideDraft) -> Result<Ride> {
        let mut inner = self.inner.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        let id = RideId::new(inner.next_id);
        inner.next_id += 1;

        let ride = Ride {
            ride_id: id,
            rider_email: draft.rider_email,
            driver_email: None,
            event: draft.event,
            time_date: draft.time_date,
            location: draft.location,
            payment: draft.payment,
            stage: RideStage::Requested,
            position_index: 0,
        };

        inner.rides.insert(id, ride);
        inner.order.for_stage_mut(RideStage::Requested).push(id);
        inner.reindex(RideStage::Requested);

        inner
            .rides
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::internal("ride vanished during create"))
    }

    async fn list_stage(&self, stage: RideStage) -> Result<Vec<Ride>> {
        let inner = self.inner.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        Ok(inner
            .order
            .for_stage(stage)
            .iter()
            .filter_map(|id| inner.rides.get(id))
            .cloned()
            .collect())
    }

    async fn find_in_stage(&self, id: RideId, stage: RideStage) -> Result<Option<Ride>> {
        let inner = self.inner.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        Ok(inner
            .rides
            .get(&id)
            .filter(|ride| ride.stage == stage)
            .cloned())
    }

    async fn advance(
        &self,
        id: RideId,
        expected: RideStage,
        next: RideStage,
        driver: Option<String>,
    ) -> Result<Ride> {
        let mut inner = self.inner.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        // Stage recheck under the write guard: a concurrent caller that moved
        // the ride first makes this lookup fail with RideNotFound.
        match inner.rides.get_mut(&id) {
            Some(ride) if ride.stage == expected => {
                if let Some(driver) = driver {
                    ride.driver_email = Some(driver);
                }
                ride.stage = next;
            }
            _ => return Err(Error::RideNotFound { id }),
        }

        inner.order.for_stage_mut(expected).retain(|m| *m != id);
        inner.order.for_stage_mut(next).push(id);
        inner.reindex(expected);
        inner.reindex(next);

        inner
            .rides
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::internal("ride vanished during advance"))
    }

    async fn remove(&self, id: RideId, expected: RideStage) -> Result<Ride> {
        let mut inner = self.inner.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        let matches = inner
            .rides
            .get(&id)
            .is_some_and(|ride| ride.stage == expected);
        if !matches {
            return Err(Error::RideNotFound { id });
        }

        let ride = inner
            .rides
            .remove(&id)
            .ok_or_else(|| Error::internal("ride vanished during remove"))?;
        inner.order.for_stage_mut(expected).retain(|m| *m != id);
        inner.reindex(expected);

        Ok(ride)
    }
}
