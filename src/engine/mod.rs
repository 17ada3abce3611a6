mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use availability::{free_slots, generate_day_slots, mark_booking};
pub use error::EngineError;
pub use mutations::ReserveRequest;
pub use store::{MemoryStore, Store, StoreError};

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

/// The availability/slot-allocation engine.
///
/// Stateless apart from its lock registry: configuration and bookings are
/// re-read from the injected [`Store`] on every call, so a schedule change
/// or an external write is visible on the next operation.
pub struct Engine {
    store: Arc<dyn Store>,
    /// One mutex per (room, date). The reservation check+insert runs
    /// entirely inside it, so only one reservation for a given room-day
    /// commits at a time.
    day_locks: DashMap<(String, NaiveDate), Arc<Mutex<()>>>,
    /// Serializes whole-dataset writes: cascade delete and snapshot import.
    admin_lock: Mutex<()>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            day_locks: DashMap::new(),
            admin_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub(super) fn day_lock(&self, room_id: &str, date: NaiveDate) -> Arc<Mutex<()>> {
        self.day_locks
            .entry((room_id.to_string(), date))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}
