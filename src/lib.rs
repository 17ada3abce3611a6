//! roomgrid — availability and slot-allocation engine for room booking.
//!
//! The engine turns a configured work-day window and slot granularity into
//! a canonical grid of atomic slots, computes which slots are free given
//! existing bookings, atomically reserves contiguous ranges, and builds
//! multi-day occupancy grids for dashboards. Persistence is an injected
//! [`engine::Store`]; this crate owns no wire protocol or file format.

pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;

pub use engine::{Engine, EngineError, MemoryStore, ReserveRequest, Store, StoreError};
