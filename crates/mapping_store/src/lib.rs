//! Temporal key → label store.
//!
//! Entries are refreshed by an external poller and evicted by a periodic
//! sweep once they outlive `max_age`.

pub mod store;
pub mod task;

pub use store::TemporalMappingStore;
pub use task::{PeriodicTask, MIN_PERIOD};
