//! Event mapping service.
//!
//! Keeps a [`TemporalMappingStore`] filled from the mapping feed and turns
//! persisted, id-encoded events into display-ready [`SportEvent`]s.
//!
//! [`TemporalMappingStore`]: mapping_store::TemporalMappingStore
//! [`SportEvent`]: common::SportEvent

pub mod payload;
pub mod scores;
pub mod service;
pub mod source;
pub mod transform;

pub use payload::parse_mapping_payload;
pub use scores::{parse_score_periods, RawPeriodScore};
pub use service::EventMappingService;
pub use source::{parse_mappings_response, HttpMappingSource, MappingSource};
pub use transform::{get_mapped_scores, transform_event, verify_event_mappings};
