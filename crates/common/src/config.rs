//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration. All durations are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// How often the mapping feed is re-fetched.
    #[serde(default = "default_polling_interval")]
    pub polling_interval_ms: u64,

    /// Mapping feed endpoint, returning `{ "mappings": "id:LABEL;..." }`.
    #[serde(default = "default_mappings_api")]
    pub mappings_api: String,

    /// Raw sports-event feed endpoint.
    #[serde(default = "default_sports_events_api")]
    pub sports_events_api: String,

    /// Max age of a mapping entry before the next sweep evicts it.
    #[serde(default = "default_max_age")]
    pub max_age_ms: u64,

    /// How often the mapping store sweeps expired entries.
    #[serde(default = "default_store_sweep_interval")]
    pub store_sweep_interval_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_polling_interval() -> u64 {
    1000
}
fn default_mappings_api() -> String {
    "http://localhost:3000/api/mappings".into()
}
fn default_sports_events_api() -> String {
    "http://localhost:3000/api/state".into()
}
fn default_max_age() -> u64 {
    30_000
}
fn default_store_sweep_interval() -> u64 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: default_polling_interval(),
            mappings_api: default_mappings_api(),
            sports_events_api: default_sports_events_api(),
            max_age_ms: default_max_age(),
            store_sweep_interval_ms: default_store_sweep_interval(),
        }
    }
}
