//! Unified error type for the sports mapper.

use std::fmt;

use thiserror::Error;

use crate::types::MappingField;

/// A single id on an event that has no label in the mapping store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedId {
    pub field: MappingField,
    pub id: String,
}

impl UnresolvedId {
    pub fn new(field: MappingField, id: impl Into<String>) -> Self {
        Self {
            field,
            id: id.into(),
        }
    }
}

impl fmt::Display for UnresolvedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.field, self.id)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No mapping for {0}")]
    UnresolvedId(UnresolvedId),

    #[error("Malformed score entry: {0:?}")]
    MalformedScore(String),

    #[error("Event {event_id} has unmapped ids: {}", format_unresolved(.unresolved))]
    Verification {
        event_id: String,
        /// Every unresolved id, in field order. Never empty.
        unresolved: Vec<UnresolvedId>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_unresolved(unresolved: &[UnresolvedId]) -> String {
    unresolved
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_message_lists_every_field() {
        let err = Error::Verification {
            event_id: "event1".into(),
            unresolved: vec![
                UnresolvedId::new(MappingField::Sport, "invalid"),
                UnresolvedId::new(MappingField::ScorePeriod, "p9"),
            ],
        };

        assert_eq!(
            err.to_string(),
            r#"Event event1 has unmapped ids: sportId="invalid", scores.periodId="p9""#
        );
    }

    #[test]
    fn test_unresolved_id_message() {
        let err = Error::UnresolvedId(UnresolvedId::new(MappingField::Status, "s1"));
        assert_eq!(err.to_string(), r#"No mapping for statusId="s1""#);
    }
}
