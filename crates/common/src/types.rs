//! Domain types shared across the mapper.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

// ── Persisted (raw) events ────────────────────────────────────────────

/// An event as stored by the ingestion side: every descriptive field is
/// still an opaque id that must be resolved through the mapping store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSportEvent {
    pub id: String,
    pub sport_id: String,
    pub competition_id: String,
    #[serde(default)]
    pub start_time: String,
    pub home_competitor_id: String,
    pub away_competitor_id: String,
    pub status_id: String,
    /// Raw score string: `periodId@home:away` entries joined by `|`.
    #[serde(default)]
    pub scores: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Which id field of a persisted event a mapping lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingField {
    Sport,
    Competition,
    Status,
    HomeCompetitor,
    AwayCompetitor,
    ScorePeriod,
}

impl MappingField {
    /// Name of the field as it appears on the persisted event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sport => "sportId",
            Self::Competition => "competitionId",
            Self::Status => "statusId",
            Self::HomeCompetitor => "homeCompetitorId",
            Self::AwayCompetitor => "awayCompetitorId",
            Self::ScorePeriod => "scores.periodId",
        }
    }
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Display-ready events ──────────────────────────────────────────────

/// Home or away. Competitors are always keyed by side, never by their id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompetitorSide {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitor {
    #[serde(rename = "type")]
    pub side: CompetitorSide,
    pub name: String,
}

/// Score for one period, keyed in [`SportEventScores`] by its resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodScore {
    /// Resolved period label, same as the map key.
    #[serde(rename = "type")]
    pub period: String,
    pub home: String,
    pub away: String,
}

/// Period label → score.
pub type MappedScores = BTreeMap<String, PeriodScore>;

/// Scores of a display-ready event. Serialises as `"N/A"` when the raw
/// event carried no score string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SportEventScores {
    Mapped(MappedScores),
    NotAvailable,
}

impl Serialize for SportEventScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapped(scores) => scores.serialize(serializer),
            Self::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportEvent {
    pub id: String,
    pub status: String,
    pub scores: SportEventScores,
    pub start_time: String,
    pub sport: String,
    pub competitors: BTreeMap<CompetitorSide, Competitor>,
    pub competition: String,
}
