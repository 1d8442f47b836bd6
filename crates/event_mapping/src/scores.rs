//! Raw score string parsing.
//!
//! Grammar: `period ("|" period)*` with `period := periodId "@" home ":" away`.
//! `home` and `away` are kept verbatim; they are not necessarily numeric.

use common::{Error, Result};

/// One period entry of a raw score string, ids not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPeriodScore<'a> {
    pub period_id: &'a str,
    pub home: &'a str,
    pub away: &'a str,
}

/// Split a raw score string into its period entries.
///
/// An empty (or blank) string has no periods. Any entry missing `@` or `:`,
/// or with an empty period id, fails the whole string so a period is never
/// silently lost.
pub fn parse_score_periods(raw: &str) -> Result<Vec<RawPeriodScore<'_>>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split('|')
        .map(|entry| {
            let (period_id, score) = entry
                .split_once('@')
                .ok_or_else(|| Error::MalformedScore(entry.to_string()))?;
            let (home, away) = score
                .split_once(':')
                .ok_or_else(|| Error::MalformedScore(entry.to_string()))?;
            let period_id = period_id.trim();
            if period_id.is_empty() {
                return Err(Error::MalformedScore(entry.to_string()));
            }
            Ok(RawPeriodScore {
                period_id,
                home,
                away,
            })
        })
        .collect()
}
