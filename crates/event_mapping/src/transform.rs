//! Id → label resolution of persisted events.
//!
//! Everything here reads the store's current contents and never writes to
//! it. A missing mapping is an error, never defaulted to the raw id.

use std::collections::BTreeMap;

use common::{
    Competitor, CompetitorSide, Error, MappedScores, MappingField, PeriodScore,
    PersistedSportEvent, Result, SportEvent, SportEventScores, UnresolvedId,
};
use mapping_store::TemporalMappingStore;

use crate::scores::parse_score_periods;

fn resolve(store: &TemporalMappingStore, field: MappingField, id: &str) -> Result<String> {
    store
        .get(id)
        .ok_or_else(|| Error::UnresolvedId(UnresolvedId::new(field, id)))
}

/// Resolve every period of a raw score string, keyed by period label.
pub fn get_mapped_scores(store: &TemporalMappingStore, raw: &str) -> Result<MappedScores> {
    let mut mapped = MappedScores::new();
    for period in parse_score_periods(raw)? {
        let label = resolve(store, MappingField::ScorePeriod, period.period_id)?;
        mapped.insert(
            label.clone(),
            PeriodScore {
                period: label,
                home: period.home.to_string(),
                away: period.away.to_string(),
            },
        );
    }
    Ok(mapped)
}

/// Build a display-ready event. Fails on the first id with no mapping.
pub fn transform_event(
    store: &TemporalMappingStore,
    persisted: &PersistedSportEvent,
) -> Result<SportEvent> {
    let sport = resolve(store, MappingField::Sport, &persisted.sport_id)?;
    let competition = resolve(store, MappingField::Competition, &persisted.competition_id)?;
    let status = resolve(store, MappingField::Status, &persisted.status_id)?;
    let home = resolve(store, MappingField::HomeCompetitor, &persisted.home_competitor_id)?;
    let away = resolve(store, MappingField::AwayCompetitor, &persisted.away_competitor_id)?;

    let scores = if persisted.scores.trim().is_empty() {
        SportEventScores::NotAvailable
    } else {
        SportEventScores::Mapped(get_mapped_scores(store, &persisted.scores)?)
    };

    let competitors = BTreeMap::from([
        (
            CompetitorSide::Home,
            Competitor {
                side: CompetitorSide::Home,
                name: home,
            },
        ),
        (
            CompetitorSide::Away,
            Competitor {
                side: CompetitorSide::Away,
                name: away,
            },
        ),
    ]);

    Ok(SportEvent {
        id: persisted.id.clone(),
        status,
        scores,
        start_time: persisted.start_time.clone(),
        sport,
        competitors,
        competition,
    })
}

/// Check that every id on the event currently resolves, including the
/// period ids inside `scores`.
///
/// On failure returns [`Error::Verification`] listing all unresolved ids,
/// in field order. A malformed score string is reported as
/// [`Error::MalformedScore`].
pub fn verify_event_mappings(
    store: &TemporalMappingStore,
    persisted: &PersistedSportEvent,
) -> Result<()> {
    let mut ids = vec![
        (MappingField::Sport, persisted.sport_id.as_str()),
        (MappingField::Competition, persisted.competition_id.as_str()),
        (MappingField::Status, persisted.status_id.as_str()),
        (MappingField::HomeCompetitor, persisted.home_competitor_id.as_str()),
        (MappingField::AwayCompetitor, persisted.away_competitor_id.as_str()),
    ];
    ids.extend(
        parse_score_periods(&persisted.scores)?
            .into_iter()
            .map(|period| (MappingField::ScorePeriod, period.period_id)),
    );

    let unresolved: Vec<UnresolvedId> = ids
        .into_iter()
        .filter(|(_, id)| !store.contains(id))
        .map(|(field, id)| UnresolvedId::new(field, id))
        .collect();

    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(Error::Verification {
            event_id: persisted.id.clone(),
            unresolved,
        })
    }
}
