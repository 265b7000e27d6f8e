use chrono::{DateTime, Utc};
use tracing::warn;

use crate::data::types::{
    CompetitionCategory, LifecycleStatus, MatchId, MatchRecord, RawMatch, ScorePair,
};

/// The list endpoint never carries a venue.
const UNKNOWN_VENUE: &str = "TBD";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Invalid kickoff time for match {id}: {raw}")]
    InvalidKickoff { id: u64, raw: String },
}

/// Map an upstream competition code to a category. Codes outside the table fall back to EPL.
pub fn normalize_competition(code: &str) -> CompetitionCategory {
    match code.trim() {
        "PL" => CompetitionCategory::Epl,
        "PD" => CompetitionCategory::LaLiga,
        "BL1" => CompetitionCategory::Bundesliga,
        "SA" => CompetitionCategory::SerieA,
        "FL1" => CompetitionCategory::Ligue1,
        "CL" => CompetitionCategory::Ucl,
        "FAC" => CompetitionCategory::FaCup,
        _ => CompetitionCategory::Epl,
    }
}

/// Collapse upstream statuses into three lifecycle states.
///
/// POSTPONED, CANCELLED, SUSPENDED and AWARDED all land on FINISHED.
pub fn normalize_status(raw: &str) -> LifecycleStatus {
    match raw.trim() {
        "IN_PLAY" | "PAUSED" | "HALFTIME" => LifecycleStatus::Live,
        "SCHEDULED" | "TIMED" => LifecycleStatus::Upcoming,
        _ => LifecycleStatus::Finished,
    }
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert an upstream record into the internal representation.
pub fn normalize_match(raw: &RawMatch) -> Result<MatchRecord, NormalizeError> {
    let kickoff = parse_kickoff(&raw.utc_date).ok_or_else(|| NormalizeError::InvalidKickoff {
        id: raw.id,
        raw: raw.utc_date.clone(),
    })?;

    let home = raw.score.full_time.home.or(raw.score.half_time.home);
    let away = raw.score.full_time.away.or(raw.score.half_time.away);
    let score = match (home, away) {
        (Some(home), Some(away)) => Some(ScorePair { home, away }),
        _ => None,
    };

    Ok(MatchRecord {
        id: MatchId::Numeric(raw.id),
        home_team: raw.home_team.display_name(),
        away_team: raw.away_team.display_name(),
        competition: normalize_competition(&raw.competition.code),
        competition_name: raw.competition.name.clone(),
        league_id: raw.competition.id,
        kickoff,
        status: normalize_status(&raw.status),
        status_short: raw.status.clone(),
        score,
        venue: Some(UNKNOWN_VENUE.to_string()),
    })
}

/// Normalize a batch, skipping records that can't be placed on the timeline.
pub fn normalize_matches(raw: &[RawMatch]) -> Vec<MatchRecord> {
    raw.iter()
        .filter_map(|m| match normalize_match(m) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping match: {}", e);
                None
            }
        })
        .collect()
}
