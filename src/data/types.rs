use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Match record as returned by the football-data.org v4 `/matches` endpoint.
///
/// Only the fields the service reads are typed; everything else is kept in
/// `extra` so the proxy endpoints re-emit the upstream record untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub id: u64,
    pub home_team: RawTeam,
    pub away_team: RawTeam,
    pub competition: RawCompetition,
    pub utc_date: String,
    pub status: String,
    #[serde(default)]
    pub score: RawScore,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawTeam {
    /// Short name when upstream has one, full name otherwise.
    pub fn display_name(&self) -> String {
        self.short_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCompetition {
    pub id: u32,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScore {
    #[serde(default)]
    pub full_time: ScoreLine,
    #[serde(default)]
    pub half_time: ScoreLine,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

/// Envelope of the upstream list response.
#[derive(Debug, Default, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<RawMatch>,
}

/// Match identifier: numeric upstream ids, or tagged string ids such as `api-12345`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchId::Numeric(id) => write!(f, "{}", id),
            MatchId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<u64> for MatchId {
    fn from(id: u64) -> Self {
        MatchId::Numeric(id)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        MatchId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionCategory {
    #[serde(rename = "EPL")]
    Epl,
    #[serde(rename = "UCL")]
    Ucl,
    #[serde(rename = "LaLiga")]
    LaLiga,
    #[serde(rename = "Bundesliga")]
    Bundesliga,
    #[serde(rename = "Serie A")]
    SerieA,
    #[serde(rename = "Ligue 1")]
    Ligue1,
    #[serde(rename = "FA Cup")]
    FaCup,
}

impl CompetitionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CompetitionCategory::Epl => "EPL",
            CompetitionCategory::Ucl => "UCL",
            CompetitionCategory::LaLiga => "LaLiga",
            CompetitionCategory::Bundesliga => "Bundesliga",
            CompetitionCategory::SerieA => "Serie A",
            CompetitionCategory::Ligue1 => "Ligue 1",
            CompetitionCategory::FaCup => "FA Cup",
        }
    }
}

impl fmt::Display for CompetitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    Live,
    Upcoming,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub home: u32,
    pub away: u32,
}

/// Normalized match, produced once per fetch cycle and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub home_team: String,
    pub away_team: String,
    pub competition: CompetitionCategory,
    pub competition_name: String,
    pub league_id: u32,
    pub kickoff: DateTime<Utc>,
    pub status: LifecycleStatus,
    pub status_short: String,
    pub score: Option<ScorePair>,
    pub venue: Option<String>,
}

/// Which upstream listing a result came from; also the board's active filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    #[default]
    Live,
    Upcoming,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Live => "live",
            Feed::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
