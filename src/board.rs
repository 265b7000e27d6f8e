use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::analysis::compact::TacticalEdge;
use crate::analysis::{analyze_compact, CompactAnalysis, MarketValue};
use crate::data::feeds::FeedService;
use crate::data::normalize::normalize_matches;
use crate::data::types::{CompetitionCategory, Feed, LifecycleStatus, MatchId, MatchRecord};

/// Snapshot of what the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub feed: Feed,
    pub matches: Vec<MatchRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// Normalized records for one feed; upstream failures degrade to an empty list.
pub async fn load_feed(feeds: &FeedService, feed: Feed) -> Vec<MatchRecord> {
    match feeds.get(feed).await {
        Ok(raw) => normalize_matches(&raw),
        Err(_) => {
            debug!("{} feed unavailable, board shows nothing", feed);
            Vec::new()
        }
    }
}

/// Live matches when any are in play, otherwise the upcoming window.
pub async fn load_board(feeds: &FeedService) -> Board {
    let live = load_feed(feeds, Feed::Live).await;
    let (feed, matches) = if live.is_empty() {
        (Feed::Upcoming, load_feed(feeds, Feed::Upcoming).await)
    } else {
        (Feed::Live, live)
    };

    info!("Board loaded: {} {} matches", matches.len(), feed);
    Board {
        feed,
        matches,
        fetched_at: Utc::now(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchFilter {
    #[default]
    All,
    Live,
    Upcoming,
}

impl FromStr for MatchFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MatchFilter::All),
            "live" => Ok(MatchFilter::Live),
            "upcoming" => Ok(MatchFilter::Upcoming),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

pub fn filter_matches<'a>(
    matches: &'a [MatchRecord],
    filter: MatchFilter,
    now: DateTime<Utc>,
) -> Vec<&'a MatchRecord> {
    matches
        .iter()
        .filter(|m| match filter {
            MatchFilter::All => true,
            MatchFilter::Live => m.status == LifecycleStatus::Live,
            MatchFilter::Upcoming => m.status == LifecycleStatus::Upcoming && m.kickoff > now,
        })
        .collect()
}

/// A match card as the dashboard list renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMatch {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub competition: CompetitionCategory,
    pub league: CompetitionCategory,
    pub date: DateTime<Utc>,
    pub status: LifecycleStatus,
    #[serde(flatten)]
    pub analysis: CardAnalysis,
}

/// Compact analysis as shown on a card; the card's `id` already names the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAnalysis {
    pub g_score: u32,
    pub market_value: MarketValue,
    pub ai_probability: u32,
    pub bookmaker_odds: f64,
    pub xg_home: f64,
    pub xg_away: f64,
    pub tactical_edge: TacticalEdge,
}

impl From<CompactAnalysis> for CardAnalysis {
    fn from(analysis: CompactAnalysis) -> Self {
        Self {
            g_score: analysis.g_score,
            market_value: analysis.market_value,
            ai_probability: analysis.ai_probability,
            bookmaker_odds: analysis.bookmaker_odds,
            xg_home: analysis.xg_home,
            xg_away: analysis.xg_away,
            tactical_edge: analysis.tactical_edge,
        }
    }
}

pub fn dashboard_match(record: &MatchRecord) -> Option<DashboardMatch> {
    let analysis = match analyze_compact(record) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("No compact analysis for {}: {}", record.id, e);
            return None;
        }
    };

    let id = match &record.id {
        MatchId::Numeric(id) => format!("api-{}", id),
        MatchId::Text(id) => id.clone(),
    };

    Some(DashboardMatch {
        id,
        home_team: record.home_team.clone(),
        away_team: record.away_team.clone(),
        competition: record.competition,
        league: record.competition,
        date: record.kickoff,
        status: record.status,
        analysis: analysis.into(),
    })
}
