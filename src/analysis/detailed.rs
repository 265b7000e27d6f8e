//! Detailed profile: win/draw/loss split, predicted score, insights, risk and G-Score.

use serde::{Deserialize, Serialize};

use crate::analysis::seed::Seed;
use crate::analysis::AnalysisError;
use crate::data::types::{MatchId, MatchRecord, ScorePair};

const HOME_BASE: u64 = 40;
const HOME_SPREAD: u64 = 30;
const AWAY_BASE: u64 = 30;
const AWAY_SPREAD: u64 = 25;
const AWAY_FACTOR: u64 = 7;
/// Fixed weight given to the draw outcome.
const DRAW_WEIGHT: u64 = 25;
const G_SCORE_BASE: u32 = 50;
const G_SCORE_SPREAD: u64 = 45;
const DEFAULT_VENUE: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_seed(seed: Seed) -> Self {
        match seed.rem(3) {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStrengths {
    pub home: u64,
    pub away: u64,
}

impl TeamStrengths {
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            home: HOME_BASE + seed.rem(HOME_SPREAD),
            away: AWAY_BASE + seed.scaled_rem(AWAY_FACTOR, AWAY_SPREAD),
        }
    }

    pub fn total(&self) -> u64 {
        self.home + self.away + DRAW_WEIGHT
    }
}

/// Percentages rounded independently, so the sum can drift from 100 by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinProbabilities {
    pub home_win_probability: u32,
    pub draw_probability: u32,
    pub away_win_probability: u32,
}

impl WinProbabilities {
    pub fn from_strengths(strengths: TeamStrengths) -> Self {
        let total = strengths.total();
        Self {
            home_win_probability: percent(strengths.home, total),
            draw_probability: percent(DRAW_WEIGHT, total),
            away_win_probability: percent(strengths.away, total),
        }
    }

    pub fn sum(&self) -> u32 {
        self.home_win_probability + self.draw_probability + self.away_win_probability
    }

    /// Variant that forces an exact 100 by deriving the away share.
    pub fn normalized(&self) -> Self {
        let fixed = self.home_win_probability + self.draw_probability;
        Self {
            away_win_probability: 100u32.saturating_sub(fixed),
            ..*self
        }
    }
}

fn percent(part: u64, total: u64) -> u32 {
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(flatten)]
    pub probabilities: WinProbabilities,
    pub predicted_score: ScorePair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub tactical: String,
    pub key_factor: String,
    pub recommendation: String,
}

impl Insights {
    fn for_match(record: &MatchRecord, strengths: TeamStrengths) -> Self {
        let home = &record.home_team;
        let away = &record.away_team;
        let venue = record.venue.as_deref().unwrap_or(DEFAULT_VENUE);

        let recommendation = if strengths.home > strengths.away {
            format!("Consider {} to win or draw.", home)
        } else {
            format!("{} offers value as underdogs.", away)
        };

        Self {
            tactical: format!(
                "{} will likely control possession at {}. {} may look to counter-attack.",
                home, venue, away
            ),
            key_factor: format!(
                "Home advantage and crowd support at {} could be decisive.",
                venue
            ),
            recommendation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    pub match_id: MatchId,
    pub prediction: Prediction,
    pub insights: Insights,
    pub risk_level: RiskLevel,
    /// Confidence rating in [50, 94].
    pub g_score: u32,
}

/// Derive the full analysis for a match from its id alone.
pub fn analyze(record: &MatchRecord) -> Result<AnalysisPayload, AnalysisError> {
    let seed = Seed::try_from(&record.id)?;
    Ok(analyze_seed(record, seed))
}

pub(crate) fn analyze_seed(record: &MatchRecord, seed: Seed) -> AnalysisPayload {
    let strengths = TeamStrengths::from_seed(seed);

    AnalysisPayload {
        match_id: record.id.clone(),
        prediction: Prediction {
            probabilities: WinProbabilities::from_strengths(strengths),
            predicted_score: ScorePair {
                home: seed.rem(4) as u32,
                away: seed.scaled_rem(3, 3) as u32,
            },
        },
        insights: Insights::for_match(record, strengths),
        risk_level: RiskLevel::from_seed(seed),
        g_score: G_SCORE_BASE + seed.rem(G_SCORE_SPREAD) as u32,
    }
}
