//! Seeded match analysis.
//!
//! Everything here is derived from the match id alone: no clock, no
//! randomness, no I/O. Two formula sets exist and callers pick one through
//! [`AnalysisProfile`]; their constants are never mixed.

pub mod compact;
pub mod detailed;
pub mod seed;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data::types::MatchRecord;

pub use compact::{analyze_compact, CompactAnalysis, MarketValue};
pub use detailed::{analyze, AnalysisPayload, RiskLevel, WinProbabilities};
pub use seed::Seed;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Match id {0:?} has no numeric seed")]
    InvalidSeed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisProfile {
    /// Probabilities, predicted score, insights, risk; G-Score in [50, 94].
    #[default]
    Detailed,
    /// G-Score in [50, 99], xG, odds and market value.
    Compact,
}

impl FromStr for AnalysisProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(AnalysisProfile::Detailed),
            "compact" => Ok(AnalysisProfile::Compact),
            other => Err(format!("unknown analysis profile: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "profile", rename_all = "lowercase")]
pub enum Analysis {
    Detailed(AnalysisPayload),
    Compact(CompactAnalysis),
}

pub fn analyze_with(
    profile: AnalysisProfile,
    record: &MatchRecord,
) -> Result<Analysis, AnalysisError> {
    let seed = Seed::try_from(&record.id)?;
    Ok(match profile {
        AnalysisProfile::Detailed => Analysis::Detailed(detailed::analyze_seed(record, seed)),
        AnalysisProfile::Compact => Analysis::Compact(compact::analyze_compact_seed(record, seed)),
    })
}
