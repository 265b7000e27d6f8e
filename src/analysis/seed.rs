use regex::Regex;
use std::sync::OnceLock;

use crate::analysis::AnalysisError;
use crate::data::types::MatchId;

/// Trailing digit run of a tagged id such as `api-12345`.
const NUMERIC_SUFFIX: &str = r"(\d+)$";

fn numeric_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NUMERIC_SUFFIX).expect("static seed pattern compiles"))
}

/// Non-negative integer derived from a match id; the only entropy source for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(u64);

impl Seed {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// `self mod m`.
    pub fn rem(&self, m: u64) -> u64 {
        self.0 % m
    }

    /// `(self * k) mod m` without overflowing for large ids.
    pub fn scaled_rem(&self, k: u64, m: u64) -> u64 {
        ((self.0 % m) * (k % m)) % m
    }

    /// `(self + k) mod m` without overflowing for large ids.
    pub fn offset_rem(&self, k: u64, m: u64) -> u64 {
        ((self.0 % m) + (k % m)) % m
    }
}

impl TryFrom<&MatchId> for Seed {
    type Error = AnalysisError;

    fn try_from(id: &MatchId) -> Result<Self, Self::Error> {
        match id {
            MatchId::Numeric(value) => Ok(Seed(*value)),
            MatchId::Text(raw) => parse_seed(raw),
        }
    }
}

/// Extract the seed from a string id. Ids without a numeric suffix are rejected.
pub fn parse_seed(raw: &str) -> Result<Seed, AnalysisError> {
    let trimmed = raw.trim();
    let digits = numeric_suffix()
        .captures(trimmed)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AnalysisError::InvalidSeed(raw.to_string()))?;

    digits
        .parse::<u64>()
        .map(Seed)
        .map_err(|_| AnalysisError::InvalidSeed(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_is_seed() {
        let seed = Seed::try_from(&MatchId::Numeric(12345)).unwrap();
        assert_eq!(seed.value(), 12345);
    }

    #[test]
    fn test_tagged_id_uses_numeric_suffix() {
        assert_eq!(parse_seed("api-12345").unwrap().value(), 12345);
        assert_eq!(parse_seed("12345").unwrap().value(), 12345);
        assert_eq!(parse_seed(" match-7 ").unwrap().value(), 7);
        assert_eq!(parse_seed("api-0").unwrap().value(), 0);
    }

    #[test]
    fn test_invalid_seeds() {
        for raw in ["", "   ", "bundesliga-fri", "api-", "12-api", "-"] {
            assert!(
                matches!(parse_seed(raw), Err(AnalysisError::InvalidSeed(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overflowing_suffix_is_invalid() {
        let raw = format!("api-{}0", u64::MAX);
        assert!(matches!(parse_seed(&raw), Err(AnalysisError::InvalidSeed(_))));
    }

    #[test]
    fn test_modular_helpers_match_plain_arithmetic() {
        let seed = Seed::new(12345);
        assert_eq!(seed.scaled_rem(7, 25), (12345 * 7) % 25);
        assert_eq!(seed.scaled_rem(3, 3), 0);
        assert_eq!(seed.offset_rem(17, 25), (12345 + 17) % 25);

        // No overflow at the top of the range.
        let big = Seed::new(u64::MAX);
        assert_eq!(big.scaled_rem(7, 25), ((u64::MAX as u128 * 7) % 25) as u64);
        assert_eq!(big.offset_rem(17, 25), ((u64::MAX as u128 + 17) % 25) as u64);
    }
}
