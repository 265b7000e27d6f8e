use chrono::{Days, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::info;

use crate::config::{LeaguesConfig, UpstreamConfig};
use crate::data::normalize::parse_kickoff;
use crate::data::types::{Feed, MatchesResponse, RawMatch};

const AUTH_HEADER: &str = "x-auth-token";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to football-data failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("football-data returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid football-data response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

/// Client for the football-data.org v4 match listings.
///
/// The API key is bound into the client's default headers at construction and
/// never read again.
pub struct FootballDataClient {
    client: Client,
    base_url: String,
    supported_leagues: Vec<u32>,
    upcoming_window_days: u32,
}

impl FootballDataClient {
    pub fn new(
        api_key: &str,
        upstream: &UpstreamConfig,
        leagues: &LeaguesConfig,
    ) -> Result<Self, FetchError> {
        let mut token = HeaderValue::from_str(api_key.trim()).map_err(|_| FetchError::InvalidApiKey)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, token);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(upstream.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            supported_leagues: leagues.supported_ids.clone(),
            upcoming_window_days: upstream.upcoming_window_days,
        })
    }

    pub async fn fetch(&self, feed: Feed) -> Result<Vec<RawMatch>, FetchError> {
        match feed {
            Feed::Live => self.fetch_live().await,
            Feed::Upcoming => self.fetch_upcoming().await,
        }
    }

    /// Matches currently in play, restricted to supported leagues
    pub async fn fetch_live(&self) -> Result<Vec<RawMatch>, FetchError> {
        info!("Fetching live matches...");
        let all = self.fetch_matches(&[("status", "LIVE".to_string())]).await?;
        let total = all.len();

        let matches = select_live(all, &self.supported_leagues);
        info!("Live matches found: {} (out of {} total live)", matches.len(), total);
        Ok(matches)
    }

    /// Matches from today through the configured window, kickoff ascending
    pub async fn fetch_upcoming(&self) -> Result<Vec<RawMatch>, FetchError> {
        let (from, to) = upcoming_window(Utc::now().date_naive(), self.upcoming_window_days);
        info!("Fetching upcoming from {} to {}", from, to);

        let all = self
            .fetch_matches(&[("dateFrom", from), ("dateTo", to)])
            .await?;
        let total = all.len();

        let matches = select_upcoming(all, &self.supported_leagues);
        info!(
            "Upcoming matches found: {} (out of {} total upcoming)",
            matches.len(),
            total
        );
        Ok(matches)
    }

    async fn fetch_matches(&self, query: &[(&str, String)]) -> Result<Vec<RawMatch>, FetchError> {
        let url = format!("{}/matches", self.base_url);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_matches_json(&body)
    }
}

/// Parse a `/matches` body; `null`, empty, and a missing `matches` key are all empty lists.
pub fn parse_matches_json(raw: &str) -> Result<Vec<RawMatch>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let response: Option<MatchesResponse> = serde_json::from_str(trimmed)?;
    Ok(response.map(|r| r.matches).unwrap_or_default())
}

pub fn is_supported(m: &RawMatch, leagues: &[u32]) -> bool {
    leagues.contains(&m.competition.id)
}

pub fn select_live(all: Vec<RawMatch>, leagues: &[u32]) -> Vec<RawMatch> {
    all.into_iter().filter(|m| is_supported(m, leagues)).collect()
}

/// Filter to supported leagues and order by kickoff instant.
///
/// Records whose `utcDate` doesn't parse keep their relative order at the end.
pub fn select_upcoming(all: Vec<RawMatch>, leagues: &[u32]) -> Vec<RawMatch> {
    let mut matches: Vec<RawMatch> = all
        .into_iter()
        .filter(|m| is_supported(m, leagues))
        .collect();
    matches.sort_by_cached_key(|m| {
        let kickoff = parse_kickoff(&m.utc_date);
        (kickoff.is_none(), kickoff)
    });
    matches
}

/// Inclusive `dateFrom`/`dateTo` pair as `YYYY-MM-DD`; the end clamps at the last representable date.
pub fn upcoming_window(today: NaiveDate, days: u32) -> (String, String) {
    let future = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    (
        today.format("%Y-%m-%d").to_string(),
        future.format("%Y-%m-%d").to_string(),
    )
}
