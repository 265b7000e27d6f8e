use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::analysis::seed::parse_seed;
use crate::analysis::{analyze_with, AnalysisProfile};
use crate::board::{dashboard_match, filter_matches, DashboardMatch, MatchFilter};
use crate::data::normalize::{normalize_match, normalize_matches};
use crate::data::types::Feed;
use crate::server::AppState;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn live(State(state): State<AppState>) -> Response {
    proxy_feed(&state, Feed::Live).await
}

pub async fn upcoming(State(state): State<AppState>) -> Response {
    proxy_feed(&state, Feed::Upcoming).await
}

/// Upstream records as-is; any failure becomes a 500 with an empty array.
///
/// The failure itself is logged once, in `FeedService`.
async fn proxy_feed(state: &AppState, feed: Feed) -> Response {
    match state.feeds.get(feed).await {
        Ok(matches) => Json(matches.as_slice()).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!([]))).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchesQuery {
    #[serde(default)]
    pub filter: MatchFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub matches: Vec<DashboardMatch>,
    pub source: &'static str,
    pub fetched_at: DateTime<Utc>,
}

pub async fn matches(State(state): State<AppState>, Query(query): Query<MatchesQuery>) -> Response {
    let raw = match state.feeds.get(Feed::Live).await {
        Ok(raw) => raw,
        Err(_) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch matches");
        }
    };

    let now = Utc::now();
    let records = normalize_matches(&raw);
    let matches = filter_matches(&records, query.filter, now)
        .into_iter()
        .filter_map(dashboard_match)
        .collect();

    Json(DashboardResponse {
        matches,
        source: "live",
        fetched_at: now,
    })
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub profile: Option<AnalysisProfile>,
}

/// Analysis for one match found in either feed; `id` may be `12345` or `api-12345`.
pub async fn analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Response {
    let profile = query.profile.unwrap_or(state.default_profile);
    let seed = match parse_seed(&id) {
        Ok(seed) => seed,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    };

    let (live, upcoming) = tokio::join!(
        state.feeds.get(Feed::Live),
        state.feeds.get(Feed::Upcoming)
    );
    if live.is_err() && upcoming.is_err() {
        return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch matches");
    }

    let raw = [live.ok(), upcoming.ok()]
        .into_iter()
        .flatten()
        .find_map(|feed| feed.iter().find(|m| m.id == seed.value()).cloned());
    let Some(raw) = raw else {
        return error_response(StatusCode::NOT_FOUND, &format!("Match {} not found", id));
    };

    let record = match normalize_match(&raw) {
        Ok(record) => record,
        Err(e) => {
            warn!("Match {} cannot be analyzed: {}", id, e);
            return error_response(StatusCode::NOT_FOUND, &format!("Match {} not found", id));
        }
    };

    match analyze_with(profile, &record) {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    }
}

pub async fn board(State(state): State<AppState>) -> Response {
    let Some(handle) = &state.board else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Board polling is disabled");
    };

    match handle.snapshot().await {
        Some(board) => Json(board).into_response(),
        None => error_response(StatusCode::SERVICE_UNAVAILABLE, "Board not loaded yet"),
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub filter: Feed,
}

pub async fn set_board_filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Response {
    let Some(handle) = &state.board else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Board polling is disabled");
    };

    handle.set_filter(request.filter);
    Json(json!({ "filter": handle.filter() })).into_response()
}

#[cfg(feature = "metrics")]
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.render() {
        Ok(body) => (
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(feature = "metrics")]
pub async fn track_requests(
    State(state): State<AppState>,
    matched: Option<axum::extract::MatchedPath>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let route = matched
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(request).await;

    if let Some(metrics) = &state.metrics {
        metrics.record_request(&route, response.status().as_u16());
    }
    response
}
