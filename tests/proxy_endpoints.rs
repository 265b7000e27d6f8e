use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use g_edge::analysis::AnalysisProfile;
use g_edge::board::load_board;
use g_edge::config::{LeaguesConfig, UpstreamConfig};
use g_edge::data::cache::FeedCache;
use g_edge::data::feeds::FeedService;
use g_edge::data::football_data::FootballDataClient;
use g_edge::data::types::Feed;
use g_edge::polling::BoardPoller;
use g_edge::server::{build_router, AppState};

const API_KEY: &str = "test-key";
const LIVE_FIXTURE: &str = include_str!("fixtures/upstream_live.json");
const UPCOMING_FIXTURE: &str = include_str!("fixtures/upstream_upcoming.json");

#[derive(Clone, Default)]
struct Upstream {
    live_hits: Arc<AtomicUsize>,
    upcoming_hits: Arc<AtomicUsize>,
    /// Answer every authorized request with a slow 503.
    failing: bool,
}

async fn fake_matches(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if headers.get("x-auth-token").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, r#"{"message":"bad token"}"#).into_response();
    }

    if upstream.failing {
        upstream.live_hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }

    // Slow enough for concurrent callers to pile up behind one fetch.
    tokio::time::sleep(Duration::from_millis(50)).await;

    if params.get("status").map(String::as_str) == Some("LIVE") {
        upstream.live_hits.fetch_add(1, Ordering::SeqCst);
        return LIVE_FIXTURE.into_response();
    }
    if params.contains_key("dateFrom") && params.contains_key("dateTo") {
        upstream.upcoming_hits.fetch_add(1, Ordering::SeqCst);
        return UPCOMING_FIXTURE.into_response();
    }
    StatusCode::BAD_REQUEST.into_response()
}

async fn spawn_upstream() -> (String, Upstream) {
    spawn_upstream_with(Upstream::default()).await
}

async fn spawn_upstream_with(upstream: Upstream) -> (String, Upstream) {
    let app = Router::new()
        .route("/matches", get(fake_matches))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), upstream)
}

fn feed_service(base_url: &str, api_key: &str) -> Arc<FeedService> {
    let upstream = UpstreamConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        upcoming_window_days: 7,
    };
    let client = FootballDataClient::new(api_key, &upstream, &LeaguesConfig::default()).unwrap();
    let cache = FeedCache::with_ttls(Duration::from_secs(10), Duration::from_secs(300));
    Arc::new(FeedService::new(client, cache))
}

async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_proxy(api_key: &str) -> (String, Upstream) {
    let (upstream_url, upstream) = spawn_upstream().await;
    let feeds = feed_service(&upstream_url, api_key);
    let app = spawn_app(AppState::new(feeds, AnalysisProfile::Detailed)).await;
    (app, upstream)
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

fn ids(body: &Value) -> Vec<Value> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].clone())
        .collect()
}

#[tokio::test]
async fn test_live_filters_leagues_and_keeps_upstream_fields() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/api/live", app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![Value::from(1001), Value::from(12345)]);
    assert_eq!(body[0]["matchday"], 28);
    assert_eq!(body[0]["homeTeam"]["tla"], "ARS");
    assert_eq!(body[0]["competition"]["emblem"], "https://crests.football-data.org/PL.png");
}

#[tokio::test]
async fn test_upcoming_sorted_by_kickoff_instant() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/api/upcoming", app)).await;
    assert_eq!(status, StatusCode::OK);
    // 12:30+02:00 is earlier than 12:30Z; the World Cup fixture is unsupported.
    assert_eq!(
        ids(&body),
        vec![Value::from(2004), Value::from(2002), Value::from(2001)]
    );
}

#[tokio::test]
async fn test_upstream_failure_returns_empty_list() {
    let (app, _) = spawn_proxy("wrong-key").await;

    for path in ["/api/live", "/api/upcoming"] {
        let (status, body) = get_json(&format!("{}{}", app, path)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!([]));
    }

    let (status, body) = get_json(&format!("{}/api/matches", app)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch matches");
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let (app, upstream) = spawn_proxy(API_KEY).await;

    let url = format!("{}/api/live", app);
    let requests = (0..8).map(|_| reqwest::get(url.clone()));
    for response in join_all(requests).await {
        assert_eq!(response.unwrap().status().as_u16(), 200);
    }

    assert_eq!(upstream.live_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_failed_fetch() {
    let (upstream_url, upstream) = spawn_upstream_with(Upstream {
        failing: true,
        ..Upstream::default()
    })
    .await;
    let app = spawn_app(AppState::new(
        feed_service(&upstream_url, API_KEY),
        AnalysisProfile::Detailed,
    ))
    .await;

    let url = format!("{}/api/live", app);
    let started = std::time::Instant::now();
    let requests = (0..8).map(|_| reqwest::get(url.clone()));
    for response in join_all(requests).await {
        let response = response.unwrap();
        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(response.json::<Value>().await.unwrap(), serde_json::json!([]));
    }

    // Queued callers get the shared failure instead of retrying in turn.
    assert_eq!(upstream.live_hits.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_millis(1500));

    // A request arriving after the failure tries upstream again.
    let (status, _) = get_json(&url).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(upstream.live_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dashboard_matches_with_filters() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/api/matches", app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    assert!(body["fetchedAt"].is_string());

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["id"], "api-1001");
    assert_eq!(matches[0]["league"], "EPL");
    assert_eq!(matches[0]["homeTeam"], "Arsenal");
    assert_eq!(matches[1]["id"], "api-12345");
    assert_eq!(matches[1]["competition"], "Serie A");
    assert_eq!(matches[1]["gScore"], 95);
    assert_eq!(matches[1]["marketValue"], "HIGH");
    assert!(matches[1].get("matchId").is_none());

    let (_, live) = get_json(&format!("{}/api/matches?filter=live", app)).await;
    assert_eq!(live["matches"].as_array().unwrap().len(), 2);

    let (_, upcoming) = get_json(&format!("{}/api/matches?filter=upcoming", app)).await;
    assert!(upcoming["matches"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analysis_endpoint() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/api/matches/api-12345/analysis", app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"], "detailed");
    assert_eq!(body["matchId"], 12345);
    assert_eq!(body["prediction"]["homeWinProbability"], 44);
    assert_eq!(body["prediction"]["drawProbability"], 20);
    assert_eq!(body["prediction"]["awayWinProbability"], 36);
    assert_eq!(body["riskLevel"], "LOW");
    assert_eq!(body["gScore"], 50);
    assert_eq!(
        body["insights"]["recommendation"],
        "Consider Inter to win or draw."
    );

    // Found in the upcoming feed, compact profile on request.
    let (status, body) =
        get_json(&format!("{}/api/matches/2002/analysis?profile=compact", app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"], "compact");
    assert_eq!(body["gScore"], 52);
}

#[tokio::test]
async fn test_analysis_errors() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/api/matches/999/analysis", app)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (status, _) = get_json(&format!("{}/api/matches/mock/analysis", app)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (broken, _) = spawn_proxy("wrong-key").await;
    let (status, _) = get_json(&format!("{}/api/matches/12345/analysis", broken)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = spawn_proxy(API_KEY).await;

    let (status, body) = get_json(&format!("{}/health", app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_board_served_from_poller() {
    let (upstream_url, _) = spawn_upstream().await;
    let feeds = feed_service(&upstream_url, API_KEY);

    let loader_feeds = feeds.clone();
    let poller = BoardPoller::spawn(Duration::from_secs(60), Feed::Live, move || {
        let feeds = loader_feeds.clone();
        async move { load_board(&feeds).await }
    });
    let app = spawn_app(AppState::new(feeds, AnalysisProfile::Detailed).with_board(poller.handle()))
        .await;

    let mut board = None;
    for _ in 0..50 {
        let (status, body) = get_json(&format!("{}/api/board", app)).await;
        if status == StatusCode::OK {
            board = Some(body);
            break;
        }
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let board = board.expect("board never loaded");
    assert_eq!(board["feed"], "live");
    assert_eq!(board["matches"].as_array().unwrap().len(), 2);
    assert_eq!(board["matches"][1]["score"]["home"], 1);
    assert_eq!(board["matches"][1]["venue"], "TBD");

    let response = reqwest::Client::new()
        .put(format!("{}/api/board/filter", app))
        .json(&serde_json::json!({ "filter": "upcoming" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(poller.handle().filter(), Feed::Upcoming);

    poller.shutdown().await;
}
