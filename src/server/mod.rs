//! HTTP surface: the football-data proxy, dashboard lists and analysis.

pub mod handlers;

use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;

use crate::analysis::AnalysisProfile;
use crate::data::feeds::FeedService;
#[cfg(feature = "metrics")]
use crate::monitoring::metrics::Metrics;
use crate::monitoring::request_log::log_requests;
use crate::polling::BoardHandle;

#[derive(Clone)]
pub struct AppState {
    pub feeds: Arc<FeedService>,
    /// Absent when polling is disabled.
    pub board: Option<BoardHandle>,
    pub default_profile: AnalysisProfile,
    #[cfg(feature = "metrics")]
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(feeds: Arc<FeedService>, default_profile: AnalysisProfile) -> Self {
        Self {
            feeds,
            board: None,
            default_profile,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    pub fn with_board(mut self, board: BoardHandle) -> Self {
        self.board = Some(board);
        self
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/live", get(handlers::live))
        .route("/api/upcoming", get(handlers::upcoming))
        .route("/api/matches", get(handlers::matches))
        .route("/api/matches/:id/analysis", get(handlers::analysis))
        .route("/api/board", get(handlers::board))
        .route("/api/board/filter", put(handlers::set_board_filter));

    #[cfg(feature = "metrics")]
    let router = router
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::track_requests,
        ));

    router
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
