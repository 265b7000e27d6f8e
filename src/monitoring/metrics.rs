use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::data::types::Feed;

/// Prometheus counters for upstream traffic and served requests.
pub struct Metrics {
    registry: Registry,
    upstream_fetches: IntCounterVec,
    http_requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let upstream_fetches = IntCounterVec::new(
            Opts::new("g_edge_upstream_fetches_total", "Upstream fetches by feed and outcome"),
            &["feed", "outcome"],
        )?;
        let http_requests = IntCounterVec::new(
            Opts::new("g_edge_http_requests_total", "HTTP requests by route and status"),
            &["route", "status"],
        )?;

        registry.register(Box::new(upstream_fetches.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;

        Ok(Self {
            registry,
            upstream_fetches,
            http_requests,
        })
    }

    pub fn record_upstream(&self, feed: Feed, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.upstream_fetches
            .with_label_values(&[feed.as_str(), outcome])
            .inc();
    }

    pub fn record_request(&self, route: &str, status: u16) {
        self.http_requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
