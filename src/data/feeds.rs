use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::data::cache::FeedCache;
use crate::data::coalesce::FeedCoalescer;
use crate::data::football_data::{FetchError, FootballDataClient};
use crate::data::types::{Feed, RawMatch};
#[cfg(feature = "metrics")]
use crate::monitoring::metrics::Metrics;

/// Outcome of a feed request. Failures are shared by every caller that
/// waited on the same upstream fetch, hence the `Arc`.
pub type FeedResult = Result<Arc<Vec<RawMatch>>, Arc<FetchError>>;

struct FailedFetch {
    at: Instant,
    error: Arc<FetchError>,
}

/// Cached, single-flight access to the upstream feeds.
pub struct FeedService {
    client: FootballDataClient,
    cache: FeedCache,
    coalescer: FeedCoalescer,
    failures: DashMap<Feed, FailedFetch>,
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<Metrics>>,
}

impl FeedService {
    pub fn new(client: FootballDataClient, cache: FeedCache) -> Self {
        Self {
            client,
            cache,
            coalescer: FeedCoalescer::new(),
            failures: DashMap::new(),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Cached feed, or one upstream fetch whose outcome, success or failure,
    /// is shared by every caller that queued behind it.
    pub async fn get(&self, feed: Feed) -> FeedResult {
        if let Some(hit) = self.cache.get(feed) {
            debug!("Cache hit for {} feed", feed);
            return Ok(hit);
        }

        let queued_at = Instant::now();
        let _guard = self.coalescer.acquire(feed).await;
        // Another caller may have finished a fetch while we waited.
        if let Some(hit) = self.cache.get(feed) {
            return Ok(hit);
        }
        if let Some(error) = self.failed_since(feed, queued_at) {
            debug!("Reusing failed {} fetch for queued caller", feed);
            return Err(error);
        }

        let result = self.client.fetch(feed).await;
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_upstream(feed, result.is_ok());
        }

        match result {
            Ok(matches) => {
                self.failures.remove(&feed);
                Ok(self.cache.insert(feed, matches))
            }
            Err(e) => {
                error!("Error fetching {} matches: {}", feed, e);
                let error = Arc::new(e);
                self.failures.insert(
                    feed,
                    FailedFetch {
                        at: Instant::now(),
                        error: Arc::clone(&error),
                    },
                );
                Err(error)
            }
        }
    }

    /// A failure recorded after `since`, i.e. by a fetch the caller was waiting on.
    fn failed_since(&self, feed: Feed, since: Instant) -> Option<Arc<FetchError>> {
        self.failures
            .get(&feed)
            .filter(|failure| failure.at >= since)
            .map(|failure| Arc::clone(&failure.error))
    }
}
