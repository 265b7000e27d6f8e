use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::data::types::{Feed, RawMatch};

pub struct FeedCache {
    cache: DashMap<Feed, CachedFeed>,
    live_ttl: Duration,
    upcoming_ttl: Duration,
}

struct CachedFeed {
    matches: Arc<Vec<RawMatch>>,
    timestamp: Instant,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttls(
            Duration::from_secs(config.live_ttl_secs),
            Duration::from_secs(config.upcoming_ttl_secs),
        )
    }

    pub fn with_ttls(live_ttl: Duration, upcoming_ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            live_ttl,
            upcoming_ttl,
        }
    }

    /// Insert a feed result with its feed-specific TTL
    pub fn insert(&self, feed: Feed, matches: Vec<RawMatch>) -> Arc<Vec<RawMatch>> {
        let ttl = match feed {
            Feed::Live => self.live_ttl,
            Feed::Upcoming => self.upcoming_ttl,
        };
        let matches = Arc::new(matches);

        self.cache.insert(feed, CachedFeed {
            matches: Arc::clone(&matches),
            timestamp: Instant::now(),
            ttl,
        });
        matches
    }

    /// Get feed if not expired (evict on read)
    pub fn get(&self, feed: Feed) -> Option<Arc<Vec<RawMatch>>> {
        let entry = self.cache.get(&feed)?;
        if entry.timestamp.elapsed() > entry.ttl {
            drop(entry); // Drop the read lock
            self.cache.remove(&feed);
            None
        } else {
            Some(Arc::clone(&entry.matches))
        }
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
