use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::data::types::Feed;

/// Per-feed single-flight guard.
///
/// Holders of the guard for a feed are serialized, so a caller that waited
/// re-checks the cache and finds the result the previous holder stored.
pub struct FeedCoalescer {
    inflight: Mutex<HashMap<Feed, Arc<Mutex<()>>>>,
}

impl FeedCoalescer {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire(&self, feed: Feed) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(feed)
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

impl Default for FeedCoalescer {
    fn default() -> Self {
        Self::new()
    }
}
