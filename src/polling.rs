use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::board::Board;
use crate::data::types::Feed;

/// Shared view of the poller: the latest board and the active filter.
#[derive(Clone)]
pub struct BoardHandle {
    board: Arc<RwLock<Option<Board>>>,
    filter: Arc<watch::Sender<Feed>>,
}

impl BoardHandle {
    /// `None` until the first load completes.
    pub async fn snapshot(&self) -> Option<Board> {
        self.board.read().await.clone()
    }

    pub fn filter(&self) -> Feed {
        *self.filter.borrow()
    }

    /// Switching filters triggers an immediate reload; re-sending the current one does nothing.
    pub fn set_filter(&self, feed: Feed) {
        self.filter.send_if_modified(|current| {
            if *current == feed {
                false
            } else {
                *current = feed;
                true
            }
        });
    }
}

/// Background refresher for the dashboard board.
///
/// Owns one task that loads on start, again on every filter change, and on
/// each interval tick while the filter is [`Feed::Live`]. Loads never overlap
/// because they all run inside that task.
pub struct BoardPoller {
    handle: BoardHandle,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

enum Step {
    Continue,
    Stop,
}

impl BoardPoller {
    pub fn spawn<F, Fut>(interval: Duration, initial: Feed, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Board> + Send + 'static,
    {
        // `interval` panics on a zero period.
        let interval = interval.max(Duration::from_millis(1));
        let board = Arc::new(RwLock::new(None));
        let (filter_tx, mut filter_rx) = watch::channel(initial);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let slot = board.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the startup load covers it.
            ticker.tick().await;

            if let Step::Stop = run_load(&load, &slot, &mut shutdown_rx).await {
                return;
            }

            loop {
                let step = tokio::select! {
                    _ = &mut shutdown_rx => Step::Stop,
                    changed = filter_rx.changed() => {
                        if changed.is_err() {
                            Step::Stop
                        } else {
                            let feed = *filter_rx.borrow_and_update();
                            info!("Board filter switched to {}", feed);
                            ticker.reset();
                            run_load(&load, &slot, &mut shutdown_rx).await
                        }
                    }
                    _ = ticker.tick() => {
                        if *filter_rx.borrow() == Feed::Live {
                            run_load(&load, &slot, &mut shutdown_rx).await
                        } else {
                            Step::Continue
                        }
                    }
                };

                if let Step::Stop = step {
                    break;
                }
            }
            debug!("Board poller stopped");
        });

        info!(
            "Board poller started ({}s interval, filter {})",
            interval.as_secs(),
            initial
        );

        Self {
            handle: BoardHandle {
                board,
                filter: Arc::new(filter_tx),
            },
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn handle(&self) -> BoardHandle {
        self.handle.clone()
    }

    pub fn set_filter(&self, feed: Feed) {
        self.handle.set_filter(feed);
    }

    pub async fn snapshot(&self) -> Option<Board> {
        self.handle.snapshot().await
    }

    /// Stops the task, cancelling any load in flight, and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("Board poller shut down");
    }
}

impl Drop for BoardPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_load<F, Fut>(
    load: &F,
    slot: &RwLock<Option<Board>>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Step
where
    F: Fn() -> Fut,
    Fut: Future<Output = Board>,
{
    tokio::select! {
        _ = shutdown => Step::Stop,
        board = load() => {
            *slot.write().await = Some(board);
            Step::Continue
        }
    }
}
