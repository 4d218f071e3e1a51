//! Refresh scheduling.
//!
//! Runs as a background task that calls every section's refresh trigger,
//! either when asked through a [`RefreshHandle`] or on a fixed interval, and
//! drives the two UI flags while it does.
//!
//! ## For contributors
//!
//! The controller is intentionally simple: one refresh cycle at a time, all
//! sections in parallel, and requests that arrive during a cycle collapse
//! into a single follow-up cycle.  The state layer never calls into this
//! module; it only sees the flags and, through the feeds, the new lists.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::aggregator::Signals;
use crate::source::{MovieRepository, Section};

/// Asks the controller for a refresh cycle.  Cheap to clone.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Request a refresh.  Fire-and-forget: if one is already queued this
    /// request is folded into it.
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Refresh every section once.
///
/// `is_refreshing` is on for the duration of the cycle; `is_error` ends up on
/// when at least one section failed.  Sections showing an error are re-opened
/// afterwards.  Returns how many sections failed.
pub async fn refresh_all(
    repository: &dyn MovieRepository,
    sections: &[Section],
    signals: &Signals,
) -> usize {
    signals.set_refreshing(true);
    signals.set_error(false);

    let results = join_all(sections.iter().map(|section| repository.refresh(*section))).await;
    let mut failed = 0;
    for (section, result) in sections.iter().zip(&results) {
        if let Err(e) = result {
            warn!(%section, error = %e, "refresh failed");
            failed += 1;
        }
    }

    signals.set_error(failed > 0);
    signals.set_refreshing(false);
    // Lists that just loaded can now replace sections stuck on an error.
    signals.retry_failed();
    info!(sections = sections.len(), failed, "refresh cycle finished");
    failed
}

/// Spawn the refresh controller.
///
/// An initial cycle runs straight away.  With `interval` set, further cycles
/// run on that period; requests through the returned handle run one
/// immediately.  The task ends when every handle has been dropped.
pub fn spawn(
    repository: Arc<dyn MovieRepository>,
    sections: Vec<Section>,
    signals: Signals,
    interval: Option<Duration>,
) -> (RefreshHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(1);

    let task = tokio::spawn(async move {
        let mut ticker = interval.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        if ticker.is_none() {
            refresh_all(repository.as_ref(), &sections, &signals).await;
        }

        loop {
            let tick = async {
                match ticker.as_mut() {
                    Some(ticker) => {
                        ticker.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                _ = tick => {}
                request = rx.recv() => {
                    if request.is_none() {
                        return;
                    }
                }
            }
            refresh_all(repository.as_ref(), &sections, &signals).await;
        }
    });

    (RefreshHandle { tx }, task)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::StreamExt;

    use super::*;
    use crate::aggregator::StateAggregator;
    use crate::source::{FeedError, FeedStream, Genre};

    /// Counts refresh calls and fails the genres listed in `failing`.
    struct CountingRepository {
        calls: AtomicUsize,
        failing: Vec<Genre>,
        /// Flags to sample while a refresh is running.
        observed: Option<Signals>,
        saw_refreshing: AtomicBool,
    }

    impl CountingRepository {
        fn new(failing: Vec<Genre>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing,
                observed: None,
                saw_refreshing: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl MovieRepository for CountingRepository {
        fn top_rated_stream(&self) -> FeedStream {
            futures::stream::pending().boxed()
        }

        fn genre_stream(&self, _genre: Genre) -> FeedStream {
            futures::stream::pending().boxed()
        }

        async fn refresh_top_rated(&self) -> Result<(), FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(signals) = &self.observed {
                self.saw_refreshing
                    .store(signals.is_refreshing(), Ordering::SeqCst);
            }
            Ok(())
        }

        async fn refresh_genre(&self, genre: Genre) -> Result<(), FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&genre) {
                Err(FeedError::Status(503))
            } else {
                Ok(())
            }
        }
    }

    fn signals() -> Signals {
        StateAggregator::new(Vec::new(), Duration::ZERO).signals()
    }

    const SECTIONS: [Section; 3] = [
        Section::TopRated,
        Section::Genre(Genre::Action),
        Section::Genre(Genre::Animation),
    ];

    #[tokio::test]
    async fn refresh_all_calls_every_section_and_clears_flags() {
        let repo = CountingRepository::new(vec![]);
        let signals = signals();

        let failed = refresh_all(&repo, &SECTIONS, &signals).await;

        assert_eq!(failed, 0);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
        assert!(!signals.is_refreshing());
        assert!(!signals.is_error());
    }

    #[tokio::test]
    async fn any_failed_section_sets_error_flag() {
        let repo = CountingRepository::new(vec![Genre::Animation]);
        let signals = signals();

        let failed = refresh_all(&repo, &SECTIONS, &signals).await;

        assert_eq!(failed, 1);
        assert!(signals.is_error());
        assert!(!signals.is_refreshing());
    }

    #[tokio::test]
    async fn successful_cycle_clears_previous_error() {
        let signals = signals();
        signals.set_error(true);

        refresh_all(&CountingRepository::new(vec![]), &SECTIONS, &signals).await;

        assert!(!signals.is_error());
    }

    #[tokio::test]
    async fn refreshing_flag_is_on_during_the_cycle() {
        let signals = signals();
        let mut repo = CountingRepository::new(vec![]);
        repo.observed = Some(signals.clone());

        refresh_all(&repo, &SECTIONS, &signals).await;

        assert!(repo.saw_refreshing.load(Ordering::SeqCst));
        assert!(!signals.is_refreshing());
    }

    #[tokio::test]
    async fn controller_runs_initial_cycle_and_on_request() {
        let repo = Arc::new(CountingRepository::new(vec![]));
        let (handle, task) = spawn(repo.clone(), SECTIONS.to_vec(), signals(), None);

        tokio::task::yield_now().await;
        while repo.calls.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }

        handle.request();
        while repo.calls.load(Ordering::SeqCst) < 6 {
            tokio::task::yield_now().await;
        }

        drop(handle);
        task.await.unwrap();
        assert_eq!(repo.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn controller_refreshes_on_interval() {
        let repo = Arc::new(CountingRepository::new(vec![]));
        let (_handle, task) = spawn(
            repo.clone(),
            vec![Section::TopRated],
            signals(),
            Some(Duration::from_secs(60)),
        );

        tokio::time::sleep(Duration::from_secs(150)).await;

        // Ticks at 0s, 60s and 120s.
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
        task.abort();
    }
}
