//! Per-section holder of the latest fetched list.
//!
//! A [`FeedCache`] turns "fetch happened" events into a raw feed: every
//! subscriber first sees the current list (if one has been fetched), then each
//! replacement.  A section that has never loaded and whose fetch fails makes
//! its feeds fail; once a list is held, later fetch failures leave it in place.

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use super::{FeedError, FeedStream, MovieList};

#[derive(Debug, Clone)]
enum Slot {
    Empty,
    Ready(MovieList),
    Failed(FeedError),
}

pub struct FeedCache {
    slot: watch::Sender<Slot>,
}

impl FeedCache {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(Slot::Empty);
        Self { slot }
    }

    /// Replace the held list and notify every open feed.
    pub fn store(&self, movies: MovieList) {
        debug!(count = movies.len(), "feed cache updated");
        self.slot.send_replace(Slot::Ready(movies));
    }

    /// Record a failed fetch.
    ///
    /// Only takes effect while no list is held: open feeds then end with
    /// `err`.  Returns whether the failure reached the feeds.
    pub fn fail(&self, err: FeedError) -> bool {
        self.slot.send_if_modified(|slot| match slot {
            Slot::Ready(_) => false,
            Slot::Empty | Slot::Failed(_) => {
                *slot = Slot::Failed(err);
                true
            }
        })
    }

    /// Open a new raw feed over this cache.
    pub fn stream(&self) -> FeedStream {
        let rx = self.slot.subscribe();
        stream::unfold(Some((rx, true)), |state| async move {
            let (mut rx, first) = state?;
            if !first {
                rx.changed().await.ok()?;
            }
            loop {
                let current = rx.borrow_and_update().clone();
                match current {
                    Slot::Empty => rx.changed().await.ok()?,
                    Slot::Ready(movies) => return Some((Ok(movies), Some((rx, false)))),
                    Slot::Failed(err) => return Some((Err(err), None)),
                }
            }
        })
        .boxed()
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}
