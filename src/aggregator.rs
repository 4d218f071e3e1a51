//! Combining section feeds and UI flags into one shared snapshot stream.
//!
//! ## Architecture overview
//!
//! ```text
//!  section feed 0 ─┐
//!  section feed 1 ─┤   Input    ┌──────────────┐  Arc<HomeUiState>  ┌──────────────┐
//!       ...        ├──────────► │ upstream task│ ─────────────────► │ Subscription │ ×N
//!  is_refreshing  ─┤ (select)   │ (recombine)  │   (watch, latest)  └──────────────┘
//!  is_error       ─┘            └──────────────┘
//! ```
//!
//! * The upstream task only runs while at least one [`Subscription`] is alive.
//! * Subscribers share the task and the published value; a new subscriber
//!   reads the latest snapshot straight away.
//! * When the last subscriber leaves, teardown waits for a grace window so a
//!   quick detach/re-attach keeps the running computation.  After teardown the
//!   next subscriber starts over from the initial snapshot.
//! * A section whose feed ended in an error stays that way until
//!   [`Signals::retry_failed`] re-opens it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::stream::{self, BoxStream, SelectAll, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::home_state::HomeUiState;
use crate::outcome::Outcome;
use crate::source::{MovieList, Section};

/// How long the upstream computation outlives its last subscriber.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Opens a fresh lifted feed for one section.  Called once per upstream start.
pub type SectionFeed = Box<dyn Fn() -> BoxStream<'static, Outcome<MovieList>> + Send + Sync>;

/// Handle to the two UI flags, plus the retry trigger for failed sections.
///
/// Both flags are plain inputs: they are set from outside and folded into the
/// snapshot as they are.  Cloning shares the same flags.
#[derive(Clone)]
pub struct Signals {
    refreshing: Arc<watch::Sender<bool>>,
    error: Arc<watch::Sender<bool>>,
    retry: Arc<watch::Sender<u64>>,
}

impl Signals {
    fn new() -> Self {
        Self {
            refreshing: Arc::new(watch::channel(false).0),
            error: Arc::new(watch::channel(false).0),
            retry: Arc::new(watch::channel(0).0),
        }
    }

    /// Re-open the feed of every section currently showing an error.
    ///
    /// Sections that loaded or are still loading are left alone.  Has no
    /// effect while nothing is subscribed.
    pub fn retry_failed(&self) {
        self.retry.send_modify(|requests| *requests += 1);
    }

    pub fn set_refreshing(&self, value: bool) {
        self.refreshing.send_replace(value);
    }

    pub fn set_error(&self, value: bool) {
        self.error.send_replace(value);
    }

    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    pub fn is_error(&self) -> bool {
        *self.error.borrow()
    }
}

enum Input {
    Section(usize, Outcome<MovieList>),
    Refreshing(bool),
    Error(bool),
    Retry,
}

#[derive(Default)]
struct Lifecycle {
    subscribers: usize,
    upstream: Option<JoinHandle<()>>,
    pending_stop: Option<JoinHandle<()>>,
    /// Bumped every time the subscriber count drops to zero, so a stale stop
    /// timer cannot tear down a computation it was not scheduled for.
    idle_epoch: u64,
    starts: u64,
}

impl Lifecycle {
    /// Abort the running computation.
    ///
    /// `generation` moves on first: an aborted task may still be mid-poll on
    /// another worker, and its late publishes must not land.
    fn stop_upstream(&mut self, generation: &AtomicU64) {
        if let Some(task) = self.upstream.take() {
            generation.fetch_add(1, Ordering::SeqCst);
            task.abort();
            info!("home state upstream stopped");
        }
    }
}

struct Inner {
    sections: Vec<Section>,
    feeds: Vec<SectionFeed>,
    signals: Signals,
    snapshots: watch::Sender<Arc<HomeUiState>>,
    initial: Arc<HomeUiState>,
    grace: Duration,
    /// Identifies the current upstream run.
    generation: AtomicU64,
    lifecycle: Mutex<Lifecycle>,
}

impl Inner {
    /// Publish `snapshot` from run `generation` unless that run has been
    /// stopped or the snapshot equals the one already held.
    fn publish(&self, generation: u64, snapshot: HomeUiState) {
        let published = self.snapshots.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || **current == snapshot {
                false
            } else {
                *current = Arc::new(snapshot);
                true
            }
        });
        if published {
            debug!("home state snapshot published");
        }
    }

    fn attach(self: &Arc<Self>) -> watch::Receiver<Arc<HomeUiState>> {
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.subscribers += 1;
        if let Some(timer) = lifecycle.pending_stop.take() {
            timer.abort();
        }
        if lifecycle.upstream.is_none() {
            self.snapshots.send_replace(Arc::clone(&self.initial));
            let rx = self.snapshots.subscribe();
            lifecycle.upstream = Some(self.start_upstream());
            lifecycle.starts += 1;
            info!(sections = self.sections.len(), "home state upstream started");
            return rx;
        }
        self.snapshots.subscribe()
    }

    fn detach(self: &Arc<Self>) {
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.subscribers = lifecycle.subscribers.saturating_sub(1);
        if lifecycle.subscribers > 0 {
            return;
        }
        lifecycle.idle_epoch += 1;

        if self.grace.is_zero() {
            lifecycle.stop_upstream(&self.generation);
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            lifecycle.stop_upstream(&self.generation);
            return;
        };

        let epoch = lifecycle.idle_epoch;
        let grace = self.grace;
        let weak = Arc::downgrade(self);
        lifecycle.pending_stop = Some(handle.spawn(async move {
            tokio::time::sleep(grace).await;
            if let Some(inner) = weak.upgrade() {
                inner.stop_if_idle(epoch);
            }
        }));
    }

    fn stop_if_idle(&self, epoch: u64) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.subscribers == 0 && lifecycle.idle_epoch == epoch {
            lifecycle.pending_stop = None;
            lifecycle.stop_upstream(&self.generation);
        }
    }

    fn start_upstream(self: &Arc<Self>) -> JoinHandle<()> {
        // Open every feed now so nothing emitted between subscribe and the
        // task's first poll is missed.
        let feeds = (0..self.feeds.len()).map(|index| self.open_section(index));
        let refreshing = flag_stream(self.signals.refreshing.subscribe())
            .map(Input::Refreshing)
            .boxed();
        let error = flag_stream(self.signals.error.subscribe()).map(Input::Error).boxed();
        let retry = retry_stream(self.signals.retry.subscribe());
        let inputs = stream::select_all(feeds.chain([refreshing, error, retry]));

        let generation = self.generation.load(Ordering::SeqCst);
        tokio::spawn(run_upstream(Arc::downgrade(self), generation, inputs))
    }

    fn open_section(&self, index: usize) -> BoxStream<'static, Input> {
        (self.feeds[index])()
            .map(move |outcome| Input::Section(index, outcome))
            .boxed()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut();
        if let Some(timer) = lifecycle.pending_stop.take() {
            timer.abort();
        }
        if let Some(task) = lifecycle.upstream.take() {
            task.abort();
        }
    }
}

/// Current value first, then every change.
fn flag_stream(rx: watch::Receiver<bool>) -> BoxStream<'static, bool> {
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let value = *rx.borrow_and_update();
        Some((value, (rx, false)))
    })
    .boxed()
}

/// Retry requests made after subscribing.
fn retry_stream(rx: watch::Receiver<u64>) -> BoxStream<'static, Input> {
    stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        Some((Input::Retry, rx))
    })
    .boxed()
}

async fn run_upstream(
    inner: Weak<Inner>,
    generation: u64,
    mut inputs: SelectAll<BoxStream<'static, Input>>,
) {
    let (sections, mut outcomes) = match inner.upgrade() {
        Some(inner) => (
            inner.sections.clone(),
            vec![Outcome::Loading; inner.sections.len()],
        ),
        None => return,
    };
    let mut is_refreshing = false;
    let mut is_error = false;

    while let Some(input) = inputs.next().await {
        let Some(shared) = inner.upgrade() else {
            return;
        };
        match input {
            Input::Section(index, outcome) => outcomes[index] = outcome,
            Input::Refreshing(value) => is_refreshing = value,
            Input::Error(value) => is_error = value,
            Input::Retry => {
                for (index, outcome) in outcomes.iter().enumerate() {
                    if matches!(outcome, Outcome::Error) {
                        debug!(section = %sections[index], "re-opening failed section");
                        inputs.push(shared.open_section(index));
                    }
                }
                continue;
            }
        }
        shared.publish(
            generation,
            HomeUiState::combine(
                &sections,
                &outcomes,
                is_refreshing,
                is_error,
            ),
        );
    }
    debug!("home state inputs exhausted");
}

/// Shared, replay-latest, lazily started source of [`HomeUiState`]s.
///
/// Cheap to clone; clones share the same computation.
#[derive(Clone)]
pub struct StateAggregator {
    inner: Arc<Inner>,
}

impl StateAggregator {
    /// Build an aggregator over `feeds`, one per section, in display order.
    ///
    /// Nothing is subscribed upstream until the first [`subscribe`](Self::subscribe).
    pub fn new(feeds: Vec<(Section, SectionFeed)>, grace: Duration) -> Self {
        let (sections, feeds): (Vec<_>, Vec<_>) = feeds.into_iter().unzip();
        let initial = Arc::new(HomeUiState::initial(&sections));
        let (snapshots, _) = watch::channel(Arc::clone(&initial));
        Self {
            inner: Arc::new(Inner {
                sections,
                feeds,
                signals: Signals::new(),
                snapshots,
                initial,
                grace,
                generation: AtomicU64::new(0),
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }

    /// Attach an observer.
    ///
    /// The returned subscription already holds the latest snapshot.  The
    /// first subscriber (or the first after a teardown) starts the upstream
    /// computation, so this must be called from within a Tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        let rx = self.inner.attach();
        Subscription {
            rx,
            inner: Arc::clone(&self.inner),
        }
    }

    /// The flags folded into every snapshot.
    pub fn signals(&self) -> Signals {
        self.inner.signals.clone()
    }

    pub fn sections(&self) -> &[Section] {
        &self.inner.sections
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lifecycle.lock().subscribers
    }

    /// Whether the upstream computation is currently running.
    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.lock().upstream.is_some()
    }

    /// How many times the upstream computation has been started.
    pub fn upstream_starts(&self) -> u64 {
        self.inner.lifecycle.lock().starts
    }
}

/// One observer of a [`StateAggregator`].
///
/// Dropping it detaches the observer.
pub struct Subscription {
    rx: watch::Receiver<Arc<HomeUiState>>,
    inner: Arc<Inner>,
}

impl Subscription {
    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<HomeUiState> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait for the next snapshot this observer has not seen yet.
    ///
    /// Returns `None` if the aggregator is gone.
    pub async fn changed(&mut self) -> Option<Arc<HomeUiState>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// Like [`changed`](Self::changed) but without waiting.
    pub fn try_changed(&mut self) -> Option<Arc<HomeUiState>> {
        match self.rx.has_changed() {
            Ok(true) => Some(Arc::clone(&self.rx.borrow_and_update())),
            _ => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
