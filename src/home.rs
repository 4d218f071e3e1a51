//! The home screen's view model.
//!
//! Wires one lifted feed per section from a [`MovieRepository`] into a
//! [`StateAggregator`].  This is the only place that knows which sections the
//! home screen shows.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{SectionFeed, Signals, StateAggregator, Subscription};
use crate::outcome::LiftOutcomeExt;
use crate::source::{Genre, MovieRepository, Section};

pub struct HomeViewModel {
    repository: Arc<dyn MovieRepository>,
    aggregator: StateAggregator,
}

impl HomeViewModel {
    /// Track the top-rated list plus one section per genre.
    pub fn new(repository: Arc<dyn MovieRepository>, genres: &[Genre], grace: Duration) -> Self {
        let feeds = Section::home(genres)
            .into_iter()
            .map(|section| (section, section_feed(&repository, section)))
            .collect();
        Self {
            aggregator: StateAggregator::new(feeds, grace),
            repository,
        }
    }

    /// Observe the home screen state.  See [`StateAggregator::subscribe`].
    pub fn ui_state(&self) -> Subscription {
        self.aggregator.subscribe()
    }

    pub fn sections(&self) -> &[Section] {
        self.aggregator.sections()
    }

    pub fn signals(&self) -> Signals {
        self.aggregator.signals()
    }

    pub fn repository(&self) -> Arc<dyn MovieRepository> {
        Arc::clone(&self.repository)
    }

    pub fn aggregator(&self) -> &StateAggregator {
        &self.aggregator
    }
}

fn section_feed(repository: &Arc<dyn MovieRepository>, section: Section) -> SectionFeed {
    let repository = Arc::clone(repository);
    Box::new(move || repository.stream(section).lift_outcome())
}
