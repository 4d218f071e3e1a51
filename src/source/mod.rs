//! Data layer: raw movie feeds and their refresh triggers.
//!
//! This module defines the [`MovieRepository`] trait, the [`Movie`] item and
//! the [`Section`] identifiers.  Concrete repositories live in sub-modules
//! (currently only [`TmdbRepository`]).
//!
//! ## For contributors — adding a new repository
//!
//! 1. Create a new file in this directory (e.g. `trakt.rs`).
//! 2. Keep one [`FeedCache`] per section and hand out its
//!    [`stream()`](FeedCache::stream) as the section's raw feed.
//! 3. Implement the refresh triggers by fetching and calling
//!    [`FeedCache::store`] / [`FeedCache::fail`].
//! 4. Construct it in `main.rs` instead of the TMDB repository.
//!
//! Everything above this layer only sees feeds and triggers.

mod cache;
mod movie;
mod section;
mod tmdb;

pub use cache::FeedCache;
pub use movie::{Movie, POSTER_IMAGE_BASE_URL};
pub use section::{Genre, Section};
pub use tmdb::{TmdbRepository, DEFAULT_BASE_URL};

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// The latest known list for one section, in upstream order.
pub type MovieList = Arc<[Movie]>;

/// A raw feed: successive "latest known list" values, possibly ending in a
/// failure.
pub type FeedStream = BoxStream<'static, Result<MovieList, FeedError>>;

/// Why a feed or a refresh failed.
///
/// Above the data layer every variant means the same thing: the section's
/// upstream failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Decode(err.to_string())
    }
}

/// Source of the raw feeds and refresh triggers for every section.
///
/// Feeds are cold: each call returns a new subscription.  Refresh triggers
/// are fire-and-forget from the state layer's point of view; their effect is
/// only observed through the feeds.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    fn top_rated_stream(&self) -> FeedStream;

    fn genre_stream(&self, genre: Genre) -> FeedStream;

    async fn refresh_top_rated(&self) -> Result<(), FeedError>;

    async fn refresh_genre(&self, genre: Genre) -> Result<(), FeedError>;

    /// Raw feed for any section.
    fn stream(&self, section: Section) -> FeedStream {
        match section {
            Section::TopRated => self.top_rated_stream(),
            Section::Genre(genre) => self.genre_stream(genre),
        }
    }

    /// Refresh trigger for any section.
    async fn refresh(&self, section: Section) -> Result<(), FeedError> {
        match section {
            Section::TopRated => self.refresh_top_rated().await,
            Section::Genre(genre) => self.refresh_genre(genre).await,
        }
    }
}
